use crate::model::DocumentType;
use lazy_static::lazy_static;
use regex::Regex;

/// A raw query split into free text and structured filters.
///
/// `tag:` and `folder:` values are taken verbatim (folder names resolve
/// case-insensitively at search time); `type:` values are lowercased and
/// must name a known document type or the filter stays unset. Operator
/// keywords match case-insensitively and are stripped wherever they appear.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedQuery {
    pub clean_query: String,
    pub tag: Option<String>,
    pub doc_type: Option<DocumentType>,
    pub folder: Option<String>,
}

lazy_static! {
    static ref TAG_OP: Regex = Regex::new(r"(?i)\btag:(\S+)").expect("valid regex");
    static ref TYPE_OP: Regex = Regex::new(r"(?i)\btype:(\S+)").expect("valid regex");
    static ref FOLDER_OP: Regex = Regex::new(r"(?i)\bfolder:(\S+)").expect("valid regex");
}

/// Pure and idempotent: one pass strips every operator substring, so parsing
/// the resulting `clean_query` again extracts no filters.
pub fn parse(raw: &str) -> ParsedQuery {
    let mut parsed = ParsedQuery::default();
    let mut remaining = raw.to_string();

    if let Some(caps) = TAG_OP.captures(&remaining) {
        parsed.tag = Some(caps[1].to_string());
    }
    remaining = TAG_OP.replace_all(&remaining, " ").into_owned();

    if let Some(caps) = TYPE_OP.captures(&remaining) {
        parsed.doc_type = DocumentType::from_code(&caps[1].to_lowercase());
    }
    remaining = TYPE_OP.replace_all(&remaining, " ").into_owned();

    if let Some(caps) = FOLDER_OP.captures(&remaining) {
        parsed.folder = Some(caps[1].to_string());
    }
    remaining = FOLDER_OP.replace_all(&remaining, " ").into_owned();

    parsed.clean_query = remaining.split_whitespace().collect::<Vec<_>>().join(" ");
    parsed
}
