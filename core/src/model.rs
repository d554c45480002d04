use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Sentinel folder every catalog starts with. It has no parent and cannot be
/// deleted; folders created without an explicit parent land under it.
pub const ROOT_FOLDER_ID: &str = "root";

const DEFAULT_TAG_COLOR: &str = "#6b7280";

/// Languages the tokenizer knows how to split. Unknown codes fall back to
/// `Eng`, so documents from an OCR pass with an unexpected language still
/// index with the default rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Eng,
    Hin,
    Tel,
    Ara,
    ChiSim,
}

impl Language {
    pub fn from_code(code: &str) -> Language {
        match code {
            "hin" => Language::Hin,
            "tel" => Language::Tel,
            "ara" => Language::Ara,
            "chi_sim" => Language::ChiSim,
            _ => Language::Eng,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Eng => "eng",
            Language::Hin => "hin",
            Language::Tel => "tel",
            Language::Ara => "ara",
            Language::ChiSim => "chi_sim",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Image,
    Text,
    Doc,
}

impl DocumentType {
    pub fn from_code(code: &str) -> Option<DocumentType> {
        match code {
            "pdf" => Some(DocumentType::Pdf),
            "image" => Some(DocumentType::Image),
            "text" => Some(DocumentType::Text),
            "doc" => Some(DocumentType::Doc),
            _ => None,
        }
    }
}

/// A managed document. `content` holds a short preview, `ocr_text` the full
/// extracted text; both feed the index together with `name`. `folder_id` is a
/// weak reference, the folder does not own the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub original_name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub size: u64,
    pub content: String,
    pub ocr_text: String,
    pub tags: Vec<String>,
    pub folder_id: Option<String>,
    /// Unix milliseconds. The store stamps these on save.
    pub created_at: i64,
    pub updated_at: i64,
    pub is_processing: bool,
    pub processing_progress: u8,
    pub language: Option<Language>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        doc_type: DocumentType,
    ) -> Document {
        let name = name.into();
        Document {
            id: id.into(),
            original_name: name.clone(),
            name,
            doc_type,
            size: 0,
            content: String::new(),
            ocr_text: String::new(),
            tags: Vec::new(),
            folder_id: None,
            created_at: 0,
            updated_at: 0,
            is_processing: false,
            processing_progress: 0,
            language: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    /// Child folder ids, kept in sync with the children's `parent_id`.
    pub children: Vec<String>,
    /// Denormalized member list, kept in sync with `Document.folder_id`
    /// inside the same transaction that moves the document.
    pub document_ids: Vec<String>,
    pub is_watched: bool,
    pub watch_path: Option<String>,
}

impl Folder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent_id: Option<String>) -> Folder {
        Folder {
            id: id.into(),
            name: name.into(),
            parent_id,
            children: Vec::new(),
            document_ids: Vec::new(),
            is_watched: false,
            watch_path: None,
        }
    }

    pub fn root() -> Folder {
        Folder::new(ROOT_FOLDER_ID, "All Documents", None)
    }
}

/// Tags are looked up by `name` (case-sensitive, unique). `document_count`
/// is a denormalized count of carrying documents, maintained transactionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub document_count: u32,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Tag {
        Tag {
            id: new_id("tag"),
            name: name.into(),
            color: DEFAULT_TAG_COLOR.to_string(),
            document_count: 0,
        }
    }
}

/// One inverted-index entry: identity is `(document_id, term, language)`.
/// Postings are owned by their document and replaced wholesale on reindex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub document_id: String,
    pub term: String,
    pub frequency: u32,
    /// Token ordinals within the document's indexed text, ascending.
    pub positions: Vec<u32>,
    pub language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub ocr_languages: Vec<String>,
    pub auto_ocr: bool,
    pub preview_chars: usize,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            ocr_languages: vec!["eng".to_string()],
            auto_ocr: true,
            preview_chars: 200,
        }
    }
}

/// Unix milliseconds, the timestamp unit used on all records.
pub fn now_ms() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Process-unique id with a type prefix, e.g. `doc-18f2c4a9b3d-1f`.
pub fn new_id(prefix: &str) -> String {
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{:x}-{seq:x}", now_ms())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_codes_fall_back_to_english() {
        assert_eq!(Language::from_code("jpn"), Language::Eng);
        assert_eq!(Language::from_code("chi_sim"), Language::ChiSim);
    }

    #[test]
    fn document_type_codes_round_trip() {
        assert_eq!(DocumentType::from_code("pdf"), Some(DocumentType::Pdf));
        assert_eq!(DocumentType::from_code("mp3"), None);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_id("doc"), new_id("doc"));
    }
}
