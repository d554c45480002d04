use crate::model::Language;
use lazy_static::lazy_static;
use regex::Regex;

/// Terms shorter than this are skipped when building postings. Raw
/// `tokenize` output still includes them for other callers.
pub const MIN_TERM_LEN: usize = 3;

/// Cap on distinct terms admitted per document, first-seen in token order.
pub const MAX_TERMS_PER_DOC: usize = 1000;

lazy_static! {
    static ref LATIN_SPLIT: Regex =
        Regex::new(r#"[\s.,;:!?()\[\]{}'"]+"#).expect("valid regex");
    // Latin set plus danda and double danda.
    static ref INDIC_SPLIT: Regex =
        Regex::new(r#"[\s.,;:!?()\[\]{}'"\u{0964}\u{0965}]+"#).expect("valid regex");
    // Latin set plus Arabic comma, semicolon, question mark and full stop.
    static ref ARABIC_SPLIT: Regex =
        Regex::new(r#"[\s.,;:!?()\[\]{}'"\u{060C}\u{061B}\u{061F}\u{06D4}]+"#).expect("valid regex");
}

/// Split `text` into terms using the rule set for `language`, preserving
/// token order. No case folding, stemming or stopword removal happens here.
pub fn tokenize(text: &str, language: Language) -> Vec<String> {
    match language {
        Language::Eng => split_on(&LATIN_SPLIT, text),
        Language::Hin | Language::Tel => split_on(&INDIC_SPLIT, text),
        Language::Ara => split_on(&ARABIC_SPLIT, text),
        // One token per CJK ideograph; everything else is dropped.
        Language::ChiSim => text.chars().filter(|c| is_cjk(*c)).map(String::from).collect(),
    }
}

fn split_on(re: &Regex, text: &str) -> Vec<String> {
    re.split(text)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32, 0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0xF900..=0xFAFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_punctuation() {
        let toks = tokenize("Invoice, total: due (March)!", Language::Eng);
        assert_eq!(toks, vec!["Invoice", "total", "due", "March"]);
    }

    #[test]
    fn keeps_short_tokens_in_raw_output() {
        let toks = tokenize("a to the", Language::Eng);
        assert_eq!(toks, vec!["a", "to", "the"]);
    }

    #[test]
    fn hindi_splits_on_danda() {
        let toks = tokenize("नमस्ते।दुनिया॥फिर", Language::Hin);
        assert_eq!(toks, vec!["नमस्ते", "दुनिया", "फिर"]);
    }

    #[test]
    fn arabic_splits_on_arabic_punctuation() {
        let toks = tokenize("مرحبا،بالعالم؟نعم", Language::Ara);
        assert_eq!(toks, vec!["مرحبا", "بالعالم", "نعم"]);
    }

    #[test]
    fn chinese_yields_one_token_per_ideograph() {
        let toks = tokenize("文件abc 管理", Language::ChiSim);
        assert_eq!(toks, vec!["文", "件", "管", "理"]);
    }
}
