//! Interfaces to the text-extraction collaborators. OCR engines and PDF
//! parsers live outside this crate; the indexing core only cares about the
//! `(text, language)` they hand back.

use crate::error::Result;
use crate::model::Language;

#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub language: Language,
}

/// Black-box OCR. `progress` receives 0-100 as the engine sees fit.
pub trait OcrEngine {
    fn recognize(
        &self,
        bytes: &[u8],
        languages: &[Language],
        progress: &mut dyn FnMut(u8),
    ) -> Result<Extraction>;
}

/// Black-box PDF text extraction.
pub trait PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// Pass-through "engine" for files that already are plain text.
pub struct PlainText;

impl OcrEngine for PlainText {
    fn recognize(
        &self,
        bytes: &[u8],
        languages: &[Language],
        progress: &mut dyn FnMut(u8),
    ) -> Result<Extraction> {
        let language = languages.first().copied().unwrap_or_default();
        let text = String::from_utf8_lossy(bytes).into_owned();
        progress(100);
        Ok(Extraction { text, language })
    }
}
