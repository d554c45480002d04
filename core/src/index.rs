use crate::model::{Document, Posting};
use crate::tokenizer::{tokenize, MAX_TERMS_PER_DOC, MIN_TERM_LEN};
use std::collections::HashMap;

struct TermStats {
    frequency: u32,
    positions: Vec<u32>,
}

/// Build the full posting set for a document from its current text.
///
/// Indexable text is `name + content + ocr_text`, lowercased, tokenized with
/// the document's own language rules (default English). Terms shorter than
/// `MIN_TERM_LEN` are dropped; at most `MAX_TERMS_PER_DOC` distinct terms are
/// admitted, first seen in token order. Positions are token ordinals over the
/// raw token stream, so they stay comparable across the length filter.
///
/// This is pure; the store replaces the old posting set with the result
/// inside the same transaction that writes the document.
pub fn build_postings(document: &Document) -> Vec<Posting> {
    let language = document.language.unwrap_or_default();
    let text = format!(
        "{} {} {}",
        document.name, document.content, document.ocr_text
    )
    .to_lowercase();
    let tokens = tokenize(&text, language);

    let mut stats: HashMap<String, TermStats> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for (position, token) in tokens.iter().enumerate() {
        if token.chars().count() < MIN_TERM_LEN {
            continue;
        }
        if let Some(entry) = stats.get_mut(token.as_str()) {
            entry.frequency += 1;
            entry.positions.push(position as u32);
        } else if stats.len() < MAX_TERMS_PER_DOC {
            stats.insert(
                token.clone(),
                TermStats {
                    frequency: 1,
                    positions: vec![position as u32],
                },
            );
            order.push(token.clone());
        }
    }

    order
        .into_iter()
        .filter_map(|term| {
            stats.remove(&term).map(|s| Posting {
                document_id: document.id.clone(),
                term,
                frequency: s.frequency,
                positions: s.positions,
                language,
            })
        })
        .collect()
}
