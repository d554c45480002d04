use crate::error::Result;
use crate::model::{Document, Language};
use crate::query::{parse, ParsedQuery};
use crate::store::Store;
use crate::tokenizer::tokenize;
use std::collections::HashMap;
use tracing::debug;

/// Ranked full-text search over the posting trees.
///
/// Scores are plain term-frequency sums across query tokens; ties keep scan
/// order. An empty clean query returns no results even when filters are
/// present: filters refine a text match, they are not standalone predicates.
///
/// Queries are tokenized with the default Latin rules regardless of
/// `language_filter`, while documents index under their own language rules.
/// Non-Latin-script queries therefore may not line up with non-Latin
/// postings; this asymmetry is retained from the original behavior.
pub fn search(
    store: &Store,
    raw_query: &str,
    language_filter: Option<Language>,
) -> Result<Vec<String>> {
    let parsed = parse(raw_query);
    let tokens = tokenize(&parsed.clean_query.to_lowercase(), Language::Eng);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let mut scores: HashMap<String, u64> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for token in &tokens {
        for posting in store.postings_for_term(token)? {
            if let Some(lang) = language_filter {
                if posting.language != lang {
                    continue;
                }
            }
            let entry = scores.entry(posting.document_id.clone()).or_insert_with(|| {
                order.push(posting.document_id.clone());
                0
            });
            *entry += u64::from(posting.frequency);
        }
    }

    let mut ranked: Vec<(String, u64)> = order
        .into_iter()
        .map(|id| {
            let score = scores.get(&id).copied().unwrap_or(0);
            (id, score)
        })
        .collect();
    // stable sort keeps first-seen order between equal scores
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    debug!(query = raw_query, hits = ranked.len(), "ranked postings");

    apply_filters(store, &parsed, ranked)
}

fn apply_filters(
    store: &Store,
    parsed: &ParsedQuery,
    ranked: Vec<(String, u64)>,
) -> Result<Vec<String>> {
    let folder_id = match &parsed.folder {
        Some(name) => {
            let wanted = name.to_lowercase();
            let resolved = store
                .folders()?
                .into_iter()
                .find(|f| f.name.to_lowercase() == wanted)
                .map(|f| f.id);
            // an unknown folder name matches nothing, it is not an error
            if resolved.is_none() {
                return Ok(Vec::new());
            }
            resolved
        }
        None => None,
    };

    let mut out = Vec::with_capacity(ranked.len());
    for (id, _score) in ranked {
        let Some(doc) = store.get_document(&id)? else {
            continue;
        };
        if keeps(&doc, parsed, folder_id.as_deref()) {
            out.push(id);
        }
    }
    Ok(out)
}

fn keeps(doc: &Document, parsed: &ParsedQuery, folder_id: Option<&str>) -> bool {
    if let Some(tag) = &parsed.tag {
        if !doc.tags.iter().any(|t| t == tag) {
            return false;
        }
    }
    if let Some(doc_type) = parsed.doc_type {
        if doc.doc_type != doc_type {
            return false;
        }
    }
    if folder_id.is_some() && doc.folder_id.as_deref() != folder_id {
        return false;
    }
    true
}
