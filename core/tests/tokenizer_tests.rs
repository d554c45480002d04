use docstash_core::model::Language;
use docstash_core::tokenizer::tokenize;

#[test]
fn it_splits_latin_text_on_punctuation_runs() {
    let toks = tokenize("Total: due; March (invoice)!?", Language::Eng);
    assert_eq!(toks, vec!["Total", "due", "March", "invoice"]);
}

#[test]
fn it_preserves_original_token_order() {
    let toks = tokenize("gamma beta alpha", Language::Eng);
    assert_eq!(toks, vec!["gamma", "beta", "alpha"]);
}

#[test]
fn it_does_not_fold_case_or_stem() {
    let toks = tokenize("Running RUNS ran", Language::Eng);
    assert_eq!(toks, vec!["Running", "RUNS", "ran"]);
}

#[test]
fn telugu_splits_on_danda_like_hindi() {
    let toks = tokenize("పత్రం।శోధన", Language::Tel);
    assert_eq!(toks, vec!["పత్రం", "శోధన"]);
}
