use docstash_core::export::{export, import, Bundle, BUNDLE_VERSION};
use docstash_core::model::{Document, DocumentType};
use docstash_core::{search, Error, Store};

fn seed(store: &Store) {
    let folder = store.create_folder("Taxes", None).unwrap();
    let mut d = Document::new("a", "d", DocumentType::Text);
    d.ocr_text = "march receipts".to_string();
    d.tags = vec!["finance".to_string()];
    d.folder_id = Some(folder.id);
    store.save_document(&d).unwrap();
}

#[test]
fn bundle_round_trips_through_json() {
    let source = Store::temporary().unwrap();
    seed(&source);
    let bundle = export(&source).unwrap();
    assert_eq!(bundle.version, BUNDLE_VERSION);
    assert_eq!(bundle.documents.len(), 1);
    assert!(!bundle.export_date.is_empty());

    let json = serde_json::to_string(&bundle).unwrap();
    let decoded: Bundle = serde_json::from_str(&json).unwrap();

    let target = Store::temporary().unwrap();
    import(&target, decoded).unwrap();

    // postings are not shipped; they must have been rebuilt on import
    assert_eq!(search(&target, "march", None).unwrap(), vec!["a"]);
    assert_eq!(search(&target, "march tag:finance", None).unwrap(), vec!["a"]);
    assert_eq!(search(&target, "march folder:taxes", None).unwrap(), vec!["a"]);
    assert_eq!(
        target.get_tag("finance").unwrap().unwrap().document_count,
        1
    );
}

#[test]
fn unsupported_bundle_version_is_rejected() {
    let source = Store::temporary().unwrap();
    let mut bundle = export(&source).unwrap();
    bundle.version = 99;
    let target = Store::temporary().unwrap();
    match import(&target, bundle) {
        Err(Error::Import(_)) => {}
        other => panic!("expected Import error, got {other:?}"),
    }
}
