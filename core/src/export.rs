use crate::error::{Error, Result};
use crate::model::{Document, Folder, Settings, Tag};
use crate::store::Store;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

pub const BUNDLE_VERSION: u32 = 1;

/// Everything a catalog exports. Postings are deliberately absent: they are
/// derived state and get rebuilt on import.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub documents: Vec<Document>,
    pub folders: Vec<Folder>,
    pub tags: Vec<Tag>,
    pub settings: Settings,
    pub export_date: String,
    pub version: u32,
}

pub fn export(store: &Store) -> Result<Bundle> {
    Ok(Bundle {
        documents: store.documents()?,
        folders: store.folders()?,
        tags: store.tags()?,
        settings: store.settings()?,
        export_date: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::new()),
        version: BUNDLE_VERSION,
    })
}

/// Apply a bundle: tags, then folders, then documents, each collection in
/// its own all-or-nothing transaction, then rebuild every imported
/// document's postings.
pub fn import(store: &Store, bundle: Bundle) -> Result<()> {
    if bundle.version != BUNDLE_VERSION {
        return Err(Error::Import(format!(
            "unsupported bundle version {}",
            bundle.version
        )));
    }
    store.put_tags(&bundle.tags)?;
    store.put_folders(&bundle.folders)?;
    store.put_documents(&bundle.documents)?;
    store.put_settings(&bundle.settings)?;

    for doc in &bundle.documents {
        store.index_document(&doc.id)?;
    }
    info!(
        documents = bundle.documents.len(),
        folders = bundle.folders.len(),
        tags = bundle.tags.len(),
        "bundle imported"
    );
    Ok(())
}
