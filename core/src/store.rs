//! Transactional embedded storage for documents, folders, tags and postings.
//!
//! One sled `Tree` per logical collection. Posting keys are the term length
//! (big-endian u32) followed by the term bytes and the document id, so a
//! prefix scan on `len + term` yields exactly that term's posting list —
//! terms are arbitrary byte sequences and an unescaped separator would let
//! one term shadow the scan of a shorter one it starts with. The `doc_terms`
//! tree maps a document id to its current term list and is the reverse index
//! used to delete a posting set.
//!
//! Every mutation that touches more than one record runs as a single sled
//! transaction: a document write and its posting replacement commit together
//! or not at all, and the denormalized folder member lists and tag counts
//! move in the same commit. A writer mutex serializes mutations; reads go
//! straight to the trees.

use crate::error::{Error, Result};
use crate::index::build_postings;
use crate::model::{now_ms, Document, Folder, Posting, Settings, Tag, ROOT_FOLDER_ID};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sled::transaction::{
    ConflictableTransactionError, TransactionError, TransactionalTree,
};
use sled::{Transactional, Tree};
use std::path::Path;
use tracing::debug;

const MARKER_KEY: &[u8] = b"catalog";
const SETTINGS_KEY: &[u8] = b"settings";

#[derive(Debug, Serialize, Deserialize)]
struct CatalogMarker {
    version: u32,
}

type TxResult<T> = std::result::Result<T, ConflictableTransactionError<Error>>;

pub struct Store {
    db: sled::Db,
    documents: Tree,
    folders: Tree,
    tags: Tree,
    postings: Tree,
    doc_terms: Tree,
    meta: Tree,
    write_lock: Mutex<()>,
}

impl Store {
    /// Open (or create) a catalog at `path`. Seeds the catalog marker, the
    /// root folder and default settings on first open; idempotent after that.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Store> {
        let db = sled::open(path)?;
        let store = Store::from_db(db)?;
        store.seed()?;
        Ok(store)
    }

    /// Open a catalog that must already exist. Fails with `NotInitialized`
    /// when the marker is absent; never seeds anything.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Store> {
        let db = sled::open(path)?;
        let store = Store::from_db(db)?;
        if store.meta.get(MARKER_KEY)?.is_none() {
            return Err(Error::NotInitialized);
        }
        Ok(store)
    }

    /// In-memory store backed by a sled temporary database, for tests.
    pub fn temporary() -> Result<Store> {
        let db = sled::Config::new().temporary(true).open()?;
        let store = Store::from_db(db)?;
        store.seed()?;
        Ok(store)
    }

    fn from_db(db: sled::Db) -> Result<Store> {
        Ok(Store {
            documents: db.open_tree("documents")?,
            folders: db.open_tree("folders")?,
            tags: db.open_tree("tags")?,
            postings: db.open_tree("postings")?,
            doc_terms: db.open_tree("doc_terms")?,
            meta: db.open_tree("meta")?,
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn seed(&self) -> Result<()> {
        if self.meta.get(MARKER_KEY)?.is_none() {
            self.meta
                .insert(MARKER_KEY, encode(&CatalogMarker { version: 1 })?)?;
        }
        if self.meta.get(SETTINGS_KEY)?.is_none() {
            self.meta.insert(SETTINGS_KEY, encode(&Settings::default())?)?;
        }
        if self.folders.get(ROOT_FOLDER_ID)?.is_none() {
            self.folders
                .insert(ROOT_FOLDER_ID, encode(&Folder::root())?)?;
        }
        self.db.flush()?;
        Ok(())
    }

    // ---- point lookups (absence is a valid result, never an error) ----

    pub fn get_document(&self, id: &str) -> Result<Option<Document>> {
        get(&self.documents, id.as_bytes())
    }

    pub fn get_folder(&self, id: &str) -> Result<Option<Folder>> {
        get(&self.folders, id.as_bytes())
    }

    /// Tags are keyed by their unique, case-sensitive name.
    pub fn get_tag(&self, name: &str) -> Result<Option<Tag>> {
        get(&self.tags, name.as_bytes())
    }

    // ---- collection reads ----

    pub fn documents(&self) -> Result<Vec<Document>> {
        all(&self.documents)
    }

    pub fn folders(&self) -> Result<Vec<Folder>> {
        all(&self.folders)
    }

    pub fn tags(&self) -> Result<Vec<Tag>> {
        all(&self.tags)
    }

    pub fn settings(&self) -> Result<Settings> {
        match self.meta.get(SETTINGS_KEY)? {
            Some(bytes) => decode(&bytes),
            None => Ok(Settings::default()),
        }
    }

    pub fn put_settings(&self, settings: &Settings) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.meta.insert(SETTINGS_KEY, encode(settings)?)?;
        self.db.flush()?;
        Ok(())
    }

    // ---- secondary scans ----

    /// All postings for a term, across documents, in key order.
    pub fn postings_for_term(&self, term: &str) -> Result<Vec<Posting>> {
        let mut out = Vec::new();
        for entry in self.postings.scan_prefix(term_prefix(term)) {
            let (_, bytes) = entry?;
            out.push(decode(&bytes)?);
        }
        Ok(out)
    }

    /// The posting set of one document, resolved through `doc_terms`.
    pub fn postings_for_document(&self, id: &str) -> Result<Vec<Posting>> {
        let mut out = Vec::new();
        for term in self.document_terms(id)? {
            if let Some(bytes) = self.postings.get(posting_key(&term, id))? {
                out.push(decode(&bytes)?);
            }
        }
        Ok(out)
    }

    pub fn folders_by_parent(&self, parent_id: &str) -> Result<Vec<Folder>> {
        Ok(self
            .folders()?
            .into_iter()
            .filter(|f| f.parent_id.as_deref() == Some(parent_id))
            .collect())
    }

    /// Members of a folder, served from its denormalized id list.
    pub fn documents_in_folder(&self, folder_id: &str) -> Result<Vec<Document>> {
        let Some(folder) = self.get_folder(folder_id)? else {
            return Ok(Vec::new());
        };
        let mut out = Vec::with_capacity(folder.document_ids.len());
        for id in &folder.document_ids {
            if let Some(doc) = self.get_document(id)? {
                out.push(doc);
            }
        }
        Ok(out)
    }

    pub fn documents_with_tag(&self, name: &str) -> Result<Vec<Document>> {
        Ok(self
            .documents()?
            .into_iter()
            .filter(|d| d.tags.iter().any(|t| t == name))
            .collect())
    }

    fn document_terms(&self, id: &str) -> Result<Vec<String>> {
        match self.doc_terms.get(id.as_bytes())? {
            Some(bytes) => decode(&bytes),
            None => Ok(Vec::new()),
        }
    }

    // ---- document mutations ----

    /// Upsert a document together with its full posting replacement, folder
    /// membership diff and tag count diff, all in one transaction. If any
    /// part fails nothing commits, so the document write rolls back with the
    /// posting writes.
    pub fn save_document(&self, document: &Document) -> Result<()> {
        let _guard = self.write_lock.lock();

        let mut doc = document.clone();
        dedup_in_place(&mut doc.tags);
        // progress is a percentage
        doc.processing_progress = doc.processing_progress.min(100);
        let now = now_ms();
        let previous = self.get_document(&doc.id)?;
        match &previous {
            Some(prev) => {
                doc.created_at = prev.created_at;
                doc.updated_at = now.max(prev.created_at);
            }
            None => {
                if doc.created_at == 0 {
                    doc.created_at = now;
                }
                doc.updated_at = now.max(doc.created_at);
            }
        }

        let old_terms = self.document_terms(&doc.id)?;
        let postings = build_postings(&doc);
        let new_terms: Vec<String> = postings.iter().map(|p| p.term.clone()).collect();
        let old_folder = previous.as_ref().and_then(|d| d.folder_id.clone());
        let old_tags = previous.as_ref().map(|d| d.tags.clone()).unwrap_or_default();

        // Missing tag records get their ids outside the transaction so a
        // retried transaction reuses them.
        let mut created_tags: Vec<Tag> = Vec::new();
        for name in &doc.tags {
            if self.get_tag(name)?.is_none() && !created_tags.iter().any(|t| &t.name == name) {
                created_tags.push(Tag::new(name.clone()));
            }
        }

        let doc_bytes = encode(&doc)?;
        let terms_bytes = encode(&new_terms)?;
        let posting_entries = posting_entries(&postings)?;

        let result = (
            &self.documents,
            &self.postings,
            &self.doc_terms,
            &self.folders,
            &self.tags,
        )
            .transaction(|(documents, postings_t, doc_terms, folders, tags)| -> TxResult<()> {
                documents.insert(doc.id.as_bytes(), doc_bytes.clone())?;
                for term in &old_terms {
                    postings_t.remove(posting_key(term, &doc.id))?;
                }
                for (key, value) in &posting_entries {
                    postings_t.insert(key.as_slice(), value.clone())?;
                }
                doc_terms.insert(doc.id.as_bytes(), terms_bytes.clone())?;

                apply_folder_move(folders, &doc.id, old_folder.as_deref(), doc.folder_id.as_deref())?;

                for tag in &created_tags {
                    ensure_tag(tags, tag)?;
                }
                adjust_tag_counts(tags, &doc.tags, &old_tags)?;
                Ok(())
            });
        self.commit(result)?;
        debug!(id = %doc.id, terms = new_terms.len(), "document saved");
        Ok(())
    }

    /// Remove a document and cascade: postings, folder member list, tag
    /// counts. No-op when the id is unknown.
    pub fn delete_document(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let Some(doc) = self.get_document(id)? else {
            return Ok(());
        };
        let old_terms = self.document_terms(id)?;

        let result = (
            &self.documents,
            &self.postings,
            &self.doc_terms,
            &self.folders,
            &self.tags,
        )
            .transaction(|(documents, postings_t, doc_terms, folders, tags)| -> TxResult<()> {
                documents.remove(id.as_bytes())?;
                for term in &old_terms {
                    postings_t.remove(posting_key(term, id))?;
                }
                doc_terms.remove(id.as_bytes())?;
                apply_folder_move(folders, id, doc.folder_id.as_deref(), None)?;
                adjust_tag_counts(tags, &[], &doc.tags)?;
                Ok(())
            });
        self.commit(result)?;
        debug!(id, "document deleted");
        Ok(())
    }

    /// Rebuild the posting set for a stored document from its current text.
    /// Used after import, where postings are derived rather than shipped.
    pub fn index_document(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let Some(doc) = self.get_document(id)? else {
            return Err(Error::Indexing {
                id: id.to_string(),
                reason: "document not found".to_string(),
            });
        };
        let old_terms = self.document_terms(id)?;
        let postings = build_postings(&doc);
        let new_terms: Vec<String> = postings.iter().map(|p| p.term.clone()).collect();
        let terms_bytes = encode(&new_terms)?;
        let posting_entries = posting_entries(&postings)?;

        let result = (&self.postings, &self.doc_terms).transaction(
            |(postings_t, doc_terms)| -> TxResult<()> {
                for term in &old_terms {
                    postings_t.remove(posting_key(term, id))?;
                }
                for (key, value) in &posting_entries {
                    postings_t.insert(key.as_slice(), value.clone())?;
                }
                doc_terms.insert(id.as_bytes(), terms_bytes.clone())?;
                Ok(())
            },
        );
        self.commit(result).map_err(|e| Error::Indexing {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Reassign a document to another folder (or none), updating both
    /// folders' member lists in the same commit.
    pub fn move_document(&self, document_id: &str, folder_id: Option<&str>) -> Result<()> {
        let _guard = self.write_lock.lock();
        let Some(mut doc) = self.get_document(document_id)? else {
            return Ok(());
        };
        let from = doc.folder_id.clone();
        if from.as_deref() == folder_id {
            return Ok(());
        }
        doc.folder_id = folder_id.map(str::to_string);
        doc.updated_at = now_ms().max(doc.created_at);
        let doc_bytes = encode(&doc)?;

        let result = (&self.documents, &self.folders).transaction(
            |(documents, folders)| -> TxResult<()> {
                documents.insert(document_id.as_bytes(), doc_bytes.clone())?;
                apply_folder_move(folders, document_id, from.as_deref(), doc.folder_id.as_deref())?;
                Ok(())
            },
        );
        self.commit(result)
    }

    // ---- folder mutations ----

    /// Create a folder under `parent_id` (root when `None`), wiring the
    /// parent's child list in the same commit.
    pub fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<Folder> {
        let _guard = self.write_lock.lock();
        let parent_key = parent_id.unwrap_or(ROOT_FOLDER_ID).to_string();
        let folder = Folder::new(
            crate::model::new_id("folder"),
            name,
            Some(parent_key.clone()),
        );

        let result = self.folders.transaction(|folders| -> TxResult<()> {
            let mut parent = tx_get::<Folder>(folders, parent_key.as_bytes())?.ok_or_else(|| {
                abort(Error::Transaction(format!("unknown parent folder {parent_key}")))
            })?;
            tx_put(folders, folder.id.as_bytes(), &folder)?;
            if !parent.children.contains(&folder.id) {
                parent.children.push(folder.id.clone());
                tx_put(folders, parent_key.as_bytes(), &parent)?;
            }
            Ok(())
        });
        self.commit(result)?;
        Ok(folder)
    }

    /// Delete a folder: children are re-parented to the deleted folder's
    /// parent and member documents keep living with `folder_id` cleared.
    /// The root folder cannot be deleted; unknown ids are a no-op.
    pub fn delete_folder(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        if id == ROOT_FOLDER_ID {
            return Err(Error::Transaction("the root folder cannot be deleted".to_string()));
        }
        let Some(folder) = self.get_folder(id)? else {
            return Ok(());
        };
        let parent_key = folder
            .parent_id
            .clone()
            .unwrap_or_else(|| ROOT_FOLDER_ID.to_string());

        let result = (&self.folders, &self.documents).transaction(
            |(folders, documents)| -> TxResult<()> {
                folders.remove(id.as_bytes())?;
                for child_id in &folder.children {
                    if let Some(mut child) = tx_get::<Folder>(folders, child_id.as_bytes())? {
                        child.parent_id = Some(parent_key.clone());
                        tx_put(folders, child_id.as_bytes(), &child)?;
                    }
                }
                if let Some(mut parent) = tx_get::<Folder>(folders, parent_key.as_bytes())? {
                    parent.children.retain(|c| c != id);
                    for child_id in &folder.children {
                        if !parent.children.contains(child_id) {
                            parent.children.push(child_id.clone());
                        }
                    }
                    tx_put(folders, parent_key.as_bytes(), &parent)?;
                }
                for doc_id in &folder.document_ids {
                    if let Some(mut doc) = tx_get::<Document>(documents, doc_id.as_bytes())? {
                        doc.folder_id = None;
                        tx_put(documents, doc_id.as_bytes(), &doc)?;
                    }
                }
                Ok(())
            },
        );
        self.commit(result)
    }

    // ---- tag mutations ----

    /// Create a tag record, counting any documents that already carry the
    /// name so the denormalized count starts honest. Returns the existing
    /// record when the name is taken.
    pub fn create_tag(&self, name: &str, color: &str) -> Result<Tag> {
        let _guard = self.write_lock.lock();
        if let Some(existing) = self.get_tag(name)? {
            return Ok(existing);
        }
        let mut tag = Tag::new(name);
        tag.color = color.to_string();
        tag.document_count = self
            .documents()?
            .iter()
            .filter(|d| d.tags.iter().any(|t| t == name))
            .count() as u32;
        self.tags.insert(name.as_bytes(), encode(&tag)?)?;
        self.db.flush()?;
        Ok(tag)
    }

    /// Delete a tag and strip it from every carrying document in the same
    /// commit. Postings are untouched: tags are metadata, not indexed text.
    pub fn delete_tag(&self, name: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        if self.get_tag(name)?.is_none() {
            return Ok(());
        }
        let now = now_ms();
        let updated: Vec<(Vec<u8>, Vec<u8>)> = self
            .documents()?
            .into_iter()
            .filter(|d| d.tags.iter().any(|t| t == name))
            .map(|mut d| {
                d.tags.retain(|t| t != name);
                d.updated_at = now.max(d.created_at);
                Ok((d.id.clone().into_bytes(), encode(&d)?))
            })
            .collect::<Result<_>>()?;

        let result = (&self.tags, &self.documents).transaction(
            |(tags, documents)| -> TxResult<()> {
                tags.remove(name.as_bytes())?;
                for (key, value) in &updated {
                    documents.insert(key.as_slice(), value.clone())?;
                }
                Ok(())
            },
        );
        self.commit(result)
    }

    // ---- bulk upserts (import path; each call is one transaction) ----

    pub fn put_documents(&self, documents: &[Document]) -> Result<()> {
        let entries = documents
            .iter()
            .map(|d| Ok((d.id.clone().into_bytes(), encode(d)?)))
            .collect::<Result<Vec<_>>>()?;
        self.put_all(&self.documents, &entries)
    }

    pub fn put_folders(&self, folders: &[Folder]) -> Result<()> {
        let entries = folders
            .iter()
            .map(|f| Ok((f.id.clone().into_bytes(), encode(f)?)))
            .collect::<Result<Vec<_>>>()?;
        self.put_all(&self.folders, &entries)
    }

    pub fn put_tags(&self, tags: &[Tag]) -> Result<()> {
        let entries = tags
            .iter()
            .map(|t| Ok((t.name.clone().into_bytes(), encode(t)?)))
            .collect::<Result<Vec<_>>>()?;
        self.put_all(&self.tags, &entries)
    }

    fn put_all(&self, tree: &Tree, entries: &[(Vec<u8>, Vec<u8>)]) -> Result<()> {
        let _guard = self.write_lock.lock();
        let result = tree.transaction(|t| -> TxResult<()> {
            for (key, value) in entries {
                t.insert(key.as_slice(), value.clone())?;
            }
            Ok(())
        });
        self.commit(result)
    }

    fn commit<T>(&self, result: std::result::Result<T, TransactionError<Error>>) -> Result<T> {
        match result {
            Ok(value) => {
                self.db.flush()?;
                Ok(value)
            }
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(e)) => Err(Error::Storage(e)),
        }
    }
}

// ---- key encoding ----

fn posting_key(term: &str, document_id: &str) -> Vec<u8> {
    let mut key = term_prefix(term);
    key.extend_from_slice(document_id.as_bytes());
    key
}

fn term_prefix(term: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(term.len() + 4);
    key.extend_from_slice(&(term.len() as u32).to_be_bytes());
    key.extend_from_slice(term.as_bytes());
    key
}

fn posting_entries(postings: &[Posting]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
    postings
        .iter()
        .map(|p| Ok((posting_key(&p.term, &p.document_id), encode(p)?)))
        .collect()
}

// ---- codec ----

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

fn get<T: DeserializeOwned>(tree: &Tree, key: &[u8]) -> Result<Option<T>> {
    match tree.get(key)? {
        Some(bytes) => Ok(Some(decode(&bytes)?)),
        None => Ok(None),
    }
}

fn all<T: DeserializeOwned>(tree: &Tree) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for entry in tree.iter() {
        let (_, bytes) = entry?;
        out.push(decode(&bytes)?);
    }
    Ok(out)
}

fn dedup_in_place(values: &mut Vec<String>) {
    let mut seen: Vec<String> = Vec::with_capacity(values.len());
    values.retain(|v| {
        if seen.contains(v) {
            false
        } else {
            seen.push(v.clone());
            true
        }
    });
}

// ---- transactional helpers ----

fn abort(e: Error) -> ConflictableTransactionError<Error> {
    ConflictableTransactionError::Abort(e)
}

fn tx_get<T: DeserializeOwned>(tree: &TransactionalTree, key: &[u8]) -> TxResult<Option<T>> {
    match tree.get(key)? {
        Some(bytes) => decode(&bytes).map(Some).map_err(abort),
        None => Ok(None),
    }
}

fn tx_put<T: Serialize>(tree: &TransactionalTree, key: &[u8], value: &T) -> TxResult<()> {
    let bytes = encode(value).map_err(abort)?;
    tree.insert(key, bytes)?;
    Ok(())
}

/// Move a document id between folder member lists. The source folder may be
/// gone (weak reference); the target must exist.
fn apply_folder_move(
    folders: &TransactionalTree,
    document_id: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> TxResult<()> {
    if from != to {
        if let Some(old_id) = from {
            if let Some(mut folder) = tx_get::<Folder>(folders, old_id.as_bytes())? {
                folder.document_ids.retain(|d| d != document_id);
                tx_put(folders, old_id.as_bytes(), &folder)?;
            }
        }
    }
    if let Some(new_id) = to {
        let mut folder = tx_get::<Folder>(folders, new_id.as_bytes())?
            .ok_or_else(|| abort(Error::Transaction(format!("unknown folder {new_id}"))))?;
        if !folder.document_ids.iter().any(|d| d == document_id) {
            folder.document_ids.push(document_id.to_string());
            tx_put(folders, new_id.as_bytes(), &folder)?;
        }
    }
    Ok(())
}

fn ensure_tag(tags: &TransactionalTree, tag: &Tag) -> TxResult<()> {
    if tx_get::<Tag>(tags, tag.name.as_bytes())?.is_none() {
        tx_put(tags, tag.name.as_bytes(), tag)?;
    }
    Ok(())
}

fn adjust_tag_counts(
    tags: &TransactionalTree,
    new_tags: &[String],
    old_tags: &[String],
) -> TxResult<()> {
    for name in new_tags {
        if !old_tags.contains(name) {
            bump_tag(tags, name, 1)?;
        }
    }
    for name in old_tags {
        if !new_tags.contains(name) {
            bump_tag(tags, name, -1)?;
        }
    }
    Ok(())
}

fn bump_tag(tags: &TransactionalTree, name: &str, delta: i64) -> TxResult<()> {
    if let Some(mut tag) = tx_get::<Tag>(tags, name.as_bytes())? {
        tag.document_count = (i64::from(tag.document_count) + delta).max(0) as u32;
        tx_put(tags, name.as_bytes(), &tag)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentType;

    fn doc(id: &str, ocr_text: &str) -> Document {
        let mut d = Document::new(id, format!("{id}.txt"), DocumentType::Text);
        d.ocr_text = ocr_text.to_string();
        d
    }

    #[test]
    fn open_existing_requires_a_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog");
        match Store::open_existing(&path) {
            Err(Error::NotInitialized) => {}
            Err(other) => panic!("expected NotInitialized, got {other:?}"),
            Ok(_) => panic!("expected NotInitialized, got a store"),
        }
        drop(Store::open(&path).unwrap());
        Store::open_existing(&path).unwrap();
    }

    #[test]
    fn save_stamps_timestamps() {
        let store = Store::temporary().unwrap();
        store.save_document(&doc("a", "hello world")).unwrap();
        let saved = store.get_document("a").unwrap().unwrap();
        assert!(saved.created_at > 0);
        assert!(saved.updated_at >= saved.created_at);
    }

    #[test]
    fn folder_move_keeps_member_lists_consistent() {
        let store = Store::temporary().unwrap();
        let inbox = store.create_folder("Inbox", None).unwrap();
        let archive = store.create_folder("Archive", None).unwrap();

        let mut d = doc("a", "payload");
        d.folder_id = Some(inbox.id.clone());
        store.save_document(&d).unwrap();
        assert_eq!(
            store.get_folder(&inbox.id).unwrap().unwrap().document_ids,
            vec!["a".to_string()]
        );

        store.move_document("a", Some(&archive.id)).unwrap();
        assert!(store.get_folder(&inbox.id).unwrap().unwrap().document_ids.is_empty());
        assert_eq!(
            store.get_folder(&archive.id).unwrap().unwrap().document_ids,
            vec!["a".to_string()]
        );
        assert_eq!(
            store.get_document("a").unwrap().unwrap().folder_id,
            Some(archive.id.clone())
        );
    }

    #[test]
    fn create_folder_wires_parent_children() {
        let store = Store::temporary().unwrap();
        let parent = store.create_folder("Parent", None).unwrap();
        let child = store.create_folder("Child", Some(&parent.id)).unwrap();

        let root = store.get_folder(ROOT_FOLDER_ID).unwrap().unwrap();
        assert!(root.children.contains(&parent.id));
        let parent = store.get_folder(&parent.id).unwrap().unwrap();
        assert_eq!(parent.children, vec![child.id.clone()]);
        assert_eq!(child.parent_id.as_deref(), Some(parent.id.as_str()));
    }

    #[test]
    fn delete_folder_reparents_children_and_detaches_documents() {
        let store = Store::temporary().unwrap();
        let parent = store.create_folder("Parent", None).unwrap();
        let child = store.create_folder("Child", Some(&parent.id)).unwrap();
        let mut d = doc("a", "payload");
        d.folder_id = Some(parent.id.clone());
        store.save_document(&d).unwrap();

        store.delete_folder(&parent.id).unwrap();
        assert!(store.get_folder(&parent.id).unwrap().is_none());
        let child = store.get_folder(&child.id).unwrap().unwrap();
        assert_eq!(child.parent_id.as_deref(), Some(ROOT_FOLDER_ID));
        let root = store.get_folder(ROOT_FOLDER_ID).unwrap().unwrap();
        assert!(root.children.contains(&child.id));
        assert!(!root.children.contains(&parent.id));
        assert_eq!(store.get_document("a").unwrap().unwrap().folder_id, None);
    }

    #[test]
    fn root_folder_is_undeletable() {
        let store = Store::temporary().unwrap();
        assert!(store.delete_folder(ROOT_FOLDER_ID).is_err());
    }

    #[test]
    fn tag_counts_follow_document_saves() {
        let store = Store::temporary().unwrap();
        let mut d = doc("a", "payload");
        d.tags = vec!["finance".to_string()];
        store.save_document(&d).unwrap();
        assert_eq!(store.get_tag("finance").unwrap().unwrap().document_count, 1);

        let mut e = doc("b", "payload");
        e.tags = vec!["finance".to_string()];
        store.save_document(&e).unwrap();
        assert_eq!(store.get_tag("finance").unwrap().unwrap().document_count, 2);

        e.tags.clear();
        store.save_document(&e).unwrap();
        assert_eq!(store.get_tag("finance").unwrap().unwrap().document_count, 1);

        store.delete_document("a").unwrap();
        assert_eq!(store.get_tag("finance").unwrap().unwrap().document_count, 0);
    }

    #[test]
    fn delete_tag_strips_documents() {
        let store = Store::temporary().unwrap();
        let mut d = doc("a", "payload");
        d.tags = vec!["legal".to_string(), "keep".to_string()];
        store.save_document(&d).unwrap();

        store.delete_tag("legal").unwrap();
        assert!(store.get_tag("legal").unwrap().is_none());
        let saved = store.get_document("a").unwrap().unwrap();
        assert_eq!(saved.tags, vec!["keep".to_string()]);
        // deleting an unknown tag is a no-op
        store.delete_tag("legal").unwrap();
    }

    #[test]
    fn duplicate_tags_collapse_on_save() {
        let store = Store::temporary().unwrap();
        let mut d = doc("a", "payload");
        d.tags = vec!["x".to_string(), "x".to_string()];
        store.save_document(&d).unwrap();
        assert_eq!(store.get_document("a").unwrap().unwrap().tags, vec!["x".to_string()]);
        assert_eq!(store.get_tag("x").unwrap().unwrap().document_count, 1);
    }

    #[test]
    fn postings_scans_by_term_and_by_document() {
        let store = Store::temporary().unwrap();
        store.save_document(&doc("a", "alpha beta alpha")).unwrap();
        store.save_document(&doc("b", "beta gamma")).unwrap();

        let beta = store.postings_for_term("beta").unwrap();
        let ids: Vec<&str> = beta.iter().map(|p| p.document_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let mine = store.postings_for_document("a").unwrap();
        let mut terms: Vec<&str> = mine.iter().map(|p| p.term.as_str()).collect();
        terms.sort_unstable();
        assert!(terms.contains(&"alpha"));
        // a term that prefixes another must not leak into its scan
        store.save_document(&doc("c", "bet")).unwrap();
        assert_eq!(store.postings_for_term("beta").unwrap().len(), 2);
        assert_eq!(store.postings_for_term("bet").unwrap().len(), 1);
    }

    #[test]
    fn nul_bytes_in_terms_do_not_leak_into_shorter_scans() {
        let store = Store::temporary().unwrap();
        store.save_document(&doc("a", "ab\u{0}cd payload")).unwrap();

        // "ab" is never indexed and must not pick up the "ab\0cd" posting
        assert!(store.postings_for_term("ab").unwrap().is_empty());
        let terms: Vec<String> = store
            .postings_for_document("a")
            .unwrap()
            .into_iter()
            .map(|p| p.term)
            .collect();
        assert!(terms.contains(&"ab\u{0}cd".to_string()));
        assert_eq!(store.postings_for_term("ab\u{0}cd").unwrap().len(), 1);
    }

    #[test]
    fn processing_progress_is_clamped_to_a_percentage() {
        let store = Store::temporary().unwrap();
        let mut d = doc("a", "payload");
        d.processing_progress = 255;
        store.save_document(&d).unwrap();
        assert_eq!(
            store.get_document("a").unwrap().unwrap().processing_progress,
            100
        );
    }
}
