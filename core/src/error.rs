pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store directory carries no catalog marker. Read paths never
    /// create a catalog implicitly; use `Store::open` to initialize one.
    #[error("store is not initialized")]
    NotInitialized,

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("storage transaction failed: {0}")]
    Transaction(String),

    #[error("encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("indexing failed for document {id}: {reason}")]
    Indexing { id: String, reason: String },

    #[error("import failed: {0}")]
    Import(String),
}
