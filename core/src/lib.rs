pub mod error;
pub mod export;
pub mod extract;
pub mod index;
pub mod model;
pub mod query;
pub mod search;
pub mod store;
pub mod tokenizer;

pub use error::{Error, Result};
pub use model::{
    Document, DocumentType, Folder, Language, Posting, Settings, Tag, ROOT_FOLDER_ID,
};
pub use search::search;
pub use store::Store;
