use std::path::PathBuf;

use thiserror::Error;

use crate::models::{store::Store, task::TaskError};

pub mod json;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load tasks from '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from '{path}': {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Task file '{path}' is inconsistent: {source}")]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: TaskError,
    },

    #[error("Failed to save tasks to '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize tasks to JSON: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },
}

pub trait Storage {
    /// Loads the document, `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Store>, StorageError>;
    fn save(&self, store: &Store) -> Result<(), StorageError>;
}
