use thiserror::Error;

use crate::models::Task;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key `{0}`")]
    InvalidKey(String),

    #[error("quota exceeded writing `{key}`: needs {needed} bytes, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },
}

/// Persisted data could not be turned back into a collection.
///
/// Stores recover from this locally; it never reaches a collaborator.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid timestamp in `{field}`: {value:?}")]
    Timestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// A mutation was applied in memory but could not be written out.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write `{key}`: {source}")]
    Write {
        key: String,
        #[source]
        source: StorageError,
    },
}

/// `TaskStore::add` kept the new task in memory but could not write it out.
#[derive(Debug, Error)]
#[error("task `{}` was added but not saved: {source}", .task.id)]
pub struct UnsavedTaskError {
    pub task: Task,
    #[source]
    pub source: PersistenceError,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("category `{id}` already exists")]
pub struct DuplicateCategoryError {
    pub id: String,
}

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error(transparent)]
    Duplicate(#[from] DuplicateCategoryError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
