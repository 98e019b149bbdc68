/// Low-level storage errors (RocksDB, serialization). This is the error
/// type of the `MessageStore` trait: store operations can only fail with
/// infrastructure errors, never domain errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to open message store at {path}: {message}")]
    Open { path: String, message: String },

    #[error("rocksdb error: {0}")]
    RocksDb(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<rocksdb::Error> for StorageError {
    fn from(err: rocksdb::Error) -> Self {
        StorageError::RocksDb(err.into_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Errors of the maintenance pass itself.
#[derive(Debug, thiserror::Error)]
pub enum CleanerError {
    /// A summary points at a document that does not exist. Summaries are
    /// rebuilt after unclean shutdowns, so this means the store is corrupt
    /// and the pass must not continue.
    #[error("summary references missing document: {0}")]
    MessageNotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
pub type Result<T> = std::result::Result<T, CleanerError>;
