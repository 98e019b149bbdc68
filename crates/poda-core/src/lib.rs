pub mod cleanup;
pub mod error;
pub mod failed_message;
pub mod storage;
pub mod telemetry;

pub use cleanup::{CleanupOptions, CleanupReport};
pub use error::{CleanerError, Result, StorageError, StorageResult};
pub use failed_message::{FailedMessage, FailedMessageSummary, MessageStatus};
pub use storage::{MessageStore, RocksDbStore, WriteBatchOp};
