use uuid::Uuid;

use crate::error::StorageResult;
use crate::failed_message::{FailedMessage, FailedMessageSummary};

/// Represents a single operation in an atomic write batch.
///
/// Operations carry full domain values; the store serializes them and keeps
/// the summary projection in step with the documents, so a caller cannot
/// commit one without the other.
#[derive(Debug)]
pub enum WriteBatchOp {
    /// Write the document and its refreshed summary.
    PutDocument { document: FailedMessage },
    /// Remove the document and its summary. The owning service's retention
    /// path; the maintenance pass never deletes.
    DeleteDocument { id: Uuid },
}

/// Store trait the cleanup pass programs against. The handle is exclusively
/// owned by a single sequential pass, so implementations need no internal
/// locking beyond what the engine provides.
pub trait MessageStore {
    /// Page the summaries projection in ascending document-id order:
    /// apply the optional group filter, skip `start` filtered entries,
    /// return up to `limit` summaries.
    fn list_summaries(
        &self,
        start: usize,
        limit: usize,
        group_id: Option<&str>,
    ) -> StorageResult<Vec<FailedMessageSummary>>;

    /// Load a full document by its derived id.
    fn get_document(&self, id: &Uuid) -> StorageResult<Option<FailedMessage>>;

    /// Atomically apply a batch of write operations. Either every operation
    /// in the batch is persisted or none is.
    fn write_batch(&self, ops: Vec<WriteBatchOp>) -> StorageResult<()>;
}
