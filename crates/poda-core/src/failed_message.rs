use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deriving document ids from unique message ids.
const DOCUMENT_NAMESPACE: Uuid = Uuid::from_u128(0x8f2a_1c44_9b7e_4d03_b6aa_5e91_c0de_7731);

/// Deterministically derive the store document id for a unique message id.
/// The same unique id always maps to the same document, so the owning
/// service and this tool address documents without coordination.
pub fn document_id(unique_message_id: &str) -> Uuid {
    Uuid::new_v5(&DOCUMENT_NAMESPACE, unique_message_id.as_bytes())
}

/// A message that exhausted processing at the owning service, together with
/// the full history of processing attempts. This tool rewrites
/// `processing_attempts` only; everything else belongs to the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedMessage {
    pub unique_message_id: String,
    pub status: MessageStatus,
    pub failure_groups: Vec<FailureGroup>,
    pub processing_attempts: Vec<ProcessingAttempt>,
}

impl FailedMessage {
    /// The derived id under which this document is stored.
    pub fn document_id(&self) -> Uuid {
        document_id(&self.unique_message_id)
    }
}

/// One timestamped attempt to process a failed message. Attempts are
/// immutable once recorded; `attempted_at` is used solely for ordering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessingAttempt {
    /// Nanoseconds since the Unix epoch.
    pub attempted_at: u64,
    /// Transport-level id of this delivery (distinct from the unique id).
    pub message_id: String,
    pub headers: HashMap<String, String>,
    pub failure_reason: String,
}

/// Classification bucket assigned by the owning service's failure grouping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailureGroup {
    pub id: String,
    pub title: String,
}

/// Lifecycle state recorded by the owning service. Persisted as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MessageStatus {
    Unresolved = 1,
    Resolved = 2,
    RetryIssued = 3,
    Archived = 4,
}

impl From<MessageStatus> for u8 {
    fn from(status: MessageStatus) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for MessageStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MessageStatus::Unresolved),
            2 => Ok(MessageStatus::Resolved),
            3 => Ok(MessageStatus::RetryIssued),
            4 => Ok(MessageStatus::Archived),
            other => Err(format!("unknown message status: {other}")),
        }
    }
}

/// Projection of a failed message used to page the collection without
/// loading full documents. The store maintains one summary per document,
/// in the same atomic batch as every document write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedMessageSummary {
    pub unique_message_id: String,
    pub attempt_count: u32,
    pub group_ids: Vec<String>,
}

impl From<&FailedMessage> for FailedMessageSummary {
    fn from(message: &FailedMessage) -> Self {
        Self {
            unique_message_id: message.unique_message_id.clone(),
            attempt_count: message.processing_attempts.len() as u32,
            group_ids: message.failure_groups.iter().map(|g| g.id.clone()).collect(),
        }
    }
}
