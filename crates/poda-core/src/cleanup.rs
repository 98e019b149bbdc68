use std::cmp::Reverse;

use tracing::{debug, info};

use crate::error::{CleanerError, Result};
use crate::failed_message::document_id;
use crate::storage::{MessageStore, WriteBatchOp};

/// Attempts retained per message; everything older than the newest ten
/// is dropped.
pub const MAX_ATTEMPTS_PER_MESSAGE: usize = 10;

/// Summaries fetched and committed per batch. Each record stages at most
/// two writes (document and summary row), so a page commit never exceeds
/// 30 operations.
pub const PAGE_SIZE: usize = 15;

#[derive(Debug, Clone)]
pub struct CleanupOptions {
    pub max_attempts: usize,
    pub page_size: usize,
    /// Restrict the sweep to messages belonging to this failure group.
    pub group_id: Option<String>,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS_PER_MESSAGE,
            page_size: PAGE_SIZE,
            group_id: None,
        }
    }
}

/// Totals reported by a completed sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub scanned: u64,
    pub truncated: u64,
}

/// Sweep the store once, truncating the attempt history of every message
/// that has accumulated more than `max_attempts` processing attempts.
///
/// Summaries are paged through in document-id order; each page's document
/// rewrites are committed as one atomic batch before the next page is
/// fetched. Truncation keeps the newest attempts by `attempted_at` and
/// stores them newest first. The sweep is idempotent: a message already
/// at or under the limit is read from the view but never rewritten.
pub fn run(store: &dyn MessageStore, options: &CleanupOptions) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();
    let mut start = 0usize;

    loop {
        let page = store.list_summaries(start, options.page_size, options.group_id.as_deref())?;
        if page.is_empty() {
            break;
        }

        let mut staged = Vec::new();
        for summary in &page {
            report.scanned += 1;
            if summary.attempt_count as usize <= options.max_attempts {
                continue;
            }

            let id = document_id(&summary.unique_message_id);
            let mut document = store
                .get_document(&id)?
                .ok_or_else(|| CleanerError::MessageNotFound(summary.unique_message_id.clone()))?;

            info!(
                unique_message_id = %document.unique_message_id,
                attempts = document.processing_attempts.len(),
                keep = options.max_attempts,
                "truncating processing attempts"
            );

            document
                .processing_attempts
                .sort_by_key(|attempt| Reverse(attempt.attempted_at));
            document.processing_attempts.truncate(options.max_attempts);

            staged.push(WriteBatchOp::PutDocument { document });
            report.truncated += 1;
        }

        debug!(start, records = page.len(), staged = staged.len(), "page scanned");
        if !staged.is_empty() {
            store.write_batch(staged)?;
        }
        start += page.len();
    }

    info!(
        scanned = report.scanned,
        truncated = report.truncated,
        "sweep finished"
    );
    Ok(report)
}
