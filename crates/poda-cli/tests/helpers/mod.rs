#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::process::{Command, Output};

use poda_core::failed_message::{
    document_id, FailedMessage, FailureGroup, MessageStatus, ProcessingAttempt,
};
use poda_core::storage::{MessageStore, RocksDbStore, WriteBatchOp};

/// Output from a `poda` invocation.
pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Run the `poda` binary with the given arguments.
pub fn poda_run(args: &[&str]) -> CliOutput {
    let output: Output = Command::new(env!("CARGO_BIN_EXE_poda"))
        .args(args)
        .output()
        .expect("run poda");

    CliOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
    }
}

/// Build a failed message whose attempts were made at 1..=attempts.
pub fn message(unique_id: &str, group: &str, attempts: usize) -> FailedMessage {
    FailedMessage {
        unique_message_id: unique_id.to_string(),
        status: MessageStatus::Unresolved,
        failure_groups: vec![FailureGroup {
            id: group.to_string(),
            title: "Handler exception".to_string(),
        }],
        processing_attempts: (1..=attempts as u64)
            .map(|at| ProcessingAttempt {
                attempted_at: at,
                message_id: format!("delivery-{at}"),
                headers: HashMap::new(),
                failure_reason: "handler threw".to_string(),
            })
            .collect(),
    }
}

/// Create a store at `path` and populate it, closing cleanly afterwards.
pub fn seed_store(path: &Path, messages: Vec<FailedMessage>) {
    let store = RocksDbStore::create(path).expect("create store");
    let ops = messages
        .into_iter()
        .map(|document| WriteBatchOp::PutDocument { document })
        .collect();
    store.write_batch(ops).expect("seed documents");
    store.close().expect("close store");
}

/// Attempt count per unique message id, read from the store on disk.
pub fn attempt_counts(path: &Path) -> BTreeMap<String, usize> {
    let store = RocksDbStore::open(path).expect("open store");
    let mut counts = BTreeMap::new();
    for summary in store
        .list_summaries(0, usize::MAX, None)
        .expect("list summaries")
    {
        let id = document_id(&summary.unique_message_id);
        let document = store
            .get_document(&id)
            .expect("get document")
            .expect("document exists");
        counts.insert(summary.unique_message_id, document.processing_attempts.len());
    }
    store.close().expect("close store");
    counts
}
