mod helpers;

use helpers::{attempt_counts, message, poda_run, seed_store};
use poda_core::storage::RocksDbStore;

#[test]
fn prints_usage_without_arguments() {
    let output = poda_run(&[]);
    assert!(!output.success);
    assert!(output.stderr.contains("Usage:"), "stderr: {}", output.stderr);
}

#[test]
fn refuses_to_run_without_confirm() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store");
    seed_store(&path, vec![message("uid-0", "group-a", 12)]);

    let output = poda_run(&[path.to_str().unwrap()]);
    assert!(!output.success);
    assert!(
        output.stderr.contains("--confirm"),
        "stderr should point at --confirm: {}",
        output.stderr
    );

    // Nothing was touched.
    assert_eq!(attempt_counts(&path)["uid-0"], 12);
}

#[test]
fn sweeps_truncates_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store");
    let messages = (0..37)
        .map(|i| message(&format!("uid-{i:02}"), "group-a", 13))
        .collect();
    seed_store(&path, messages);

    let first = poda_run(&[path.to_str().unwrap(), "--confirm"]);
    assert!(first.success, "stderr: {}", first.stderr);
    assert!(
        first.stdout.contains("Scanned 37 failed messages, truncated 37."),
        "stdout: {}",
        first.stdout
    );
    assert!(attempt_counts(&path).values().all(|&count| count == 10));

    let second = poda_run(&[path.to_str().unwrap(), "--confirm"]);
    assert!(second.success, "stderr: {}", second.stderr);
    assert!(
        second.stdout.contains("Scanned 37 failed messages, truncated 0."),
        "stdout: {}",
        second.stdout
    );
}

#[test]
fn group_filter_limits_the_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store");
    seed_store(
        &path,
        vec![
            message("a-0", "group-a", 12),
            message("b-0", "group-b", 12),
        ],
    );

    let output = poda_run(&[
        path.to_str().unwrap(),
        "--confirm",
        "--group-id",
        "group-b",
    ]);
    assert!(output.success, "stderr: {}", output.stderr);
    assert!(
        output.stdout.contains("Scanned 1 failed message, truncated 1."),
        "stdout: {}",
        output.stdout
    );

    let counts = attempt_counts(&path);
    assert_eq!(counts["a-0"], 12, "out-of-scope group left alone");
    assert_eq!(counts["b-0"], 10);
}

#[test]
fn missing_store_path_is_fatal_and_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-store-here");

    let output = poda_run(&[path.to_str().unwrap(), "--confirm"]);
    assert!(!output.success);
    assert!(
        output.stderr.contains("re-running this tool is safe"),
        "stderr: {}",
        output.stderr
    );
    assert!(
        output.stderr.contains("ldb repair"),
        "stderr: {}",
        output.stderr
    );
    assert!(
        output.stderr.contains("github.com/faiscadev/poda/issues"),
        "stderr: {}",
        output.stderr
    );
    assert!(!path.exists(), "a failed run must not create a store");
}

#[test]
fn refuses_a_store_held_by_another_process() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store");
    seed_store(&path, vec![message("uid-0", "group-a", 12)]);

    // Hold the store open, as the owning service would.
    let store = RocksDbStore::open(&path).unwrap();

    let output = poda_run(&[path.to_str().unwrap(), "--confirm"]);
    assert!(!output.success, "stdout: {}", output.stdout);

    drop(store);
    assert_eq!(attempt_counts(&path)["uid-0"], 12);
}
