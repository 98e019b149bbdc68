use std::path::PathBuf;
use std::process;

use clap::Parser;
use poda_core::cleanup::{self, CleanupOptions, CleanupReport};
use poda_core::error::CleanerError;
use poda_core::storage::RocksDbStore;
use sha2::{Digest, Sha256};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "poda", about = "Prune oversized attempt histories in a failed-message store")]
struct Cli {
    /// Path to the failed-message store directory
    db_path: PathBuf,

    /// Acknowledge that documents will be rewritten in place
    #[arg(long)]
    confirm: bool,

    /// Only sweep messages belonging to this failure group
    #[arg(long)]
    group_id: Option<String>,
}

/// Stable fingerprint for a failure, so recurring errors can be matched
/// across runs and machines without comparing full messages.
fn error_hash(err: &CleanerError) -> String {
    let mut hasher = Sha256::new();
    hasher.update(err.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

fn run(cli: &Cli) -> poda_core::Result<CleanupReport> {
    let store = RocksDbStore::open(&cli.db_path)?;
    let options = CleanupOptions {
        group_id: cli.group_id.clone(),
        ..CleanupOptions::default()
    };
    let report = cleanup::run(&store, &options)?;
    store.close()?;
    Ok(report)
}

fn main() {
    poda_core::telemetry::init_tracing();
    let cli = Cli::parse();

    if !cli.confirm {
        eprintln!("Error: poda rewrites failed-message documents in place.");
        eprintln!("Stop the service that owns the store, then re-run with --confirm.");
        process::exit(1);
    }

    info!(db_path = %cli.db_path.display(), "starting failed-message clean-up");

    match run(&cli) {
        Ok(report) => {
            println!(
                "Scanned {} failed message{}, truncated {}.",
                report.scanned,
                if report.scanned == 1 { "" } else { "s" },
                report.truncated
            );
        }
        Err(err) => {
            error!(error = %err, error_hash = %error_hash(&err), "clean-up failed");
            eprintln!();
            eprintln!("The clean-up did not complete. Pages are committed atomically, so no");
            eprintln!("partially rewritten page was left behind; once the cause is fixed,");
            eprintln!("re-running this tool is safe.");
            eprintln!();
            eprintln!("If the store itself is damaged, repair it with RocksDB's ldb tool:");
            eprintln!("    ldb repair --db={}", cli.db_path.display());
            eprintln!();
            eprintln!("If the problem persists, report it at");
            eprintln!("https://github.com/faiscadev/poda/issues, quoting the error hash above.");
            process::exit(1);
        }
    }
}
