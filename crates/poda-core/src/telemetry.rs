use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for a maintenance run.
///
/// Output is human-readable on stderr; the log level is controlled by the
/// `RUST_LOG` environment variable, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
