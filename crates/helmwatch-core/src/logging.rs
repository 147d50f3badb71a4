use tracing_subscriber::EnvFilter;

/// Install the global JSON log subscriber on stderr.
///
/// `RUST_LOG` takes precedence; otherwise `quiet` selects `warn` and verbose
/// mode selects `info`. Safe to call more than once.
pub fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
