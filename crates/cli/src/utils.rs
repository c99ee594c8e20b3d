//! CLI utilities.

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber from the `FINCH_LOG` environment
/// variable. Logging is off unless the variable is set.
pub fn init_logger() {
    let filter = EnvFilter::try_from_env("FINCH_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
