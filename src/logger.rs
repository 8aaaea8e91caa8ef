//! Logging bootstrap for the CLI.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. `HOLT_LOG` overrides the
/// default filter; `verbose` raises it to `debug`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("HOLT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
