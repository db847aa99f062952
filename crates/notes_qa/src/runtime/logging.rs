//! Diagnostic logging setup.
//!
//! The report itself goes to stdout; tracing output goes to stderr so the two never interleave
//! in redirected output.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Install the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` and falls back to `warn`, which still surfaces skipped files.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        tracing::debug!("logging initialized twice");
    }
}
