//! Diagnostic logging
//!
//! Diagnostics go to stderr through `tracing`, filtered by `PEPSIN_LOG`
//! (any `EnvFilter` directive, default `warn`). User-facing output does not
//! go through here.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Variable holding the filter directive
pub const LOG_ENV: &str = "PEPSIN_LOG";

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Filter from `PEPSIN_LOG`, falling back to the default level
pub fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install the global subscriber; later calls are no-ops
pub fn init_logging() {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false);

    let _ = Registry::default()
        .with(build_env_filter())
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging();
        init_logging();
        tracing::debug!("still alive");
    }
}
