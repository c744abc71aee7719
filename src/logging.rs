//! Logging setup for the tag-auditor binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "tag_auditor=info";
const DEBUG_LOG_FILTER: &str = "tag_auditor=debug";

/// Logging configuration for the CLI.
pub struct LogConfig {
    pub debug: bool,
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(config: &LogConfig) -> &'static str {
    if config.debug {
        DEBUG_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

/// Initialize tracing with stderr output, leaving stdout to the report.
pub fn init_logging(config: LogConfig) -> crate::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(&config)));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(config.debug)
                .with_filter(filter),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}
