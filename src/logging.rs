//! Console logging setup.
//!
//! Everything the pipelines and the watcher report goes through `tracing`.
//! The subscriber writes to stderr so build summaries on stdout stay clean.

use std::env;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable consulted when no level flag is given
pub const LOG_LEVEL_ENV: &str = "ASSETFLOW_LOG_LEVEL";

/// Pick the log level from CLI flags, falling back to the environment.
pub fn select_level(log_level: Option<&str>, verbose: bool, quiet: bool) -> Level {
    if let Some(level) = log_level {
        parse_level(level)
    } else if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        let level = env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
        parse_level(&level)
    }
}

/// Install the global subscriber. Later calls are no-ops.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init(level: Level) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!("assetflow={}", level))
        };

        // try_init: a test harness may have installed a subscriber already
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init();
    });
}

pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level
            );
            Level::INFO
        }
    }
}
