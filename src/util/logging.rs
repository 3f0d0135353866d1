//! Structured logging setup
//!
//! Logs go to stderr through a `tracing-subscriber` registry. `RUST_LOG` is
//! honoured; otherwise the crate logs at the configured level and noisy
//! dependencies are held at `warn`.
//!
//! ```no_run
//! use monocheck::util::{init_logging, LoggingConfig};
//! use tracing::Level;
//!
//! init_logging(LoggingConfig::with_level(Level::DEBUG));
//! tracing::info!(root = "/repo", "Scanning");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's events
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., monocheck::collect) in logs
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON lines with targets, for machine consumption
    pub fn json(level: Level) -> Self {
        Self {
            level,
            use_json: true,
            include_target: true,
        }
    }
}

/// Parses a log level (case-insensitive)
pub fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Pick the effective level: an explicit level wins, then `--verbose`, then
/// `--quiet`, then the configured default
pub fn resolve_level(explicit: Option<&str>, verbose: bool, quiet: bool, configured: &str) -> Level {
    if let Some(level) = explicit.and_then(parse_level) {
        return level;
    }
    if verbose {
        return Level::DEBUG;
    }
    if quiet {
        return Level::ERROR;
    }
    parse_level(configured).unwrap_or(Level::INFO)
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env().add_directive(
            format!("monocheck={}", config.level)
                .parse()
                .expect("Static directive is valid"),
        );

        if env::var("RUST_LOG").is_err() {
            filter = filter
                .add_directive("ignore=warn".parse().expect("Static directive is valid"))
                .add_directive("globset=warn".parse().expect("Static directive is valid"));
        }

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.use_json {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target),
                )
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target),
                )
                .try_init()
        };

        if let Err(e) = result {
            eprintln!("Logging already initialized: {}", e);
        }
    });
}
