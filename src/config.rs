//! Configuration management for monocheck
//!
//! Settings load from environment variables with defaults; command-line
//! arguments override them afterwards.
//!
//! # Environment Variables
//!
//! - `MONOCHECK_TSCONFIG`: per-package type-check configuration file name - default: "tsconfig.json"
//! - `MONOCHECK_TSC`: path to the `tsc` executable - default: resolved per package
//! - `MONOCHECK_OUTPUT`: report path - default: "diagnostics.tsv"
//! - `MONOCHECK_LOG_LEVEL`: logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use monocheck::MonocheckConfig;
//!
//! let config = MonocheckConfig::default();
//! config.validate().expect("Invalid configuration");
//! ```

use crate::diagnostics::tsconfig::DEFAULT_CONFIG_FILE;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_OUTPUT: &str = "diagnostics.tsv";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid type-check configuration file name: '{0}'. Expected a bare file name such as tsconfig.json")]
    InvalidConfigFileName(String),

    #[error("Invalid log level: {0}. Valid options: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonocheckConfig {
    /// File name looked up at each package root
    pub tsconfig_name: String,

    /// Explicit `tsc` executable; resolved per package when absent
    pub tsc_path: Option<PathBuf>,

    /// Report destination
    pub output: PathBuf,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for MonocheckConfig {
    /// Load from `MONOCHECK_*` environment variables with fallbacks
    fn default() -> Self {
        let tsconfig_name =
            env::var("MONOCHECK_TSCONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let tsc_path = env::var("MONOCHECK_TSC")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let output = env::var("MONOCHECK_OUTPUT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        let log_level = env::var("MONOCHECK_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            tsconfig_name,
            tsc_path,
            output,
            log_level,
        }
    }
}

impl MonocheckConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the type-check configuration name is empty
    /// or contains a path separator, or when the log level is unknown.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.tsconfig_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ConfigError::InvalidConfigFileName(
                self.tsconfig_name.clone(),
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Report path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for MonocheckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Monocheck Configuration:")?;
        writeln!(f, "  Type-check config: {}", self.tsconfig_name)?;
        match &self.tsc_path {
            Some(path) => writeln!(f, "  tsc: {}", path.display())?,
            None => writeln!(f, "  tsc: auto")?,
        }
        writeln!(f, "  Output: {}", self.output.display())?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
