//! Utility modules for monocheck

pub mod logging;

pub use logging::{init_logging, resolve_level, LoggingConfig};
