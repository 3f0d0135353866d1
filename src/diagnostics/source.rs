//! Diagnostic source boundary
//!
//! A [`DiagnosticSource`] is the type-checking engine. It is synchronous and
//! may block for a long time; callers run it off the async executor.

use super::{RawDiagnostic, ResolvedConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// The engine process could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but terminated abnormally
    #[error("{program} exited with status {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// Engine-specific failure
    #[error("Type check failed: {0}")]
    Engine(String),
}

pub trait DiagnosticSource: Send + Sync {
    /// Human-readable engine name
    fn name(&self) -> &str;

    /// Type-check one unit. Returns semantic, syntactic, declaration and
    /// configuration diagnostics in engine order.
    fn check(&self, config: &ResolvedConfig) -> Result<Vec<RawDiagnostic>, SourceError>;
}
