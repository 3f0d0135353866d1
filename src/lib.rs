//! monocheck - type-check every package of a JavaScript/TypeScript monorepo
//!
//! The library has two halves. Detection works out which workspace convention
//! a repository follows (turbo, pnpm, yarn, npm, lerna, nx) and enumerates the
//! packages it declares. Collection then runs a diagnostic source over each
//! package in turn and flattens what it reports into uniformly shaped records
//! with sequential ids.
//!
//! # Example Usage
//!
//! ```no_run
//! use monocheck::{detect_monorepo, Collector, ReportWriter, TscDiagnosticSource};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let root = Path::new("/path/to/repo");
//! let info = detect_monorepo(root, Vec::new())?;
//!
//! let source = Arc::new(TscDiagnosticSource::new(&info.root_path));
//! let collection = Collector::new(source).collect(&info.root_path, &info, None).await;
//!
//! ReportWriter::default().write(&collection.records, Path::new("diagnostics.tsv"))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`monorepo`]: workspace detection and package enumeration
//! - [`diagnostics`]: diagnostic shapes, type-check configuration, sources
//! - [`collect`]: the per-package collection pipeline
//! - [`output`]: TSV and JSON reports

pub mod cli;
pub mod collect;
pub mod config;
pub mod diagnostics;
pub mod fs;
pub mod manifest;
pub mod monorepo;
pub mod output;
pub mod progress;
pub mod util;

pub use collect::{CancellationToken, Collection, Collector, UnitError};
pub use config::{ConfigError, MonocheckConfig};
pub use diagnostics::{
    DiagnosticRecord, DiagnosticSource, RawDiagnostic, SourceError, TscDiagnosticSource,
};
pub use monorepo::{
    detect_monorepo, DetectorRegistry, MonorepoInfo, MonorepoKind, PackageInfo, WorkspaceDetector,
};
pub use output::{ReportError, ReportFormat, ReportWriter};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
