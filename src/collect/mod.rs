//! Diagnostic collection pipeline
//!
//! Units are checked strictly one after another. Each check is a blocking
//! call, so it runs on tokio's blocking pool while the pipeline awaits it;
//! between units the pipeline yields once so progress output can render.
//! Cancellation is only observed at unit boundaries: a started check always
//! runs to completion, and a request that arrives during the last unit still
//! marks the collection interrupted.

mod cancel;

pub use cancel::CancellationToken;

use crate::diagnostics::tsconfig::DEFAULT_CONFIG_FILE;
use crate::diagnostics::{
    DiagnosticRecord, DiagnosticSource, Normalizer, RawDiagnostic, SourceError, TsConfigError,
    TypeCheckConfig,
};
use crate::fs::{FileSystem, RealFileSystem};
use crate::monorepo::MonorepoInfo;
use crate::progress::{ProgressEvent, ProgressHandler};
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Label of the single unit used when no packages were enumerated
pub const ROOT_UNIT: &str = "root";

#[derive(Debug, Error)]
pub enum UnitError {
    #[error(transparent)]
    Config(#[from] TsConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Type checker panicked: {0}")]
    Panicked(String),
}

/// One package to check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub label: String,
    pub path: PathBuf,
}

/// Result of one `collect` call
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Records in (unit order, within-unit order), ids 1..=N
    pub records: Vec<DiagnosticRecord>,
    /// Cancellation was requested before every unit finished
    pub interrupted: bool,
    pub units_total: usize,
    pub units_processed: usize,
    pub units_skipped: usize,
    pub units_failed: usize,
}

/// Packages to check; the scan root stands in when there are none
pub fn work_units(root: &Path, info: &MonorepoInfo) -> Vec<WorkUnit> {
    if info.packages.is_empty() {
        return vec![WorkUnit {
            label: ROOT_UNIT.to_string(),
            path: root.to_path_buf(),
        }];
    }

    info.packages
        .iter()
        .map(|p| WorkUnit {
            label: p.name.clone(),
            path: p.path.clone(),
        })
        .collect()
}

pub struct Collector {
    source: Arc<dyn DiagnosticSource>,
    fs: Arc<dyn FileSystem>,
    config_file_name: String,
    cancel: CancellationToken,
}

impl Collector {
    pub fn new(source: Arc<dyn DiagnosticSource>) -> Self {
        Self {
            source,
            fs: Arc::new(RealFileSystem),
            config_file_name: DEFAULT_CONFIG_FILE.to_string(),
            cancel: CancellationToken::new(),
        }
    }

    /// Read type-check configurations through `fs`
    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_config_file_name(mut self, name: impl Into<String>) -> Self {
        self.config_file_name = name.into();
        self
    }

    /// Share an externally owned token, e.g. one a signal handler sets
    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that interrupts this collector. Reset at the start of every
    /// [`Collector::collect`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn collect(
        &self,
        root: &Path,
        info: &MonorepoInfo,
        progress: Option<&dyn ProgressHandler>,
    ) -> Collection {
        self.cancel.reset();
        let started = Instant::now();
        let emit = |event: ProgressEvent| {
            if let Some(handler) = progress {
                handler.on_progress(&event);
            }
        };

        let units = work_units(root, info);
        let total = units.len();
        let mut normalizer = Normalizer::new();
        let mut collection = Collection {
            units_total: total,
            ..Default::default()
        };

        info!(
            source = self.source.name(),
            units = total,
            "Collecting diagnostics"
        );

        for (position, unit) in units.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(
                    remaining = total - position,
                    "Interrupted, returning partial results"
                );
                collection.interrupted = true;
                break;
            }

            let index = position + 1;
            emit(ProgressEvent::UnitStarted {
                label: unit.label.clone(),
                index,
                total,
            });

            let config_path = unit.path.join(&self.config_file_name);
            if !self.fs.is_file(&config_path) {
                warn!(
                    package = %unit.label,
                    path = %config_path.display(),
                    "No type-check configuration found, skipping package"
                );
                collection.units_skipped += 1;
                emit(ProgressEvent::UnitSkipped {
                    label: unit.label,
                    index,
                    total,
                    reason: format!("no {}", self.config_file_name),
                });
                tokio::task::yield_now().await;
                continue;
            }

            let unit_started = Instant::now();
            match self.check_unit(config_path).await {
                Ok(raw) => {
                    let records = normalizer.normalize_all(&unit.label, &raw);
                    debug!(
                        package = %unit.label,
                        diagnostics = records.len(),
                        "Package checked"
                    );
                    collection.units_processed += 1;
                    emit(ProgressEvent::UnitComplete {
                        label: unit.label,
                        index,
                        total,
                        diagnostics: records.len(),
                        duration: unit_started.elapsed(),
                    });
                    collection.records.extend(records);
                }
                Err(e) => {
                    warn!(package = %unit.label, error = %e, "Type check failed, skipping package");
                    collection.units_failed += 1;
                    emit(ProgressEvent::UnitFailed {
                        label: unit.label,
                        index,
                        total,
                        error: e.to_string(),
                    });
                }
            }

            tokio::task::yield_now().await;
        }

        if !collection.interrupted && self.cancel.is_cancelled() {
            info!("Interrupted while checking the last package");
            collection.interrupted = true;
        }

        emit(ProgressEvent::CollectionComplete {
            diagnostics: collection.records.len(),
            units: total,
            interrupted: collection.interrupted,
            total_time: started.elapsed(),
        });
        collection
    }

    /// Load the configuration and run the source on the blocking pool.
    /// Engine diagnostics come first, then configuration diagnostics.
    async fn check_unit(&self, config_path: PathBuf) -> Result<Vec<RawDiagnostic>, UnitError> {
        let source = self.source.clone();
        let fs = self.fs.clone();
        let task = tokio::task::spawn_blocking(move || -> Result<Vec<RawDiagnostic>, UnitError> {
            let config = TypeCheckConfig::load_with(fs.as_ref(), &config_path)?.resolve_with(fs.as_ref());
            let mut diagnostics = source.check(&config)?;
            diagnostics.extend(config.errors);
            Ok(diagnostics)
        });

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(UnitError::Panicked(panic_message(e.into_panic()))),
            Err(e) => Err(UnitError::Panicked(e.to_string())),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
