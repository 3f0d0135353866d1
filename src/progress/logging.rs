//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::DetectionComplete { kind, packages } => {
                info!(kind = %kind, packages, "Detection complete");
            }
            ProgressEvent::UnitStarted { label, index, total } => {
                info!(
                    package = %label,
                    progress = format!("{}/{}", index, total),
                    "Checking package"
                );
            }
            ProgressEvent::UnitSkipped {
                label,
                index,
                total,
                reason,
            } => {
                debug!(
                    package = %label,
                    progress = format!("{}/{}", index, total),
                    reason = %reason,
                    "Package skipped"
                );
            }
            ProgressEvent::UnitFailed {
                label,
                index,
                total,
                error,
            } => {
                warn!(
                    package = %label,
                    progress = format!("{}/{}", index, total),
                    error = %error,
                    "Package check failed"
                );
            }
            ProgressEvent::UnitComplete {
                label,
                index,
                total,
                diagnostics,
                duration,
            } => {
                debug!(
                    package = %label,
                    progress = format!("{}/{}", index, total),
                    diagnostics,
                    duration_ms = duration.as_millis(),
                    "Package check complete"
                );
            }
            ProgressEvent::CollectionComplete {
                diagnostics,
                units,
                interrupted,
                total_time,
            } => {
                if *interrupted {
                    warn!(diagnostics, units, "Collection interrupted");
                } else {
                    info!(
                        diagnostics,
                        units,
                        total_time_ms = total_time.as_millis(),
                        "Collection complete"
                    );
                }
            }
        }
    }
}
