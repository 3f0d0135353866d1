//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while a repository is scanned. Unit positions are 1-based.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Convention detected and packages enumerated
    DetectionComplete { kind: String, packages: usize },

    /// A unit is about to be checked
    UnitStarted {
        label: String,
        index: usize,
        total: usize,
    },

    /// A unit has no type-check configuration
    UnitSkipped {
        label: String,
        index: usize,
        total: usize,
        reason: String,
    },

    /// A unit's configuration or check failed
    UnitFailed {
        label: String,
        index: usize,
        total: usize,
        error: String,
    },

    /// A unit was checked
    UnitComplete {
        label: String,
        index: usize,
        total: usize,
        diagnostics: usize,
        duration: Duration,
    },

    /// All units processed, or the run was interrupted
    CollectionComplete {
        diagnostics: usize,
        units: usize,
        interrupted: bool,
        total_time: Duration,
    },
}

/// Trait for observing progress. Handlers must not affect control flow.
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {
        // Intentionally empty
    }
}
