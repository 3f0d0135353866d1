//! Terminal spinner progress handler

use super::{ProgressEvent, ProgressHandler};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Renders the current package on a spinner line
pub struct SpinnerHandler {
    bar: ProgressBar,
}

impl SpinnerHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if std::env::var("CI").is_ok() {
            bar.enable_steady_tick(Duration::from_secs(30));
        } else {
            bar.enable_steady_tick(Duration::from_millis(125));
        }
        bar.set_style(ProgressStyle::default_spinner());
        bar.set_message("Detecting workspace...");
        Self { bar }
    }

    /// Spinner that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn message(&self) -> String {
        self.bar.message()
    }
}

impl Default for SpinnerHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressHandler for SpinnerHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::DetectionComplete { kind, packages } => {
                self.bar
                    .set_message(format!("Found {} package(s) ({})", packages, kind));
            }
            ProgressEvent::UnitStarted { label, index, total } => {
                self.bar
                    .set_message(format!("[{}/{}] Checking {}", index, total, label));
            }
            ProgressEvent::UnitSkipped { label, reason, .. } => {
                self.bar.println(format!("skipped {}: {}", label, reason));
            }
            ProgressEvent::UnitFailed { label, error, .. } => {
                self.bar.println(format!("failed {}: {}", label, error));
            }
            ProgressEvent::UnitComplete { .. } => {}
            ProgressEvent::CollectionComplete { interrupted, .. } => {
                if *interrupted {
                    self.bar.abandon_with_message("Interrupted");
                } else {
                    self.bar.finish_and_clear();
                }
            }
        }
    }
}
