//! Human-readable run summary

use crate::collect::Collection;
use std::path::Path;

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

/// `N diagnostics in M packages`, followed by skip/failure counts, the
/// interruption marker and the report path
pub fn format_summary(collection: &Collection, report: &Path) -> String {
    let mut summary = format!(
        "{} in {}",
        plural(collection.records.len(), "diagnostic"),
        plural(collection.units_total, "package"),
    );

    let mut notes = Vec::new();
    if collection.units_skipped > 0 {
        notes.push(format!("{} skipped", collection.units_skipped));
    }
    if collection.units_failed > 0 {
        notes.push(format!("{} failed", collection.units_failed));
    }
    if collection.interrupted {
        notes.push("interrupted".to_string());
    }
    if !notes.is_empty() {
        summary.push_str(&format!(" ({})", notes.join(", ")));
    }

    summary.push_str(&format!(", written to {}", report.display()));
    summary
}
