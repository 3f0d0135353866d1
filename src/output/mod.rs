//! Report output
//!
//! The TSV report is the stable contract: a header row, then one row per
//! record with the columns `id, package_name, file_name, error_code,
//! description`. JSON carries every record field.

mod json;
mod tsv;

pub use tsv::{sanitize_field, TSV_HEADER};

use crate::diagnostics::DiagnosticRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report: {0}")]
    Stream(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Tsv,
    Json,
}

pub struct ReportWriter {
    format: ReportFormat,
}

impl ReportWriter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Write `records` to `path`, creating parent directories as needed
    pub fn write(&self, records: &[DiagnosticRecord], path: &Path) -> Result<(), ReportError> {
        let io_error = |source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let file = File::create(path).map_err(io_error)?;
        let mut out = BufWriter::new(file);
        match self.write_to(records, &mut out) {
            Err(ReportError::Stream(source)) => Err(io_error(source)),
            other => other,
        }?;
        out.flush().map_err(io_error)
    }

    pub fn write_to(&self, records: &[DiagnosticRecord], out: &mut impl Write) -> Result<(), ReportError> {
        match self.format {
            ReportFormat::Tsv => tsv::write(records, out)?,
            ReportFormat::Json => json::write(records, out)?,
        }
        Ok(())
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new(ReportFormat::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: u64, description: &str) -> DiagnosticRecord {
        DiagnosticRecord {
            id,
            package_name: "web".to_string(),
            file_name: "/repo/web/src/index.ts".to_string(),
            error_code: 2322,
            description: description.to_string(),
            line: Some(3),
            column: Some(7),
            category: Some("error".to_string()),
        }
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reports/nested/out.tsv");

        ReportWriter::default()
            .write(&[record(1, "Type mismatch.")], &path)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert_eq!(content.lines().next(), Some(TSV_HEADER));
    }

    #[test]
    fn test_json_report_keeps_positions() {
        let mut out = Vec::new();
        ReportWriter::new(ReportFormat::Json)
            .write_to(&[record(1, "a\tb")], &mut out)
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["line"], 3);
        assert_eq!(value[0]["category"], "error");
        assert_eq!(value[0]["description"], "a\tb");
    }

    #[test]
    fn test_write_to_directory_fails() {
        let temp = TempDir::new().unwrap();
        let err = ReportWriter::default().write(&[], temp.path()).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }
}
