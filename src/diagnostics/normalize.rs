//! Raw diagnostic normalization
//!
//! A [`Normalizer`] owns the sequence counter for one collection run. Ids start
//! at 1 and increase by one per record, whichever unit the record came from.

use super::{DiagnosticCategory, DiagnosticRecord, RawDiagnostic};

/// File name used for diagnostics that carry no source location
pub const UNKNOWN_FILE: &str = "unknown";

#[derive(Debug, Default)]
pub struct Normalizer {
    last_id: u64,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records issued so far
    pub fn issued(&self) -> u64 {
        self.last_id
    }

    pub fn normalize(&mut self, package_name: &str, raw: &RawDiagnostic) -> DiagnosticRecord {
        self.last_id += 1;

        let (line, column) = match raw.position() {
            Some((line, character)) => (Some(line + 1), Some(character + 1)),
            None => (None, None),
        };

        DiagnosticRecord {
            id: self.last_id,
            package_name: package_name.to_string(),
            file_name: raw.file_name().unwrap_or(UNKNOWN_FILE).to_string(),
            error_code: raw.code,
            description: raw.message.flatten().to_string(),
            line,
            column,
            category: DiagnosticCategory::from_code(raw.category).map(|c| c.name().to_lowercase()),
        }
    }

    pub fn normalize_all<'a>(
        &mut self,
        package_name: &str,
        raw: impl IntoIterator<Item = &'a RawDiagnostic>,
    ) -> Vec<DiagnosticRecord> {
        raw.into_iter()
            .map(|diagnostic| self.normalize(package_name, diagnostic))
            .collect()
    }
}
