//! Diagnostic shapes
//!
//! [`RawDiagnostic`] mirrors what a type-checking engine reports: a category
//! code, a numeric code, a plain or chained message, and an optional file with
//! a zero-based character offset. [`DiagnosticRecord`] is the flat,
//! sequentially identified form that ends up in reports.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod mock;
pub mod normalize;
pub mod source;
pub mod tsc;
pub mod tsconfig;

pub use mock::{MockDiagnosticSource, MockResponse};
pub use normalize::Normalizer;
pub use source::{DiagnosticSource, SourceError};
pub use tsc::TscDiagnosticSource;
pub use tsconfig::{ResolvedConfig, TsConfigError, TypeCheckConfig};

/// Engine category codes, numbered the way the TypeScript compiler numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl DiagnosticCategory {
    pub fn code(self) -> u8 {
        match self {
            DiagnosticCategory::Warning => 0,
            DiagnosticCategory::Error => 1,
            DiagnosticCategory::Suggestion => 2,
            DiagnosticCategory::Message => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(DiagnosticCategory::Warning),
            1 => Some(DiagnosticCategory::Error),
            2 => Some(DiagnosticCategory::Suggestion),
            3 => Some(DiagnosticCategory::Message),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "Warning",
            DiagnosticCategory::Error => "Error",
            DiagnosticCategory::Suggestion => "Suggestion",
            DiagnosticCategory::Message => "Message",
        }
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiagnosticCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warning" => Ok(DiagnosticCategory::Warning),
            "error" => Ok(DiagnosticCategory::Error),
            "suggestion" => Ok(DiagnosticCategory::Suggestion),
            "message" => Ok(DiagnosticCategory::Message),
            other => Err(format!("Unknown diagnostic category: {}", other)),
        }
    }
}

/// A chained message: top-level text with nested elaborations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageChain {
    pub message_text: String,
    pub next: Vec<MessageChain>,
}

impl MessageChain {
    pub fn new(message_text: impl Into<String>) -> Self {
        Self {
            message_text: message_text.into(),
            next: Vec::new(),
        }
    }

    pub fn with_next(mut self, next: MessageChain) -> Self {
        self.next.push(next);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticMessage {
    Text(String),
    Chain(MessageChain),
}

impl DiagnosticMessage {
    /// Single-line description; a chain contributes only its top-level text
    pub fn flatten(&self) -> &str {
        match self {
            DiagnosticMessage::Text(text) => text,
            DiagnosticMessage::Chain(chain) => &chain.message_text,
        }
    }
}

impl From<&str> for DiagnosticMessage {
    fn from(text: &str) -> Self {
        DiagnosticMessage::Text(text.to_string())
    }
}

impl From<String> for DiagnosticMessage {
    fn from(text: String) -> Self {
        DiagnosticMessage::Text(text)
    }
}

impl From<MessageChain> for DiagnosticMessage {
    fn from(chain: MessageChain) -> Self {
        DiagnosticMessage::Chain(chain)
    }
}

/// Line start table for converting character offsets into positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMap {
    /// Character offset of each line start
    line_starts: Vec<usize>,
    /// Byte offset of each line start
    byte_starts: Vec<usize>,
    /// Total characters in the text
    len: usize,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut byte_starts = vec![0];
        let mut len = 0;
        let mut chars = text.char_indices().enumerate().peekable();

        while let Some((index, (byte, ch))) = chars.next() {
            len = index + 1;
            match ch {
                '\r' => {
                    if let Some((_, (_, '\n'))) = chars.peek() {
                        chars.next();
                        len = index + 2;
                        line_starts.push(index + 2);
                        byte_starts.push(byte + 2);
                    } else {
                        line_starts.push(index + 1);
                        byte_starts.push(byte + 1);
                    }
                }
                '\n' | '\u{2028}' | '\u{2029}' => {
                    line_starts.push(index + 1);
                    byte_starts.push(byte + ch.len_utf8());
                }
                _ => {}
            }
        }

        Self {
            line_starts,
            byte_starts,
            len,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Zero-based (line, character) of a zero-based character offset
    pub fn position_of(&self, offset: usize) -> (u32, u32) {
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let character = offset - self.line_starts[line];
        (line as u32, character as u32)
    }

    /// Zero-based character offset of a zero-based (line, character). A
    /// character past the end of the line lands on the line's last position.
    pub fn offset_of(&self, line: u32, character: u32) -> Option<usize> {
        let line = line as usize;
        let start = *self.line_starts.get(line)?;
        let last = match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.len,
        };
        Some((start + character as usize).min(last.max(start)))
    }

    /// Like [`LineMap::offset_of`], for a column counted in UTF-16 code units
    /// over `text`, the text this map was built from
    pub fn offset_of_utf16(&self, text: &str, line: u32, utf16_column: u32) -> Option<usize> {
        let index = line as usize;
        let byte_start = *self.byte_starts.get(index)?;
        let byte_end = self
            .byte_starts
            .get(index + 1)
            .copied()
            .unwrap_or(text.len());
        let line_text = text.get(byte_start..byte_end)?;

        let mut units = 0;
        let character = line_text
            .chars()
            .take_while(|ch| {
                let before = units;
                units += ch.len_utf16();
                before < utf16_column as usize
            })
            .count();
        self.offset_of(line, character as u32)
    }

    /// Character offset of a byte offset into `text`
    pub fn char_offset(text: &str, byte: usize) -> usize {
        text.get(..byte).map_or(0, |prefix| prefix.chars().count())
    }
}

/// The file a diagnostic is reported against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticFile {
    pub file_name: String,
    pub line_map: Option<Arc<LineMap>>,
}

impl DiagnosticFile {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            line_map: None,
        }
    }

    pub fn with_text(file_name: impl Into<String>, text: &str) -> Self {
        Self {
            file_name: file_name.into(),
            line_map: Some(Arc::new(LineMap::new(text))),
        }
    }

    pub fn with_line_map(file_name: impl Into<String>, line_map: Arc<LineMap>) -> Self {
        Self {
            file_name: file_name.into(),
            line_map: Some(line_map),
        }
    }
}

/// A diagnostic as reported by the engine, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDiagnostic {
    pub category: u8,
    pub code: u32,
    pub message: DiagnosticMessage,
    pub file: Option<DiagnosticFile>,
    /// Zero-based character offset into `file`
    pub start: Option<usize>,
}

impl RawDiagnostic {
    pub fn new(category: DiagnosticCategory, code: u32, message: impl Into<DiagnosticMessage>) -> Self {
        Self {
            category: category.code(),
            code,
            message: message.into(),
            file: None,
            start: None,
        }
    }

    pub fn error(code: u32, message: impl Into<DiagnosticMessage>) -> Self {
        Self::new(DiagnosticCategory::Error, code, message)
    }

    pub fn in_file(mut self, file: DiagnosticFile, start: Option<usize>) -> Self {
        self.file = Some(file);
        self.start = start;
        self
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.file_name.as_str())
    }

    /// Zero-based (line, character), when both a line map and offset are known
    pub fn position(&self) -> Option<(u32, u32)> {
        let line_map = self.file.as_ref()?.line_map.as_ref()?;
        Some(line_map.position_of(self.start?))
    }
}

/// The normalized, uniformly shaped diagnostic carried into reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    pub id: u64,
    pub package_name: String,
    pub file_name: String,
    pub error_code: u32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes_round_trip() {
        for code in 0..4 {
            assert_eq!(DiagnosticCategory::from_code(code).unwrap().code(), code);
        }
        assert!(DiagnosticCategory::from_code(9).is_none());
        assert_eq!("ERROR".parse::<DiagnosticCategory>(), Ok(DiagnosticCategory::Error));
        assert!("fatal".parse::<DiagnosticCategory>().is_err());
    }

    #[test]
    fn test_chain_flattens_to_top_level() {
        let chain = MessageChain::new("Type 'A' is not assignable to type 'B'.")
            .with_next(MessageChain::new("Property 'x' is missing."));
        let message = DiagnosticMessage::from(chain);
        assert_eq!(message.flatten(), "Type 'A' is not assignable to type 'B'.");
        assert_eq!(DiagnosticMessage::from("plain").flatten(), "plain");
    }

    #[test]
    fn test_line_map_positions() {
        let map = LineMap::new("ab\ncd\r\nef\rg");
        assert_eq!(map.line_count(), 4);
        assert_eq!(map.position_of(0), (0, 0));
        assert_eq!(map.position_of(1), (0, 1));
        assert_eq!(map.position_of(3), (1, 0));
        assert_eq!(map.position_of(7), (2, 0));
        assert_eq!(map.position_of(10), (3, 0));
        assert_eq!(map.offset_of(1, 1), Some(4));
        assert_eq!(map.offset_of(9, 0), None);
    }

    #[test]
    fn test_offset_is_clamped_to_its_line() {
        let map = LineMap::new("ab\ncd\r\nef");
        assert_eq!(map.offset_of(0, 40), Some(2));
        assert_eq!(map.position_of(map.offset_of(0, 40).unwrap()).0, 0);
        assert_eq!(map.position_of(map.offset_of(1, 40).unwrap()).0, 1);
        assert_eq!(map.offset_of(2, 40), Some(9));
    }

    #[test]
    fn test_utf16_columns_on_astral_lines() {
        let text = "let a = \"\u{1F600}\u{1F600}\u{1F600}\"; b\nnext";
        let map = LineMap::new(text);

        let offset = map.offset_of_utf16(text, 0, 18).unwrap();
        assert_eq!(map.position_of(offset), (0, 15));
        assert_eq!(text.chars().nth(offset), Some('b'));

        let past_end = map.offset_of_utf16(text, 0, 99).unwrap();
        assert_eq!(map.position_of(past_end).0, 0);
        assert_eq!(map.offset_of_utf16(text, 1, 2), Some(19));
    }

    #[test]
    fn test_char_offset_of_byte() {
        assert_eq!(LineMap::char_offset("é\"a\"", 2), 1);
        assert_eq!(LineMap::char_offset("abc", 99), 0);
    }

    #[test]
    fn test_line_map_counts_characters_not_bytes() {
        let map = LineMap::new("é\nx");
        assert_eq!(map.position_of(2), (1, 0));
    }

    #[test]
    fn test_raw_position_requires_map_and_offset() {
        let raw = RawDiagnostic::error(2322, "x").in_file(DiagnosticFile::new("a.ts"), Some(3));
        assert_eq!(raw.position(), None);

        let raw = RawDiagnostic::error(2322, "x")
            .in_file(DiagnosticFile::with_text("a.ts", "let a\nlet b"), Some(7));
        assert_eq!(raw.position(), Some((1, 1)));
    }
}
