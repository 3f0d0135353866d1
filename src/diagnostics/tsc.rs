//! `tsc` as a diagnostic source
//!
//! Runs the TypeScript compiler in check-only mode against a unit's
//! configuration and turns its plain (non-pretty) output back into raw
//! diagnostics with character offsets.

use super::source::{DiagnosticSource, SourceError};
use super::{
    DiagnosticCategory, DiagnosticFile, DiagnosticMessage, LineMap, MessageChain, RawDiagnostic,
    ResolvedConfig,
};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

const TSC_BIN: &str = if cfg!(windows) { "tsc.cmd" } else { "tsc" };

/// Exit statuses tsc uses for a completed check: clean, diagnostics with
/// outputs skipped, diagnostics with outputs generated
const NORMAL_EXIT_CODES: &[i32] = &[0, 1, 2];

/// `file(line,col): error TS1234: message`
static LOCATED_PATTERN: OnceLock<Regex> = OnceLock::new();

/// `error TS1234: message`
static GLOBAL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn located_pattern() -> &'static Regex {
    LOCATED_PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\): (?P<category>error|warning|suggestion|message) TS(?P<code>\d+): (?P<message>.*)$",
        )
        .expect("Static regex is valid")
    })
}

fn global_pattern() -> &'static Regex {
    GLOBAL_PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<category>error|warning|suggestion|message) TS(?P<code>\d+): (?P<message>.*)$")
            .expect("Static regex is valid")
    })
}

pub struct TscDiagnosticSource {
    root: PathBuf,
    executable: Option<PathBuf>,
}

impl TscDiagnosticSource {
    /// Source for a scan rooted at `root`; the root's `node_modules/.bin` is
    /// one of the places `tsc` is looked up
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            executable: None,
        }
    }

    pub fn with_executable(mut self, executable: Option<PathBuf>) -> Self {
        self.executable = executable;
        self
    }

    /// Explicit executable, then the unit's local install, then the scan
    /// root's, then `PATH`
    pub fn resolve_executable(&self, unit_dir: &Path) -> PathBuf {
        if let Some(executable) = &self.executable {
            return executable.clone();
        }

        [unit_dir, self.root.as_path()]
            .iter()
            .map(|dir| dir.join("node_modules").join(".bin").join(TSC_BIN))
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| PathBuf::from(TSC_BIN))
    }
}

impl DiagnosticSource for TscDiagnosticSource {
    fn name(&self) -> &str {
        "tsc"
    }

    fn check(&self, config: &ResolvedConfig) -> Result<Vec<RawDiagnostic>, SourceError> {
        let program = self.resolve_executable(&config.project_dir);
        let program_name = program.display().to_string();
        debug!(program = %program_name, config = %config.config_path.display(), "Running type check");

        let output = Command::new(&program)
            .arg("--project")
            .arg(&config.config_path)
            .args(["--noEmit", "--pretty", "false"])
            .current_dir(&config.project_dir)
            .output()
            .map_err(|source| SourceError::Spawn {
                program: program_name.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let diagnostics = parse_output(&stdout, &config.project_dir);

        let normal = output
            .status
            .code()
            .is_some_and(|code| NORMAL_EXIT_CODES.contains(&code));
        if !normal {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if diagnostics.is_empty() {
                return Err(SourceError::Failed {
                    program: program_name,
                    status: output.status.to_string(),
                    stderr,
                });
            }
            warn!(
                program = %program_name,
                status = %output.status,
                "Type checker exited abnormally, keeping its diagnostics"
            );
        }

        Ok(diagnostics
            .into_iter()
            .filter(|d| {
                let line = d.position().map(|(line, _)| line);
                !config.already_reported(d.code, d.file_name(), line)
            })
            .collect())
    }
}

struct SourceText {
    text: String,
    line_map: Arc<LineMap>,
}

impl SourceText {
    fn read(path: &Path) -> Option<Self> {
        let text = std::fs::read_to_string(path).ok()?;
        let line_map = Arc::new(LineMap::new(&text));
        Some(Self { text, line_map })
    }
}

struct Pending {
    category: DiagnosticCategory,
    code: u32,
    chain: MessageChain,
    file: Option<DiagnosticFile>,
    start: Option<usize>,
}

impl Pending {
    fn finish(self) -> RawDiagnostic {
        let message: DiagnosticMessage = if self.chain.next.is_empty() {
            self.chain.message_text.into()
        } else {
            self.chain.into()
        };
        let diagnostic = RawDiagnostic::new(self.category, self.code, message);
        match self.file {
            Some(file) => diagnostic.in_file(file, self.start),
            None => diagnostic,
        }
    }
}

/// Parse `tsc --pretty false` output. Relative file names resolve against `cwd`.
pub fn parse_output(output: &str, cwd: &Path) -> Vec<RawDiagnostic> {
    let mut sources: HashMap<PathBuf, Option<Arc<SourceText>>> = HashMap::new();
    let mut diagnostics = Vec::new();
    let mut pending: Option<Pending> = None;

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with(char::is_whitespace) {
            match pending.as_mut() {
                Some(current) => current.chain.next.push(MessageChain::new(line.trim())),
                None => debug!(line, "Ignoring stray continuation line"),
            }
            continue;
        }

        let parsed = if let Some(caps) = located_pattern().captures(line) {
            let path = cwd.join(&caps["file"]);
            let source = sources
                .entry(path.clone())
                .or_insert_with(|| SourceText::read(&path).map(Arc::new))
                .clone();

            // tsc columns count UTF-16 code units
            let line_number: u32 = caps["line"].parse().unwrap_or(1);
            let column: u32 = caps["col"].parse().unwrap_or(1);
            let start = source.as_ref().and_then(|source| {
                source.line_map.offset_of_utf16(
                    &source.text,
                    line_number.saturating_sub(1),
                    column.saturating_sub(1),
                )
            });

            let file_name = path.display().to_string();
            let file = match source {
                Some(source) => DiagnosticFile::with_line_map(file_name, source.line_map.clone()),
                None => DiagnosticFile::new(file_name),
            };
            category_and_code(&caps).map(|(category, code)| Pending {
                category,
                code,
                chain: MessageChain::new(&caps["message"]),
                file: Some(file),
                start,
            })
        } else if let Some(caps) = global_pattern().captures(line) {
            category_and_code(&caps).map(|(category, code)| Pending {
                category,
                code,
                chain: MessageChain::new(&caps["message"]),
                file: None,
                start: None,
            })
        } else {
            debug!(line, "Ignoring unrecognized type checker output");
            None
        };

        if let Some(next) = parsed {
            if let Some(done) = pending.replace(next) {
                diagnostics.push(done.finish());
            }
        }
    }

    if let Some(done) = pending {
        diagnostics.push(done.finish());
    }
    diagnostics
}

fn category_and_code(caps: &regex::Captures<'_>) -> Option<(DiagnosticCategory, u32)> {
    let category = caps["category"].parse().ok()?;
    let code = caps["code"].parse().ok()?;
    Some((category, code))
}
