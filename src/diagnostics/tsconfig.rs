//! Per-unit type-check configuration (`tsconfig.json`)
//!
//! Loading is split in two. [`TypeCheckConfig::load`] reads the file and its
//! `extends` chain; it fails only when the file itself cannot be read or is not
//! valid JSON-with-comments. Structural problems (wrong value types, missing
//! bases, empty inputs) are recorded as configuration diagnostics so they show
//! up in the report next to code diagnostics, located at the offending
//! top-level key. [`TypeCheckConfig::resolve`] then expands
//! `files`/`include`/`exclude` into the unit's root files.

use super::{DiagnosticFile, LineMap, RawDiagnostic};
use crate::fs::{FileSystem, RealFileSystem};
use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use jsonc_parser::ast::Value as JsoncValue;
use jsonc_parser::errors::ParseError;
use jsonc_parser::{parse_to_ast, parse_to_serde_value};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "tsconfig.json";

const DEFAULT_INCLUDE: &[&str] = &["**/*"];
const DEFAULT_EXCLUDE: &[&str] = &["node_modules", "bower_components", "jspm_packages"];
const TS_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];
const JS_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs"];
const MAX_EXTENDS_DEPTH: usize = 32;

pub mod codes {
    pub const CANNOT_READ_FILE: u32 = 5083;
    pub const ROOT_NOT_OBJECT: u32 = 5092;
    pub const WRONG_OPTION_TYPE: u32 = 5024;
    pub const FILE_NOT_FOUND: u32 = 6053;
    pub const CIRCULAR_EXTENDS: u32 = 18000;
    pub const EMPTY_FILES_LIST: u32 = 18002;
    pub const NO_INPUTS: u32 = 18003;
}

#[derive(Debug, Error)]
pub enum TsConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {error}")]
    Parse { path: PathBuf, error: ParseError },
}

/// A loaded configuration with its `extends` chain merged in
#[derive(Debug, Clone)]
pub struct TypeCheckConfig {
    pub config_path: PathBuf,
    pub compiler_options: Map<String, Value>,
    /// Explicit root files, absolute
    pub files: Option<Vec<PathBuf>>,
    /// Include globs, absolute
    pub include: Option<Vec<String>>,
    /// Exclude globs, absolute
    pub exclude: Option<Vec<String>>,
    pub errors: Vec<RawDiagnostic>,
    source: Arc<LineMap>,
    key_offsets: HashMap<String, usize>,
}

/// Everything a diagnostic source needs to check one unit
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config_path: PathBuf,
    pub project_dir: PathBuf,
    pub root_files: Vec<PathBuf>,
    pub compiler_options: Map<String, Value>,
    /// Configuration diagnostics, reported alongside the engine's
    pub errors: Vec<RawDiagnostic>,
}

impl ResolvedConfig {
    /// Whether a diagnostic with this code and file line is already among
    /// the configuration diagnostics. File names are compared as paths.
    pub fn already_reported(&self, code: u32, file_name: Option<&str>, line: Option<u32>) -> bool {
        self.errors.iter().any(|e| {
            e.code == code
                && same_file(e.file_name(), file_name)
                && (line.is_none() || e.position().map(|(l, _)| l) == line)
        })
    }
}

fn same_file(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            let (a, b) = (Path::new(a), Path::new(b));
            a == b
                || matches!(
                    (a.canonicalize(), b.canonicalize()),
                    (Ok(a), Ok(b)) if a == b
                )
        }
        _ => false,
    }
}

/// A parsed configuration text with the character offset of each top-level key
struct Document {
    value: Value,
    key_offsets: HashMap<String, usize>,
}

impl Document {
    fn parse(text: &str) -> Result<Self, ParseError> {
        let value = parse_to_serde_value(text, &Default::default())?
            .unwrap_or_else(|| Value::Object(Map::new()));

        let mut key_offsets = HashMap::new();
        let ast = parse_to_ast(text, &Default::default(), &Default::default())?;
        if let Some(JsoncValue::Object(object)) = &ast.value {
            for property in &object.properties {
                key_offsets.insert(
                    property.name.as_str().to_string(),
                    LineMap::char_offset(text, property.range.start),
                );
            }
        }

        Ok(Self { value, key_offsets })
    }
}

struct Layer {
    compiler_options: Map<String, Value>,
    files: Option<Vec<PathBuf>>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

impl TypeCheckConfig {
    /// Load `path` and the configurations it extends
    pub fn load(path: &Path) -> Result<Self, TsConfigError> {
        Self::load_with(&RealFileSystem, path)
    }

    /// Load through `fs`. Root-file expansion in [`TypeCheckConfig::resolve`]
    /// still walks the host tree.
    pub fn load_with(fs: &dyn FileSystem, path: &Path) -> Result<Self, TsConfigError> {
        let text = fs.read_to_string(path).map_err(|e| TsConfigError::Read {
            path: path.to_path_buf(),
            source: into_io_error(e),
        })?;
        let document = Document::parse(&text).map_err(|error| TsConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })?;

        let line_map = Arc::new(LineMap::new(&text));
        let key_offsets = document.key_offsets.clone();
        let mut errors = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(canonical(fs, path));

        let layer = build_layer(fs, path, &line_map, document, &mut visited, &mut errors, 0);

        Ok(Self {
            config_path: path.to_path_buf(),
            compiler_options: layer.compiler_options,
            files: layer.files,
            include: layer.include,
            exclude: layer.exclude,
            errors,
            source: line_map,
            key_offsets,
        })
    }

    pub fn project_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    fn allow_js(&self) -> bool {
        self.compiler_options
            .get("allowJs")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Expand the inputs into root files and finish the configuration checks
    pub fn resolve(self) -> ResolvedConfig {
        self.resolve_with(&RealFileSystem)
    }

    /// Like [`TypeCheckConfig::resolve`], probing explicit `files` through `fs`
    pub fn resolve_with(self, fs: &dyn FileSystem) -> ResolvedConfig {
        let project_dir = self.project_dir();
        let mut errors = self.errors.clone();
        let config_file = DiagnosticFile::with_line_map(
            self.config_path.display().to_string(),
            self.source.clone(),
        );
        let files_offset = self.key_offsets.get("files").copied();

        let include = match (&self.include, &self.files) {
            (Some(include), _) => include.clone(),
            (None, Some(_)) => Vec::new(),
            (None, None) => absolutize(&project_dir, DEFAULT_INCLUDE.iter().copied()),
        };
        let exclude = match &self.exclude {
            Some(exclude) => exclude.clone(),
            None => {
                let mut exclude = absolutize(&project_dir, DEFAULT_EXCLUDE.iter().copied());
                if let Some(out_dir) = self.compiler_options.get("outDir").and_then(Value::as_str) {
                    exclude.extend(absolutize(&project_dir, [out_dir]));
                }
                exclude
            }
        };

        let mut root_files = BTreeSet::new();
        for file in self.files.iter().flatten() {
            if fs.is_file(file) {
                root_files.insert(file.clone());
            } else {
                errors.push(
                    RawDiagnostic::error(
                        codes::FILE_NOT_FOUND,
                        format!("File '{}' not found.", file.display()),
                    )
                    .in_file(config_file.clone(), files_offset),
                );
            }
        }

        let extensions = if self.allow_js() {
            [TS_EXTENSIONS, JS_EXTENSIONS].concat()
        } else {
            TS_EXTENSIONS.to_vec()
        };
        root_files.extend(expand_includes(&include, &exclude, &extensions));

        let explicit_empty = self.files.as_ref().is_some_and(Vec::is_empty) && self.include.is_none();
        if explicit_empty {
            errors.push(
                RawDiagnostic::error(
                    codes::EMPTY_FILES_LIST,
                    format!(
                        "The 'files' list in config file '{}' is empty.",
                        self.config_path.display()
                    ),
                )
                .in_file(config_file, files_offset),
            );
        } else if root_files.is_empty() {
            errors.push(RawDiagnostic::error(
                codes::NO_INPUTS,
                format!(
                    "No inputs were found in config file '{}'. Specified 'include' paths were '{}' and 'exclude' paths were '{}'.",
                    self.config_path.display(),
                    display_patterns(&project_dir, &include),
                    display_patterns(&project_dir, &exclude),
                ),
            ));
        }

        debug!(
            config = %self.config_path.display(),
            root_files = root_files.len(),
            config_errors = errors.len(),
            "Resolved type-check configuration"
        );

        ResolvedConfig {
            config_path: self.config_path,
            project_dir,
            root_files: root_files.into_iter().collect(),
            compiler_options: self.compiler_options,
            errors,
        }
    }
}

fn build_layer(
    fs: &dyn FileSystem,
    path: &Path,
    line_map: &Arc<LineMap>,
    document: Document,
    visited: &mut HashSet<PathBuf>,
    errors: &mut Vec<RawDiagnostic>,
    depth: usize,
) -> Layer {
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let file = DiagnosticFile::with_line_map(path.display().to_string(), line_map.clone());
    let Document { value, key_offsets } = document;
    let located = |code: u32, key: Option<&str>, message: String| {
        let offset = key.and_then(|k| key_offsets.get(k).copied());
        RawDiagnostic::error(code, message).in_file(file.clone(), offset)
    };

    let object = match value {
        Value::Object(object) => object,
        _ => {
            errors.push(located(
                codes::ROOT_NOT_OBJECT,
                None,
                format!(
                    "The root value of a '{}' file must be an object.",
                    path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
                ),
            ));
            Map::new()
        }
    };

    let mut layer = Layer {
        compiler_options: Map::new(),
        files: None,
        include: None,
        exclude: None,
    };

    if let Some(extends) = object.get("extends") {
        let bases = match extends {
            Value::String(base) => vec![base.clone()],
            Value::Array(items) if items.iter().all(Value::is_string) => items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => {
                errors.push(located(
                    codes::WRONG_OPTION_TYPE,
                    Some("extends"),
                    "Compiler option 'extends' requires a value of type string or Array.".to_string(),
                ));
                Vec::new()
            }
        };

        for base in bases {
            match load_base(fs, &dir, &base, visited, errors, depth) {
                Ok(base_layer) => merge_layer(&mut layer, base_layer),
                Err(message) => errors.push(located(
                    if message.starts_with("Circularity") {
                        codes::CIRCULAR_EXTENDS
                    } else {
                        codes::CANNOT_READ_FILE
                    },
                    Some("extends"),
                    message,
                )),
            }
        }
    }

    match object.get("compilerOptions") {
        None | Some(Value::Null) => {}
        Some(Value::Object(options)) => {
            for (key, value) in options {
                layer.compiler_options.insert(key.clone(), value.clone());
            }
        }
        Some(_) => errors.push(located(
            codes::WRONG_OPTION_TYPE,
            Some("compilerOptions"),
            "Compiler option 'compilerOptions' requires a value of type object.".to_string(),
        )),
    }

    for key in ["files", "include", "exclude"] {
        let Some(value) = object.get(key) else {
            continue;
        };
        let Some(entries) = string_array(value) else {
            errors.push(located(
                codes::WRONG_OPTION_TYPE,
                Some(key),
                format!("Compiler option '{}' requires a value of type Array.", key),
            ));
            continue;
        };
        match key {
            "files" => layer.files = Some(entries.iter().map(|f| dir.join(f)).collect()),
            "include" => layer.include = Some(absolutize(&dir, entries.iter().map(String::as_str))),
            _ => layer.exclude = Some(absolutize(&dir, entries.iter().map(String::as_str))),
        }
    }

    layer
}

/// Load an extended configuration. Failures come back as diagnostic messages.
fn load_base(
    fs: &dyn FileSystem,
    dir: &Path,
    specifier: &str,
    visited: &mut HashSet<PathBuf>,
    errors: &mut Vec<RawDiagnostic>,
    depth: usize,
) -> Result<Layer, String> {
    let Some(path) = resolve_extends(fs, dir, specifier) else {
        return Err(format!("Cannot read file '{}'.", dir.join(specifier).display()));
    };

    let key = canonical(fs, &path);
    if depth >= MAX_EXTENDS_DEPTH || !visited.insert(key.clone()) {
        return Err(format!(
            "Circularity detected while resolving configuration: {}",
            path.display()
        ));
    }

    let loaded = fs
        .read_to_string(&path)
        .map_err(|_| format!("Cannot read file '{}'.", path.display()))
        .and_then(|text| {
            Document::parse(&text)
                .map(|document| (text, document))
                .map_err(|e| format!("Cannot read file '{}': {}.", path.display(), e))
        });

    let result = loaded.map(|(text, document)| {
        let line_map = Arc::new(LineMap::new(&text));
        build_layer(fs, &path, &line_map, document, visited, errors, depth + 1)
    });
    visited.remove(&key);
    result
}

/// Relative and absolute paths resolve against `dir`; bare specifiers are
/// looked up under `node_modules` walking upwards
fn resolve_extends(fs: &dyn FileSystem, dir: &Path, specifier: &str) -> Option<PathBuf> {
    let with_json = |p: PathBuf| -> Option<PathBuf> {
        if fs.is_file(&p) {
            return Some(p);
        }
        let mut extended = p.into_os_string();
        extended.push(".json");
        let extended = PathBuf::from(extended);
        fs.is_file(&extended).then_some(extended)
    };

    let is_path = specifier.starts_with("./")
        || specifier.starts_with("../")
        || Path::new(specifier).is_absolute();
    if is_path {
        return with_json(dir.join(specifier));
    }

    dir.ancestors().find_map(|ancestor| {
        let package = ancestor.join("node_modules").join(specifier);
        with_json(package.clone()).or_else(|| with_json(package.join(DEFAULT_CONFIG_FILE)))
    })
}

fn merge_layer(layer: &mut Layer, base: Layer) {
    for (key, value) in base.compiler_options {
        layer.compiler_options.insert(key, value);
    }
    if base.files.is_some() {
        layer.files = base.files;
    }
    if base.include.is_some() {
        layer.include = base.include;
    }
    if base.exclude.is_some() {
        layer.exclude = base.exclude;
    }
}

fn string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(String::from))
        .collect()
}

fn absolutize<'a>(dir: &Path, patterns: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    patterns
        .into_iter()
        .map(|p| {
            let p = p.strip_prefix("./").unwrap_or(p);
            if Path::new(p).is_absolute() {
                p.to_string()
            } else {
                format!("{}/{}", Pattern::escape(&dir.to_string_lossy()), p)
            }
        })
        .collect()
}

fn display_patterns(dir: &Path, patterns: &[String]) -> String {
    let prefix = format!("{}/", Pattern::escape(&dir.to_string_lossy()));
    let relative: Vec<&str> = patterns
        .iter()
        .map(|p| p.strip_prefix(&prefix).unwrap_or(p))
        .collect();
    serde_json::to_string(&relative).unwrap_or_default()
}

/// Directory-like patterns (no wildcard and no extension in the last segment)
/// match everything below them
fn expand_directory_pattern(pattern: &str) -> String {
    let trimmed = pattern.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if last.contains(['*', '?']) || last.contains('.') {
        trimmed.to_string()
    } else {
        format!("{}/**/*", trimmed)
    }
}

fn literal_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for segment in pattern.split('/') {
        if segment.contains(['*', '?', '[']) {
            break;
        }
        base.push(if segment.is_empty() { "/" } else { segment });
    }
    base
}

fn expand_includes(include: &[String], exclude: &[String], extensions: &[&str]) -> Vec<PathBuf> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let exclusions: Vec<Pattern> = exclude
        .iter()
        .flat_map(|p| {
            let trimmed = p.trim_end_matches('/');
            [trimmed.to_string(), format!("{}/**", trimmed)]
        })
        .filter_map(|p| Pattern::new(&p).ok())
        .collect();
    let excluded = |path: &Path| exclusions.iter().any(|p| p.matches_path_with(path, options));

    let mut files = Vec::new();
    for raw in include {
        let expanded = expand_directory_pattern(raw);
        let Ok(pattern) = Pattern::new(&expanded) else {
            debug!(pattern = %raw, "Skipping invalid include pattern");
            continue;
        };

        let base = literal_base(&unescape_brackets(&expanded));
        if base.is_file() {
            if pattern.matches_path_with(&base, options) && !excluded(&base) && has_extension(&base, extensions) {
                files.push(base);
            }
            continue;
        }
        if !base.is_dir() {
            continue;
        }

        let pruned = exclusions.clone();
        let walker = WalkBuilder::new(&base)
            .standard_filters(false)
            .hidden(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                !pruned
                    .iter()
                    .any(|p| p.matches_path_with(entry.path(), options))
            })
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if !path.is_file() || !has_extension(path, extensions) || excluded(path) {
                continue;
            }
            if pattern.matches_path_with(path, options) {
                files.push(path.to_path_buf());
            }
        }
    }
    files
}

/// Undo `Pattern::escape` so the literal prefix can be used as a real path
fn unescape_brackets(pattern: &str) -> String {
    pattern
        .replace("[[]", "[")
        .replace("[]]", "]")
        .replace("[*]", "*")
        .replace("[?]", "?")
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.contains(&e))
}

fn canonical(fs: &dyn FileSystem, path: &Path) -> PathBuf {
    fs.canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Recover the I/O error behind a file system failure
fn into_io_error(error: anyhow::Error) -> io::Error {
    error
        .downcast::<io::Error>()
        .unwrap_or_else(|other| io::Error::new(io::ErrorKind::NotFound, format!("{:#}", other)))
}
