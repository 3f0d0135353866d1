//! In-memory FileSystem for tests and embedders that check generated trees

use super::FileSystem;
use anyhow::{anyhow, Context, Result};
use glob::{MatchOptions, Pattern};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

/// Files keyed by absolute path; directories exist implicitly as ancestors.
/// Paths are normalized lexically, so `a/../b` finds `b`.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<BTreeMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.add_file(path, content);
        self
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(normalize(&path.into()), content.into());
    }

    fn with_files<T>(&self, f: impl FnOnce(&BTreeMap<PathBuf, String>) -> T) -> T {
        let files = self.files.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&files)
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.with_files(|files| files.contains_key(&path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.with_files(|files| {
            files
                .keys()
                .any(|file| *file != path && file.starts_with(&path))
        })
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.with_files(|files| files.get(&normalize(path)).cloned())
            .ok_or_else(|| anyhow!("No such file: {}", path.display()))
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern =
            Pattern::new(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let matches: BTreeSet<PathBuf> = self.with_files(|files| {
            files
                .keys()
                .flat_map(|file| file.ancestors())
                .filter(|candidate| pattern.matches_path_with(candidate, options))
                .map(Path::to_path_buf)
                .collect()
        });
        Ok(matches.into_iter().collect())
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        if self.exists(path) {
            Ok(normalize(path))
        } else {
            Err(anyhow!("No such file or directory: {}", path.display()))
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
