//! File system access used by detection and configuration loading
//!
//! Detection probes for files, reads small manifests and expands workspace
//! globs; collection probes for and reads type-check configurations. Those
//! primitives live behind [`FileSystem`] so both can run against any tree.

mod memory;
mod real;

pub use memory::MemoryFileSystem;
pub use real::RealFileSystem;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Abstraction over file system operations for testability
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Expand a glob pattern into the matching paths, in lexical order
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>>;

    /// Canonicalize a path
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}
