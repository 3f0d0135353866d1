//! Monorepo detection
//!
//! A monorepo convention (pnpm, npm/yarn workspaces, lerna, nx, turbo) is
//! recognised by a [`WorkspaceDetector`]. Detectors are tried in a fixed
//! priority order by the [`DetectorRegistry`]; the first one that recognises
//! the root enumerates its packages. When nothing matches, the root manifest
//! (if any) becomes the single package of a non-monorepo result.

use crate::fs::FileSystem;
use anyhow::Result;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

pub mod detectors;
pub mod registry;
pub mod workspace_glob;

pub use registry::{detect_monorepo, DetectorRegistry};

/// One discoverable unit of source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PackageInfo {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }
}

/// Monorepo convention tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MonorepoKind {
    Pnpm,
    Npm,
    Yarn,
    Lerna,
    Nx,
    Turbo,
    None,
    /// Convention recognised by a caller-supplied detector
    Custom(String),
}

impl MonorepoKind {
    pub fn as_str(&self) -> &str {
        match self {
            MonorepoKind::Pnpm => "pnpm",
            MonorepoKind::Npm => "npm",
            MonorepoKind::Yarn => "yarn",
            MonorepoKind::Lerna => "lerna",
            MonorepoKind::Nx => "nx",
            MonorepoKind::Turbo => "turbo",
            MonorepoKind::None => "none",
            MonorepoKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for MonorepoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MonorepoKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Detection result for a whole scan
///
/// A non-monorepo result always has kind [`MonorepoKind::None`] and at most one
/// package (the root manifest, when one was readable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonorepoInfo {
    pub is_monorepo: bool,
    #[serde(rename = "type")]
    pub kind: MonorepoKind,
    pub root_path: PathBuf,
    pub packages: Vec<PackageInfo>,
}

impl MonorepoInfo {
    pub fn monorepo(kind: MonorepoKind, root_path: PathBuf, packages: Vec<PackageInfo>) -> Self {
        Self {
            is_monorepo: true,
            kind,
            root_path,
            packages,
        }
    }

    pub fn single(root_path: PathBuf, package: Option<PackageInfo>) -> Self {
        Self {
            is_monorepo: false,
            kind: MonorepoKind::None,
            root_path,
            packages: package.into_iter().collect(),
        }
    }
}

/// A strategy that recognises one monorepo convention
pub trait WorkspaceDetector: Send + Sync {
    fn kind(&self) -> MonorepoKind;

    /// Cheap predicate: file probes and light parsing only
    fn detect(&self, root: &Path, fs: &dyn FileSystem) -> bool;

    /// Enumerate the convention's packages. Only called after `detect`
    /// returned true. Candidates with unreadable manifests are skipped.
    fn enumerate_packages(&self, root: &Path, fs: &dyn FileSystem) -> Result<Vec<PackageInfo>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let names: Vec<_> = [
            MonorepoKind::Pnpm,
            MonorepoKind::Npm,
            MonorepoKind::Yarn,
            MonorepoKind::Lerna,
            MonorepoKind::Nx,
            MonorepoKind::Turbo,
            MonorepoKind::None,
        ]
        .iter()
        .map(|k| k.to_string())
        .collect();
        assert_eq!(names, vec!["pnpm", "npm", "yarn", "lerna", "nx", "turbo", "none"]);
        assert_eq!(MonorepoKind::Custom("rush".into()).as_str(), "rush");
    }

    #[test]
    fn test_single_result_invariant() {
        let info = MonorepoInfo::single(PathBuf::from("/repo"), None);
        assert!(!info.is_monorepo);
        assert_eq!(info.kind, MonorepoKind::None);
        assert!(info.packages.is_empty());

        let info = MonorepoInfo::single(
            PathBuf::from("/repo"),
            Some(PackageInfo::new("foo", "/repo")),
        );
        assert_eq!(info.packages.len(), 1);
    }

    #[test]
    fn test_info_serialization() {
        let info = MonorepoInfo::monorepo(
            MonorepoKind::Pnpm,
            PathBuf::from("/repo"),
            vec![PackageInfo::new("a", "/repo/packages/a").with_version(Some("1.0.0".into()))],
        );
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["isMonorepo"], true);
        assert_eq!(json["type"], "pnpm");
        assert_eq!(json["rootPath"], "/repo");
        assert_eq!(json["packages"][0]["name"], "a");
        assert_eq!(json["packages"][0]["version"], "1.0.0");
    }
}
