//! Detection orchestration
//!
//! Custom detectors run before the built-ins; among all of them the first
//! `detect() == true` wins and no later detector is consulted. Errors from a
//! detector's enumeration are propagated untouched: built-in detectors degrade
//! to "no packages" on their own, so an error here is a defect.

use super::detectors::builtin_detectors;
use super::{MonorepoInfo, PackageInfo, WorkspaceDetector};
use crate::fs::{FileSystem, RealFileSystem};
use crate::manifest::read_manifest;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub struct DetectorRegistry {
    fs: Arc<dyn FileSystem>,
    detectors: Vec<Box<dyn WorkspaceDetector>>,
}

impl DetectorRegistry {
    /// Registry with the built-in detectors over the real file system
    pub fn with_defaults() -> Self {
        Self::with_fs(Arc::new(RealFileSystem))
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            detectors: builtin_detectors(),
        }
    }

    /// Prepend caller-supplied detectors, preserving their relative order
    pub fn with_custom(mut self, custom: Vec<Box<dyn WorkspaceDetector>>) -> Self {
        let builtins = std::mem::take(&mut self.detectors);
        self.detectors = custom;
        self.detectors.extend(builtins);
        self
    }

    pub fn detectors(&self) -> &[Box<dyn WorkspaceDetector>] {
        &self.detectors
    }

    /// Detect the monorepo convention at `root` and enumerate its packages
    pub fn detect(&self, root: &Path) -> Result<MonorepoInfo> {
        let fs = self.fs.as_ref();
        let root = fs
            .canonicalize(root)
            .unwrap_or_else(|_| root.to_path_buf());

        for detector in &self.detectors {
            let kind = detector.kind();
            if !detector.detect(&root, fs) {
                debug!(detector = %kind, "Convention not detected");
                continue;
            }

            let packages = detector.enumerate_packages(&root, fs)?;
            info!(
                root = %root.display(),
                kind = %kind,
                packages = packages.len(),
                "Detected monorepo"
            );
            return Ok(MonorepoInfo::monorepo(kind, root, packages));
        }

        let package = read_manifest(fs, &root).map(|manifest| {
            let name = manifest.name.unwrap_or_else(|| project_name(&root));
            PackageInfo::new(name, root.clone()).with_version(manifest.version)
        });

        match &package {
            Some(p) => info!(root = %root.display(), package = %p.name, "Single package repository"),
            None => info!(root = %root.display(), "No package manifest found"),
        }
        Ok(MonorepoInfo::single(root, package))
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Detect the convention at `root`, trying `extra` detectors first
pub fn detect_monorepo(
    root: &Path,
    extra: Vec<Box<dyn WorkspaceDetector>>,
) -> Result<MonorepoInfo> {
    DetectorRegistry::with_defaults().with_custom(extra).detect(root)
}

/// Synthetic name for a root manifest that has none: its directory name
fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "root".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monorepo::detectors::test_support::{write_file, write_package};
    use crate::monorepo::MonorepoKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct StaticDetector {
        matches: bool,
        probes: Arc<AtomicUsize>,
    }

    impl WorkspaceDetector for StaticDetector {
        fn kind(&self) -> MonorepoKind {
            MonorepoKind::Custom("rush".to_string())
        }

        fn detect(&self, _root: &Path, _fs: &dyn FileSystem) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.matches
        }

        fn enumerate_packages(&self, root: &Path, _fs: &dyn FileSystem) -> Result<Vec<PackageInfo>> {
            Ok(vec![PackageInfo::new("custom", root.join("custom"))])
        }
    }

    struct FailingDetector;

    impl WorkspaceDetector for FailingDetector {
        fn kind(&self) -> MonorepoKind {
            MonorepoKind::Custom("broken".to_string())
        }

        fn detect(&self, _root: &Path, _fs: &dyn FileSystem) -> bool {
            true
        }

        fn enumerate_packages(&self, _root: &Path, _fs: &dyn FileSystem) -> Result<Vec<PackageInfo>> {
            anyhow::bail!("detector bug")
        }
    }

    #[test]
    fn test_root_manifest_fallback() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "package.json", r#"{"name": "foo", "version": "2.0.0"}"#);

        let info = detect_monorepo(temp.path(), Vec::new()).unwrap();
        assert!(!info.is_monorepo);
        assert_eq!(info.kind, MonorepoKind::None);
        assert_eq!(info.packages.len(), 1);
        assert_eq!(info.packages[0].name, "foo");
        assert_eq!(info.packages[0].version.as_deref(), Some("2.0.0"));
        assert_eq!(info.packages[0].path, info.root_path);
        assert!(info.root_path.is_absolute());
    }

    #[test]
    fn test_nameless_root_manifest_uses_directory_name() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("my-app");
        write_file(&root, "package.json", r#"{"private": true}"#);

        let info = detect_monorepo(&root, Vec::new()).unwrap();
        assert_eq!(info.packages[0].name, "my-app");
    }

    #[test]
    fn test_nothing_to_scan() {
        let temp = TempDir::new().unwrap();
        let info = detect_monorepo(temp.path(), Vec::new()).unwrap();
        assert!(!info.is_monorepo);
        assert_eq!(info.kind, MonorepoKind::None);
        assert!(info.packages.is_empty());
    }

    #[test]
    fn test_unreadable_root_manifest_is_nothing_to_scan() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "package.json", "not json");
        let info = detect_monorepo(temp.path(), Vec::new()).unwrap();
        assert!(info.packages.is_empty());
    }

    #[test]
    fn test_custom_detector_runs_first() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "pnpm-workspace.yaml", "packages:\n  - packages/*\n");
        write_package(temp.path(), "packages/a", "a");

        let probes = Arc::new(AtomicUsize::new(0));
        let custom: Vec<Box<dyn WorkspaceDetector>> = vec![Box::new(StaticDetector {
            matches: true,
            probes: probes.clone(),
        })];

        let info = detect_monorepo(temp.path(), custom).unwrap();
        assert_eq!(info.kind, MonorepoKind::Custom("rush".to_string()));
        assert_eq!(info.packages[0].name, "custom");
        assert_eq!(probes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_non_matching_custom_detector_falls_through() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "pnpm-workspace.yaml", "packages:\n  - packages/*\n");
        write_package(temp.path(), "packages/a", "a");

        let probes = Arc::new(AtomicUsize::new(0));
        let custom: Vec<Box<dyn WorkspaceDetector>> = vec![Box::new(StaticDetector {
            matches: false,
            probes: probes.clone(),
        })];

        let info = detect_monorepo(temp.path(), custom).unwrap();
        assert_eq!(info.kind, MonorepoKind::Pnpm);
        assert_eq!(probes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detector_errors_propagate() {
        let temp = TempDir::new().unwrap();
        let custom: Vec<Box<dyn WorkspaceDetector>> = vec![Box::new(FailingDetector)];
        let err = detect_monorepo(temp.path(), custom).unwrap_err();
        assert!(err.to_string().contains("detector bug"));
    }

    #[test]
    fn test_registry_order_with_custom() {
        let registry = DetectorRegistry::with_defaults().with_custom(vec![Box::new(FailingDetector)]);
        let kinds: Vec<_> = registry.detectors().iter().map(|d| d.kind()).collect();
        assert_eq!(kinds[0], MonorepoKind::Custom("broken".to_string()));
        assert_eq!(kinds[1], MonorepoKind::Turbo);
        assert_eq!(kinds.len(), 7);
    }
}
