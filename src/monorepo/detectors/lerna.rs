//! Lerna (`lerna.json`)

use crate::fs::FileSystem;
use crate::manifest::{read_json, LernaConfig};
use crate::monorepo::workspace_glob::enumerate_workspace_packages;
use crate::monorepo::{MonorepoKind, PackageInfo, WorkspaceDetector};
use anyhow::Result;
use std::path::Path;

pub const CONFIG_FILE: &str = "lerna.json";
const DEFAULT_PATTERNS: &[&str] = &["packages/*"];

pub struct LernaDetector;

impl WorkspaceDetector for LernaDetector {
    fn kind(&self) -> MonorepoKind {
        MonorepoKind::Lerna
    }

    fn detect(&self, root: &Path, fs: &dyn FileSystem) -> bool {
        fs.is_file(&root.join(CONFIG_FILE))
    }

    fn enumerate_packages(&self, root: &Path, fs: &dyn FileSystem) -> Result<Vec<PackageInfo>> {
        let patterns = read_json::<LernaConfig>(fs, &root.join(CONFIG_FILE))
            .and_then(|config| config.packages)
            .unwrap_or_else(|| DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect());

        Ok(enumerate_workspace_packages(fs, root, &patterns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::RealFileSystem;
    use crate::monorepo::detectors::test_support::{write_file, write_package};
    use tempfile::TempDir;

    #[test]
    fn test_default_patterns() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), CONFIG_FILE, r#"{"version": "1.0.0"}"#);
        write_package(temp.path(), "packages/a", "a");
        write_package(temp.path(), "modules/b", "b");

        assert!(LernaDetector.detect(temp.path(), &RealFileSystem));
        let packages = LernaDetector
            .enumerate_packages(temp.path(), &RealFileSystem)
            .unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "a");
    }

    #[test]
    fn test_declared_patterns() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), CONFIG_FILE, r#"{"packages": ["modules/*"]}"#);
        write_package(temp.path(), "packages/a", "a");
        write_package(temp.path(), "modules/b", "b");

        let packages = LernaDetector
            .enumerate_packages(temp.path(), &RealFileSystem)
            .unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "b");
    }

    #[test]
    fn test_malformed_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), CONFIG_FILE, "{,}");
        write_package(temp.path(), "packages/a", "a");

        let packages = LernaDetector
            .enumerate_packages(temp.path(), &RealFileSystem)
            .unwrap();
        assert_eq!(packages.len(), 1);
    }
}
