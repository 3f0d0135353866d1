//! npm workspaces (`workspaces` field in the root `package.json`)

use crate::fs::FileSystem;
use crate::manifest::read_manifest;
use crate::monorepo::workspace_glob::enumerate_workspace_packages;
use crate::monorepo::{MonorepoKind, PackageInfo, WorkspaceDetector};
use anyhow::Result;
use std::path::Path;

pub struct NpmDetector;

impl WorkspaceDetector for NpmDetector {
    fn kind(&self) -> MonorepoKind {
        MonorepoKind::Npm
    }

    fn detect(&self, root: &Path, fs: &dyn FileSystem) -> bool {
        read_manifest(fs, root).is_some_and(|m| m.has_workspaces())
    }

    fn enumerate_packages(&self, root: &Path, fs: &dyn FileSystem) -> Result<Vec<PackageInfo>> {
        Ok(enumerate_manifest_workspaces(root, fs))
    }
}

/// Packages matched by the root manifest's `workspaces` globs
pub(crate) fn enumerate_manifest_workspaces(root: &Path, fs: &dyn FileSystem) -> Vec<PackageInfo> {
    let patterns = read_manifest(fs, root)
        .map(|m| m.workspace_patterns())
        .unwrap_or_default();
    enumerate_workspace_packages(fs, root, &patterns)
}
