//! Yarn workspaces: a `workspaces` field plus a yarn lockfile

use super::npm::enumerate_manifest_workspaces;
use crate::fs::FileSystem;
use crate::manifest::read_manifest;
use crate::monorepo::{MonorepoKind, PackageInfo, WorkspaceDetector};
use anyhow::Result;
use std::path::Path;

pub const LOCKFILE: &str = "yarn.lock";

pub struct YarnDetector;

impl WorkspaceDetector for YarnDetector {
    fn kind(&self) -> MonorepoKind {
        MonorepoKind::Yarn
    }

    fn detect(&self, root: &Path, fs: &dyn FileSystem) -> bool {
        let declares_workspaces = read_manifest(fs, root)
            .and_then(|m| m.workspaces)
            .is_some_and(|w| w.declares_packages());
        declares_workspaces && fs.is_file(&root.join(LOCKFILE))
    }

    fn enumerate_packages(&self, root: &Path, fs: &dyn FileSystem) -> Result<Vec<PackageInfo>> {
        Ok(enumerate_manifest_workspaces(root, fs))
    }
}
