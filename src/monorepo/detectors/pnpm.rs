//! pnpm workspaces (`pnpm-workspace.yaml`)

use crate::fs::FileSystem;
use crate::manifest::{read_yaml, PnpmWorkspace};
use crate::monorepo::workspace_glob::enumerate_workspace_packages;
use crate::monorepo::{MonorepoKind, PackageInfo, WorkspaceDetector};
use anyhow::Result;
use std::path::Path;
use tracing::debug;

pub const WORKSPACE_FILE: &str = "pnpm-workspace.yaml";

pub struct PnpmDetector;

impl WorkspaceDetector for PnpmDetector {
    fn kind(&self) -> MonorepoKind {
        MonorepoKind::Pnpm
    }

    fn detect(&self, root: &Path, fs: &dyn FileSystem) -> bool {
        fs.is_file(&root.join(WORKSPACE_FILE))
    }

    fn enumerate_packages(&self, root: &Path, fs: &dyn FileSystem) -> Result<Vec<PackageInfo>> {
        Ok(enumerate_pnpm_packages(root, fs))
    }
}

/// Packages listed by `pnpm-workspace.yaml`; also used by the turbo detector
pub(crate) fn enumerate_pnpm_packages(root: &Path, fs: &dyn FileSystem) -> Vec<PackageInfo> {
    let Some(workspace) = read_yaml::<PnpmWorkspace>(fs, &root.join(WORKSPACE_FILE)) else {
        debug!(root = %root.display(), "pnpm workspace file unreadable, no packages");
        return Vec::new();
    };
    enumerate_workspace_packages(fs, root, &workspace.packages)
}
