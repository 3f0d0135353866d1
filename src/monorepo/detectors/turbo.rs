//! Turborepo
//!
//! Turbo sits on top of a package manager's workspaces, so it enumerates
//! through pnpm when a pnpm workspace file exists and through the manifest's
//! `workspaces` field otherwise.

use super::npm::enumerate_manifest_workspaces;
use super::pnpm::{enumerate_pnpm_packages, WORKSPACE_FILE as PNPM_WORKSPACE_FILE};
use crate::fs::FileSystem;
use crate::manifest::read_manifest;
use crate::monorepo::{MonorepoKind, PackageInfo, WorkspaceDetector};
use anyhow::Result;
use std::path::Path;

pub const CONFIG_FILES: &[&str] = &["turbo.json", "turbo.jsonc"];

pub struct TurboDetector;

impl WorkspaceDetector for TurboDetector {
    fn kind(&self) -> MonorepoKind {
        MonorepoKind::Turbo
    }

    fn detect(&self, root: &Path, fs: &dyn FileSystem) -> bool {
        let has_config = CONFIG_FILES.iter().any(|f| fs.is_file(&root.join(f)));
        if !has_config {
            return false;
        }
        has_pnpm_workspace(root, fs) || read_manifest(fs, root).is_some_and(|m| m.has_workspaces())
    }

    fn enumerate_packages(&self, root: &Path, fs: &dyn FileSystem) -> Result<Vec<PackageInfo>> {
        if has_pnpm_workspace(root, fs) {
            Ok(enumerate_pnpm_packages(root, fs))
        } else {
            Ok(enumerate_manifest_workspaces(root, fs))
        }
    }
}

fn has_pnpm_workspace(root: &Path, fs: &dyn FileSystem) -> bool {
    fs.is_file(&root.join(PNPM_WORKSPACE_FILE))
}
