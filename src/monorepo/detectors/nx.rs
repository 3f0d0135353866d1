//! Nx (`nx.json` or `workspace.json`)
//!
//! Projects come from the `projects` map of whichever file is present. When
//! that yields nothing (modern Nx infers projects instead of listing them),
//! the conventional `packages/`, `apps/` and `libs/` directories are globbed.

use crate::fs::FileSystem;
use crate::manifest::{read_json, read_manifest, NxWorkspace};
use crate::monorepo::workspace_glob::enumerate_workspace_packages;
use crate::monorepo::{MonorepoKind, PackageInfo, WorkspaceDetector};
use anyhow::Result;
use std::path::Path;
use tracing::debug;

pub const CONFIG_FILES: &[&str] = &["nx.json", "workspace.json"];
const FALLBACK_PATTERNS: &[&str] = &["packages/*", "apps/*", "libs/*"];

pub struct NxDetector;

impl WorkspaceDetector for NxDetector {
    fn kind(&self) -> MonorepoKind {
        MonorepoKind::Nx
    }

    fn detect(&self, root: &Path, fs: &dyn FileSystem) -> bool {
        CONFIG_FILES.iter().any(|f| fs.is_file(&root.join(f)))
    }

    fn enumerate_packages(&self, root: &Path, fs: &dyn FileSystem) -> Result<Vec<PackageInfo>> {
        let packages = project_map_packages(root, fs);
        if !packages.is_empty() {
            return Ok(packages);
        }

        debug!(root = %root.display(), "No Nx project map, globbing conventional directories");
        let patterns: Vec<String> = FALLBACK_PATTERNS.iter().map(|p| p.to_string()).collect();
        Ok(enumerate_workspace_packages(fs, root, &patterns))
    }
}

fn project_map_packages(root: &Path, fs: &dyn FileSystem) -> Vec<PackageInfo> {
    let Some(workspace) = CONFIG_FILES
        .iter()
        .map(|f| root.join(f))
        .find(|p| fs.is_file(p))
        .and_then(|p| read_json::<NxWorkspace>(fs, &p))
    else {
        return Vec::new();
    };

    let mut packages = Vec::new();
    for (key, project) in workspace.projects {
        let Some(relative) = project.root() else {
            debug!(project = %key, "Skipping Nx project without a root");
            continue;
        };
        let path = root.join(relative);

        let package = match read_manifest(fs, &path) {
            Some(manifest) => {
                PackageInfo::new(manifest.name.unwrap_or(key), path).with_version(manifest.version)
            }
            None => PackageInfo::new(key, path),
        };
        packages.push(package);
    }
    packages
}
