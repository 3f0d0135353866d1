//! Configuration reader
//!
//! Every configuration file consulted during detection goes through
//! [`read_json`] or [`read_yaml`]. A missing file, an unreadable file, and a
//! file that does not deserialize into the requested shape are all reported the
//! same way: `None`. Probing a candidate must never abort detection.

mod types;

pub use types::{LernaConfig, NxProject, NxWorkspace, PackageManifest, PnpmWorkspace, Workspaces};

use crate::fs::FileSystem;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Package manifest file name
pub const PACKAGE_JSON: &str = "package.json";

/// Read and deserialize a JSON file, collapsing every failure to `None`
pub fn read_json<T: DeserializeOwned>(fs: &dyn FileSystem, path: &Path) -> Option<T> {
    let content = read_content(fs, path)?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Ignoring malformed JSON file");
            None
        }
    }
}

/// Read and deserialize a YAML file, collapsing every failure to `None`
pub fn read_yaml<T: DeserializeOwned>(fs: &dyn FileSystem, path: &Path) -> Option<T> {
    let content = read_content(fs, path)?;
    match serde_yaml::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Ignoring malformed YAML file");
            None
        }
    }
}

/// Read the package manifest located directly inside `dir`
pub fn read_manifest(fs: &dyn FileSystem, dir: &Path) -> Option<PackageManifest> {
    read_json(fs, &dir.join(PACKAGE_JSON))
}

fn read_content(fs: &dyn FileSystem, path: &Path) -> Option<String> {
    if !fs.is_file(path) {
        return None;
    }
    match fs.read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Ignoring unreadable file");
            None
        }
    }
}
