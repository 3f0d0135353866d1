//! Glob-and-read package enumeration shared by the workspace conventions
//!
//! Each inclusion pattern is expanded to `<root>/<pattern>/package.json`.
//! Patterns prefixed with `!` exclude matching package directories, and
//! anything under `node_modules` or `bower_components` is always excluded.
//! A matched directory whose manifest is missing, malformed, or has no `name`
//! contributes nothing.

use super::PackageInfo;
use crate::fs::FileSystem;
use crate::manifest::{read_manifest, PACKAGE_JSON};
use glob::Pattern;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

const EXCLUDED_DIRS: &[&str] = &["node_modules", "bower_components"];

/// Enumerate named packages matched by workspace `patterns` under `root`
pub fn enumerate_workspace_packages(
    fs: &dyn FileSystem,
    root: &Path,
    patterns: &[String],
) -> Vec<PackageInfo> {
    let (inclusions, exclusions) = split_patterns(patterns);
    let mut seen = HashSet::new();
    let mut packages = Vec::new();

    for dir in package_dirs(fs, root, &inclusions) {
        if is_excluded(root, &dir, &exclusions) || !seen.insert(dir.clone()) {
            continue;
        }
        let Some(manifest) = read_manifest(fs, &dir) else {
            debug!(dir = %dir.display(), "Skipping workspace candidate without readable manifest");
            continue;
        };
        let Some(name) = manifest.name else {
            debug!(dir = %dir.display(), "Skipping workspace candidate without a name");
            continue;
        };
        packages.push(PackageInfo::new(name, dir).with_version(manifest.version));
    }

    packages
}

/// Directories matched by `patterns` that contain a manifest, in glob order
pub fn package_dirs(fs: &dyn FileSystem, root: &Path, patterns: &[String]) -> Vec<PathBuf> {
    let escaped_root = Pattern::escape(&root.to_string_lossy());
    let mut dirs = Vec::new();

    for pattern in patterns {
        let pattern = normalize_pattern(pattern);
        let full = if pattern.is_empty() {
            format!("{}/{}", escaped_root, PACKAGE_JSON)
        } else {
            format!("{}/{}/{}", escaped_root, pattern, PACKAGE_JSON)
        };

        match fs.glob(&full) {
            Ok(matches) => {
                for manifest_path in matches {
                    if let Some(dir) = manifest_path.parent() {
                        dirs.push(dir.to_path_buf());
                    }
                }
            }
            Err(e) => {
                debug!(pattern = %pattern, error = %e, "Skipping invalid workspace pattern");
            }
        }
    }

    dirs
}

fn split_patterns(patterns: &[String]) -> (Vec<String>, Vec<Pattern>) {
    let mut inclusions = Vec::new();
    let mut exclusions = Vec::new();

    for raw in patterns {
        if let Some(negated) = raw.strip_prefix('!') {
            match Pattern::new(&normalize_pattern(negated)) {
                Ok(pattern) => exclusions.push(pattern),
                Err(e) => debug!(pattern = %raw, error = %e, "Ignoring invalid exclusion"),
            }
        } else {
            inclusions.push(raw.clone());
        }
    }

    (inclusions, exclusions)
}

fn normalize_pattern(pattern: &str) -> String {
    let trimmed = pattern.trim();
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    let trimmed = trimmed.trim_end_matches('/');
    trimmed.strip_suffix("/package.json").unwrap_or(trimmed).to_string()
}

fn is_excluded(root: &Path, dir: &Path, exclusions: &[Pattern]) -> bool {
    let Ok(relative) = dir.strip_prefix(root) else {
        return true;
    };

    let in_excluded_dir = relative.components().any(|c| match c {
        Component::Normal(name) => EXCLUDED_DIRS.iter().any(|d| name == *d),
        _ => false,
    });
    if in_excluded_dir {
        return true;
    }

    let relative = relative.to_string_lossy().replace('\\', "/");
    exclusions.iter().any(|p| p.matches(&relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::RealFileSystem;
    use std::fs;
    use tempfile::TempDir;

    fn write_package(root: &Path, rel: &str, manifest: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), manifest).unwrap();
    }

    fn names(packages: &[PackageInfo]) -> Vec<&str> {
        packages.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_enumerates_named_packages() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "packages/a", r#"{"name": "a", "version": "1.0.0"}"#);
        write_package(temp.path(), "packages/b", r#"{"name": "b"}"#);

        let packages =
            enumerate_workspace_packages(&RealFileSystem, temp.path(), &["packages/*".into()]);
        assert_eq!(names(&packages), vec!["a", "b"]);
        assert_eq!(packages[0].version.as_deref(), Some("1.0.0"));
        assert_eq!(packages[0].path, temp.path().join("packages/a"));
        assert!(packages[1].version.is_none());
    }

    #[test]
    fn test_skips_broken_and_unnamed_manifests() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "packages/good", r#"{"name": "good"}"#);
        write_package(temp.path(), "packages/broken", "{ not json");
        write_package(temp.path(), "packages/anonymous", r#"{"private": true}"#);
        fs::create_dir_all(temp.path().join("packages/empty")).unwrap();

        let packages =
            enumerate_workspace_packages(&RealFileSystem, temp.path(), &["packages/*".into()]);
        assert_eq!(names(&packages), vec!["good"]);
    }

    #[test]
    fn test_negated_patterns_exclude() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "packages/a", r#"{"name": "a"}"#);
        write_package(temp.path(), "packages/internal", r#"{"name": "internal"}"#);

        let packages = enumerate_workspace_packages(
            &RealFileSystem,
            temp.path(),
            &["packages/*".into(), "!packages/internal".into()],
        );
        assert_eq!(names(&packages), vec!["a"]);
    }

    #[test]
    fn test_node_modules_excluded_and_paths_deduplicated() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "packages/a", r#"{"name": "a"}"#);
        write_package(temp.path(), "packages/a/node_modules/dep", r#"{"name": "dep"}"#);

        let packages = enumerate_workspace_packages(
            &RealFileSystem,
            temp.path(),
            &["packages/**".into(), "packages/a".into()],
        );
        assert_eq!(names(&packages), vec!["a"]);
    }

    #[test]
    fn test_pattern_normalization() {
        assert_eq!(normalize_pattern("./packages/*/"), "packages/*");
        assert_eq!(normalize_pattern("apps/web/package.json"), "apps/web");
        assert_eq!(normalize_pattern(" libs/* "), "libs/*");
    }

    #[test]
    fn test_duplicate_names_pass_through() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "apps/shared", r#"{"name": "shared"}"#);
        write_package(temp.path(), "libs/shared", r#"{"name": "shared"}"#);

        let packages = enumerate_workspace_packages(
            &RealFileSystem,
            temp.path(),
            &["apps/*".into(), "libs/*".into()],
        );
        assert_eq!(names(&packages), vec!["shared", "shared"]);
    }
}
