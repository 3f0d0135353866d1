//! Workspace detection against real directory layouts

use monocheck::monorepo::{detect_monorepo, MonorepoKind};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use yare::parameterized;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn package(root: &Path, rel: &str, name: &str) {
    write(
        root,
        &format!("{}/package.json", rel),
        &format!(r#"{{"name": "{}", "version": "1.0.0"}}"#, name),
    );
}

fn names(root: &Path) -> Vec<String> {
    let info = detect_monorepo(root, Vec::new()).unwrap();
    let mut names: Vec<_> = info.packages.into_iter().map(|p| p.name).collect();
    names.sort();
    names
}

#[test]
fn test_single_package_repository() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "package.json", r#"{"name": "foo"}"#);

    let info = detect_monorepo(temp.path(), Vec::new()).unwrap();
    assert!(!info.is_monorepo);
    assert_eq!(info.kind, MonorepoKind::None);
    assert_eq!(info.packages.len(), 1);
    assert_eq!(info.packages[0].name, "foo");
    assert_eq!(info.packages[0].path, info.root_path);
}

#[test]
fn test_pnpm_workspace() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "pnpm-workspace.yaml", "packages:\n  - \"packages/*\"\n");
    package(temp.path(), "packages/a", "a");
    package(temp.path(), "packages/b", "b");

    let info = detect_monorepo(temp.path(), Vec::new()).unwrap();
    assert!(info.is_monorepo);
    assert_eq!(info.kind, MonorepoKind::Pnpm);
    assert_eq!(names(temp.path()), vec!["a", "b"]);
    assert!(info
        .packages
        .iter()
        .all(|p| p.path.starts_with(&info.root_path)));
}

#[test]
fn test_turbo_wins_over_npm_workspaces() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "package.json",
        r#"{"name": "root", "workspaces": ["apps/*"]}"#,
    );
    write(temp.path(), "turbo.json", "{}");
    package(temp.path(), "apps/web", "web");

    let info = detect_monorepo(temp.path(), Vec::new()).unwrap();
    assert_eq!(info.kind, MonorepoKind::Turbo);
    assert_eq!(info.packages.len(), 1);
    assert_eq!(info.packages[0].name, "web");
}

#[parameterized(
    pnpm = { &[("pnpm-workspace.yaml", "packages:\n  - libs/*\n")], MonorepoKind::Pnpm },
    yarn = { &[("package.json", r#"{"workspaces": {"packages": ["libs/*"]}}"#), ("yarn.lock", "")], MonorepoKind::Yarn },
    npm = { &[("package.json", r#"{"workspaces": ["libs/*"]}"#)], MonorepoKind::Npm },
    lerna = { &[("lerna.json", r#"{"packages": ["libs/*"]}"#)], MonorepoKind::Lerna },
    nx = { &[("nx.json", r#"{"projects": {"one": "libs/one"}}"#)], MonorepoKind::Nx },
    turbo_pnpm = { &[("turbo.json", "{}"), ("pnpm-workspace.yaml", "packages:\n  - libs/*\n")], MonorepoKind::Turbo },
)]
fn test_detected_convention(files: &[(&str, &str)], expected: MonorepoKind) {
    let temp = TempDir::new().unwrap();
    for (rel, content) in files {
        write(temp.path(), rel, content);
    }
    package(temp.path(), "libs/one", "one");

    let info = detect_monorepo(temp.path(), Vec::new()).unwrap();
    assert_eq!(info.kind, expected);
    assert!(info.is_monorepo);
    assert_eq!(names(temp.path()), vec!["one"]);
}

#[test]
fn test_nameless_packages_are_excluded() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "package.json", r#"{"workspaces": ["packages/*"]}"#);
    package(temp.path(), "packages/named", "named");
    write(temp.path(), "packages/anonymous/package.json", r#"{"private": true}"#);
    write(temp.path(), "packages/broken/package.json", "{ nope");
    fs::create_dir_all(temp.path().join("packages/empty")).unwrap();

    assert_eq!(names(temp.path()), vec!["named"]);
}

#[test]
fn test_declared_but_empty_workspace() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "pnpm-workspace.yaml", "packages:\n  - packages/*\n");

    let info = detect_monorepo(temp.path(), Vec::new()).unwrap();
    assert!(info.is_monorepo);
    assert_eq!(info.kind, MonorepoKind::Pnpm);
    assert!(info.packages.is_empty());
}

#[test]
fn test_monorepo_info_serializes_with_type_tag() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "lerna.json", "{}");
    package(temp.path(), "packages/a", "a");

    let info = detect_monorepo(temp.path(), Vec::new()).unwrap();
    let value = serde_json::to_value(&info).unwrap();
    assert_eq!(value["isMonorepo"], true);
    assert_eq!(value["type"], "lerna");
    assert_eq!(value["packages"][0]["name"], "a");
}
