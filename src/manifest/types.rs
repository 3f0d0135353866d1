//! Typed views of the configuration files consulted during detection

use serde::Deserialize;
use std::collections::BTreeMap;

/// The subset of `package.json` that detection cares about
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub workspaces: Option<Workspaces>,
}

/// The `workspaces` field: either a bare list of globs, or the yarn-style
/// object form with a `packages` list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Workspaces {
    Patterns(Vec<String>),
    Object {
        #[serde(default)]
        packages: Option<Vec<String>>,
        #[serde(default)]
        nohoist: Option<Vec<String>>,
    },
}

impl Workspaces {
    /// Glob patterns declared by this field
    pub fn patterns(&self) -> &[String] {
        match self {
            Workspaces::Patterns(patterns) => patterns,
            Workspaces::Object {
                packages: Some(packages),
                ..
            } => packages,
            Workspaces::Object { packages: None, .. } => &[],
        }
    }

    /// Array form, or object form with a `packages` key (possibly empty)
    pub fn declares_packages(&self) -> bool {
        match self {
            Workspaces::Patterns(_) => true,
            Workspaces::Object { packages, .. } => packages.is_some(),
        }
    }

    /// Array form, or object form with a non-empty `packages` list
    pub fn has_packages(&self) -> bool {
        match self {
            Workspaces::Patterns(_) => true,
            Workspaces::Object { packages, .. } => {
                packages.as_ref().is_some_and(|p| !p.is_empty())
            }
        }
    }
}

impl PackageManifest {
    /// The npm rule: a `workspaces` array, or an object with packages listed
    pub fn has_workspaces(&self) -> bool {
        self.workspaces.as_ref().is_some_and(Workspaces::has_packages)
    }

    pub fn workspace_patterns(&self) -> Vec<String> {
        self.workspaces
            .as_ref()
            .map(|w| w.patterns().to_vec())
            .unwrap_or_default()
    }
}

/// `pnpm-workspace.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PnpmWorkspace {
    #[serde(default)]
    pub packages: Vec<String>,
}

/// `lerna.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LernaConfig {
    #[serde(default)]
    pub packages: Option<Vec<String>>,
    #[serde(default)]
    pub version: Option<String>,
}

/// `nx.json` or `workspace.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NxWorkspace {
    #[serde(default)]
    pub projects: BTreeMap<String, NxProject>,
}

/// A project entry: a relative path, or an object carrying `root`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NxProject {
    Path(String),
    Config {
        #[serde(default)]
        root: Option<String>,
    },
}

impl NxProject {
    pub fn root(&self) -> Option<&str> {
        match self {
            NxProject::Path(path) => Some(path),
            NxProject::Config { root } => root.as_deref(),
        }
    }
}
