//! Built-in workspace detectors, one per monorepo convention

pub mod lerna;
pub mod npm;
pub mod nx;
pub mod pnpm;
pub mod turbo;
pub mod yarn;

pub use lerna::LernaDetector;
pub use npm::NpmDetector;
pub use nx::NxDetector;
pub use pnpm::PnpmDetector;
pub use turbo::TurboDetector;
pub use yarn::YarnDetector;

use super::WorkspaceDetector;

/// Built-in detectors in priority order
///
/// Turbo wraps other package managers so it goes first, and yarn (workspaces
/// plus lockfile) must be tried before plain npm workspaces.
pub fn builtin_detectors() -> Vec<Box<dyn WorkspaceDetector>> {
    vec![
        Box::new(TurboDetector),
        Box::new(PnpmDetector),
        Box::new(YarnDetector),
        Box::new(NpmDetector),
        Box::new(LernaDetector),
        Box::new(NxDetector),
    ]
}
