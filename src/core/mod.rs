//! Core data model: the docs manifest, package metadata and the workspace.

pub mod manifest;
pub mod package;
pub mod workspace;

pub use manifest::{DocsManifest, ModuleEntry};
pub use package::PackageJson;
pub use workspace::Workspace;
