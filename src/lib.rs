//! gcloud-docs - documentation builder for the google-cloud-node monorepo
//!
//! This crate scrapes JSDoc comments from every package of the monorepo,
//! writes versioned JSON documentation, keeps the docs manifest and bundles
//! dependency releases into umbrella releases.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a mock source control implementation, git helpers and
/// monorepo fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{Builder, Bundler, DocParser, JsDocParser};
pub use crate::core::{DocsManifest, Workspace};
pub use sources::{GitRepo, SourceControl};
pub use util::context::GlobalContext;
