//! High-level operations.
//!
//! This module contains the implementation of the `gcloud-docs` commands.

pub mod docs_build;
pub mod docs_manifest;

pub use docs_build::{build, build_all, plan_all, BuildAllOptions, BuildOptions, BuildReport};
pub use docs_manifest::{format_modules, list_modules, ModuleSummary};
