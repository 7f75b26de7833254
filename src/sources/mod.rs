//! Source control.
//!
//! Releases are documented from the tag they were published at, so every
//! build checks out a tag first. Checkouts are scoped: the previous head is
//! restored when the guard is dropped.

pub mod git;
pub mod source;

pub use git::GitRepo;
pub use source::{scoped_checkout, ScopedCheckout, SourceControl, Submodule};
