//! Version resolution error types.

use thiserror::Error;

/// Error while resolving a dependency range against recorded versions.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid version range `{range}`: {message}")]
    InvalidRange { range: String, message: String },

    #[error("no documented version of `{package}` satisfies `{range}` (known: {})", .available.join(", "))]
    NoMatchingVersion {
        package: String,
        range: String,
        available: Vec<String>,
    },
}
