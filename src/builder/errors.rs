//! Documentation build error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::builder::parser::ParseError;

/// Error raised while building or bundling documentation.
#[derive(Debug, Error)]
pub enum DocsError {
    #[error("failed to parse {file}")]
    ParseFailed {
        file: String,
        #[source]
        source: ParseError,
    },

    #[error("package `{package}` not found at {path}")]
    PackageNotFound { package: String, path: PathBuf },

    #[error(
        "cannot propagate `{package}` docs into umbrella releases without an explicit version"
    )]
    MasterPropagation { package: String },

    #[error("`{package}` has no entry in the docs manifest")]
    MissingModule { package: String },

    #[error("no docs have been built for `{package}` at {path}")]
    MissingDocs { package: String, path: PathBuf },

    #[error("invalid document {path}: {message}")]
    InvalidDocument { path: PathBuf, message: String },
}
