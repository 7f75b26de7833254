//! Semantic-version range resolution.
//!
//! Resolves the documented version of a dependency that an umbrella
//! release should bundle: the highest recorded version satisfying the
//! range the umbrella declares.

pub mod errors;
pub mod version;

pub use errors::ResolveError;
pub use version::{max_satisfying, parse_version_lenient, VersionRange};
