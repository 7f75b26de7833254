//! SourceControl trait - common interface for checking out releases.

use std::path::{Path, PathBuf};

use anyhow::Result;

/// A version-controlled checkout of the monorepo.
pub trait SourceControl {
    /// Root of the working tree.
    fn workdir(&self) -> &Path;

    /// Reference that restores the current checkout: the branch name when
    /// on a branch, otherwise the commit id.
    fn head(&self) -> Result<String>;

    /// Current branch, or `None` when HEAD is detached.
    fn current_branch(&self) -> Result<Option<String>>;

    /// Check out a tag, branch or commit.
    fn checkout(&self, reference: &str) -> Result<()>;

    /// Create an isolated checkout of the same repository named `name`,
    /// optionally starting from `branch`.
    fn submodule(&self, branch: Option<&str>, name: &str) -> Result<Submodule>;

    /// Tear down a checkout created by [`SourceControl::submodule`].
    fn deinit(&self, submodule: Submodule) -> Result<()>;
}

/// An isolated checkout used to build dependency releases without
/// disturbing the main working tree.
pub struct Submodule {
    cwd: PathBuf,
    repo: Box<dyn SourceControl>,
}

impl Submodule {
    pub fn new(cwd: PathBuf, repo: Box<dyn SourceControl>) -> Self {
        Submodule { cwd, repo }
    }

    /// Root of the isolated working tree.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Check out a reference inside the isolated working tree.
    pub fn checkout(&self, reference: &str) -> Result<()> {
        self.repo.checkout(reference)
    }
}

impl std::fmt::Debug for Submodule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submodule").field("cwd", &self.cwd).finish()
    }
}

/// A checkout that is undone when the guard goes out of scope.
///
/// The previous head is restored on every exit path. Call
/// [`ScopedCheckout::restore`] to observe restore failures; when the guard
/// is simply dropped they are logged.
pub struct ScopedCheckout<'a> {
    scm: &'a dyn SourceControl,
    previous: Option<String>,
}

/// Check out `reference`, returning a guard that restores the prior head.
pub fn scoped_checkout<'a>(
    scm: &'a dyn SourceControl,
    reference: &str,
) -> Result<ScopedCheckout<'a>> {
    let previous = scm.head()?;
    tracing::debug!("checking out {} (from {})", reference, previous);
    scm.checkout(reference)?;

    Ok(ScopedCheckout {
        scm,
        previous: Some(previous),
    })
}

impl ScopedCheckout<'_> {
    /// Restore the previous checkout now, reporting failure.
    pub fn restore(mut self) -> Result<()> {
        match self.previous.take() {
            Some(previous) => self.scm.checkout(&previous),
            None => Ok(()),
        }
    }
}

impl Drop for ScopedCheckout<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            if let Err(e) = self.scm.checkout(&previous) {
                tracing::warn!("failed to restore checkout of {}: {:#}", previous, e);
            }
        }
    }
}
