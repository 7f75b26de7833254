//! Global context for gcloud-docs operations.
//!
//! Provides centralized access to the working directory, the monorepo root
//! and the layered configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Explicit repository root, if one was given on the command line
    root: Option<PathBuf>,

    /// Whether to use verbose output
    verbose: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        Ok(GlobalContext {
            cwd,
            root: None,
            verbose: false,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use an explicit repository root instead of searching for one.
    pub fn with_root(mut self, root: Option<PathBuf>) -> Self {
        self.root = root.map(|r| if r.is_absolute() { r } else { self.cwd.join(r) });
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Find the monorepo root.
    ///
    /// Searches upward from the working directory for a directory that is
    /// a git checkout holding a `packages/` directory.
    pub fn find_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.root {
            if !root.is_dir() {
                bail!("repository root does not exist: {}", root.display());
            }
            return Ok(root.clone());
        }

        let mut current = self.cwd.clone();
        loop {
            if current.join(".git").exists() && current.join("packages").is_dir() {
                return Ok(current);
            }
            if !current.pop() {
                bail!(
                    "could not find a repository with a `packages/` directory above {}",
                    self.cwd.display()
                );
            }
        }
    }

    /// Load the merged global + project configuration for a root.
    pub fn load_config(&self, root: &Path) -> Config {
        load_config(global_config_path().as_deref(), &project_config_path(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_root_searches_upward() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(".git")).unwrap();
        std::fs::create_dir_all(tmp.path().join("packages/bigtable/src")).unwrap();

        let ctx =
            GlobalContext::with_cwd(tmp.path().join("packages/bigtable/src")).unwrap();
        assert_eq!(ctx.find_root().unwrap(), tmp.path());
    }

    #[test]
    fn test_find_root_missing() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        assert!(ctx.find_root().is_err());
    }

    #[test]
    fn test_explicit_root_is_relative_to_cwd() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("repo")).unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .unwrap()
            .with_root(Some(PathBuf::from("repo")));
        assert_eq!(ctx.find_root().unwrap(), tmp.path().join("repo"));
    }
}
