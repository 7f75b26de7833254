//! Workspace - central configuration hub.
//!
//! A Workspace represents the monorepo checkout being documented and its
//! configuration, providing centralized access to paths and settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::Config;

/// The monorepo being documented.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Repository root
    root: PathBuf,

    /// Merged configuration
    config: Config,
}

impl Workspace {
    /// Create a workspace for a repository root.
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Workspace {
            root: root.into(),
            config,
        }
    }

    /// Get the repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the umbrella package.
    pub fn umbrella(&self) -> &str {
        self.config.umbrella()
    }

    /// Check whether `name` is the umbrella package.
    pub fn is_umbrella(&self, name: &str) -> bool {
        name == self.config.umbrella()
    }

    /// Directory of a package inside a checkout rooted at `source_root`.
    pub fn package_dir(&self, source_root: &Path, name: &str) -> PathBuf {
        source_root.join(self.config.packages_dir()).join(name)
    }

    /// Root of the generated JSON tree.
    pub fn docs_root(&self) -> PathBuf {
        self.root.join(self.config.docs_root())
    }

    /// Output directory for one package version.
    pub fn output_dir(&self, name: &str, version: &str) -> PathBuf {
        self.docs_root().join(name).join(version)
    }

    /// Path of the persisted manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(self.config.manifest())
    }

    /// Directory holding isolated submodule checkouts.
    pub fn submodule_dir(&self) -> PathBuf {
        self.root.join(self.config.submodule_dir())
    }

    /// Names of every package in the working tree, sorted.
    pub fn package_names(&self) -> Result<Vec<String>> {
        let dir = self.root.join(self.config.packages_dir());
        let mut names = Vec::new();

        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("failed to read directory: {}", dir.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_dir() || !entry.path().join("package.json").exists() {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_workspace_paths() {
        let ws = Workspace::new("/repo", Config::default());

        assert_eq!(
            ws.output_dir("bigtable", "0.4.1"),
            PathBuf::from("/repo/docs/json/bigtable/0.4.1")
        );
        assert_eq!(ws.manifest_path(), PathBuf::from("/repo/docs/manifest.json"));
        assert_eq!(
            ws.package_dir(Path::new("/checkout"), "pubsub"),
            PathBuf::from("/checkout/packages/pubsub")
        );
        assert!(ws.is_umbrella("google-cloud"));
        assert!(!ws.is_umbrella("bigtable"));
    }

    #[test]
    fn test_package_names() {
        let tmp = TempDir::new().unwrap();
        for name in ["pubsub", "bigtable"] {
            let dir = tmp.path().join("packages").join(name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("package.json"), "{}").unwrap();
        }
        std::fs::create_dir_all(tmp.path().join("packages/not-a-package")).unwrap();

        let ws = Workspace::new(tmp.path(), Config::default());
        assert_eq!(ws.package_names().unwrap(), vec!["bigtable", "pubsub"]);
    }
}
