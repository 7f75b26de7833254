//! Configuration file support for gcloud-docs.
//!
//! Two configuration file locations are read:
//! - Global: `~/.gcloud-docs/config.toml` - User-wide defaults
//! - Project: `<root>/.gcloud-docs/config.toml` - Repository-specific overrides
//!
//! Project config takes precedence over global config. Every setting has a
//! built-in default matching the google-cloud monorepo layout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the aggregate package that bundles every other package.
pub const DEFAULT_UMBRELLA: &str = "google-cloud";

/// Pseudo-version used for builds of the current working tree.
pub const DEFAULT_VERSION: &str = "master";

/// npm scope shared by the bundled packages.
pub const DEFAULT_SCOPE: &str = "@google-cloud";

/// gcloud-docs configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation layout settings
    pub docs: DocsConfig,

    /// Source control settings
    pub git: GitConfig,
}

/// Documentation layout configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Umbrella package name (default: google-cloud)
    pub umbrella: Option<String>,

    /// Scope of bundled dependencies (default: @google-cloud)
    pub scope: Option<String>,

    /// Version treated as the working tree (default: master)
    pub default_version: Option<String>,

    /// Directory holding one subdirectory per package
    pub packages_dir: Option<String>,

    /// Source glob, relative to a package directory
    pub source_glob: Option<String>,

    /// Globs excluded from parsing, relative to a package directory
    pub ignore: Option<Vec<String>>,

    /// Markdown guides copied into every build, relative to the repository root
    pub guides: Option<String>,

    /// Root of the generated JSON tree
    pub docs_root: Option<String>,

    /// Manifest path
    pub manifest: Option<String>,

    /// Type dictionary file name
    pub types_file: Option<String>,

    /// Table of contents file name
    pub toc_file: Option<String>,
}

/// Source control configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Directory holding isolated submodule checkouts
    pub submodule_dir: Option<String>,

    /// Name of the checkout used for bundling dependencies
    pub submodule_name: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let docs = other.docs;
        merge_opt(&mut self.docs.umbrella, docs.umbrella);
        merge_opt(&mut self.docs.scope, docs.scope);
        merge_opt(&mut self.docs.default_version, docs.default_version);
        merge_opt(&mut self.docs.packages_dir, docs.packages_dir);
        merge_opt(&mut self.docs.source_glob, docs.source_glob);
        merge_opt(&mut self.docs.ignore, docs.ignore);
        merge_opt(&mut self.docs.guides, docs.guides);
        merge_opt(&mut self.docs.docs_root, docs.docs_root);
        merge_opt(&mut self.docs.manifest, docs.manifest);
        merge_opt(&mut self.docs.types_file, docs.types_file);
        merge_opt(&mut self.docs.toc_file, docs.toc_file);

        merge_opt(&mut self.git.submodule_dir, other.git.submodule_dir);
        merge_opt(&mut self.git.submodule_name, other.git.submodule_name);
    }

    pub fn umbrella(&self) -> &str {
        self.docs.umbrella.as_deref().unwrap_or(DEFAULT_UMBRELLA)
    }

    pub fn scope(&self) -> &str {
        self.docs.scope.as_deref().unwrap_or(DEFAULT_SCOPE)
    }

    pub fn default_version(&self) -> &str {
        self.docs
            .default_version
            .as_deref()
            .unwrap_or(DEFAULT_VERSION)
    }

    pub fn packages_dir(&self) -> &str {
        self.docs.packages_dir.as_deref().unwrap_or("packages")
    }

    pub fn source_glob(&self) -> &str {
        self.docs.source_glob.as_deref().unwrap_or("src/**/*.js")
    }

    /// Ignore globs; generated versioned API clients are skipped by default.
    pub fn ignore(&self) -> Vec<String> {
        self.docs
            .ignore
            .clone()
            .unwrap_or_else(|| vec!["src/v[0-9]*/**".to_string()])
    }

    pub fn guides(&self) -> &str {
        self.docs.guides.as_deref().unwrap_or("docs/*.md")
    }

    pub fn docs_root(&self) -> &str {
        self.docs.docs_root.as_deref().unwrap_or("docs/json")
    }

    pub fn manifest(&self) -> &str {
        self.docs.manifest.as_deref().unwrap_or("docs/manifest.json")
    }

    pub fn types_file(&self) -> &str {
        self.docs.types_file.as_deref().unwrap_or("types.json")
    }

    pub fn toc_file(&self) -> &str {
        self.docs.toc_file.as_deref().unwrap_or("toc.json")
    }

    pub fn submodule_dir(&self) -> &str {
        self.git.submodule_dir.as_deref().unwrap_or(".submodules")
    }

    pub fn submodule_name(&self) -> &str {
        self.git
            .submodule_name
            .as_deref()
            .unwrap_or("google-cloud-node")
    }
}

fn merge_opt<T>(slot: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *slot = other;
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.gcloud-docs/config.toml)
/// 2. Global config (~/.gcloud-docs/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config directory (~/.gcloud-docs).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".gcloud-docs"))
}

/// Get the global config path (~/.gcloud-docs/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (<root>/.gcloud-docs/config.toml).
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(".gcloud-docs").join("config.toml")
}
