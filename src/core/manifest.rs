//! The documentation manifest (`docs/manifest.json`).
//!
//! The manifest records every documented module and the versions it has
//! docs for. It is loaded once per invocation, mutated in memory through
//! [`DocsManifest::record_version`], and written back wholesale with
//! [`DocsManifest::save`].

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::util::fs::{read_json, write_json};

/// One module record in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntry {
    /// Package directory name (e.g. `bigtable`)
    pub id: String,

    /// Published package name (e.g. `@google-cloud/bigtable`)
    pub name: String,

    /// Service shown by default on the docs site
    pub default_service: String,

    /// Documented versions, newest first
    #[serde(default)]
    pub versions: Vec<String>,
}

impl ModuleEntry {
    /// Synthesize a record for a module seen for the first time.
    pub fn new(id: &str, umbrella: &str, scope: &str) -> Self {
        let name = if id == umbrella {
            id.to_string()
        } else {
            format!("{}/{}", scope, id)
        };

        ModuleEntry {
            id: id.to_string(),
            name,
            default_service: id.to_string(),
            versions: Vec::new(),
        }
    }

    /// Check whether docs exist for a version.
    pub fn has_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }
}

/// In-memory copy of the manifest file.
#[derive(Debug, Clone)]
pub struct DocsManifest {
    path: PathBuf,
    modules: Vec<ModuleEntry>,
}

impl DocsManifest {
    /// Create an empty manifest that will be saved to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DocsManifest {
            path: path.into(),
            modules: Vec::new(),
        }
    }

    /// Load the manifest, starting empty if the file does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no manifest at {}, starting empty", path.display());
            return Ok(Self::new(path));
        }

        let modules: Vec<ModuleEntry> = read_json(path)?;
        Ok(DocsManifest {
            path: path.to_path_buf(),
            modules,
        })
    }

    /// Write the manifest back to disk, pretty-printed.
    pub fn save(&self) -> Result<()> {
        write_json(&self.path, &self.modules)
    }

    /// Path the manifest is persisted at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All module records, umbrella first.
    pub fn modules(&self) -> &[ModuleEntry] {
        &self.modules
    }

    /// Look up a module record.
    pub fn module(&self, id: &str) -> Option<&ModuleEntry> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Recorded versions of a module, newest first; empty if unknown.
    pub fn versions(&self, id: &str) -> &[String] {
        self.module(id).map(|m| m.versions.as_slice()).unwrap_or(&[])
    }

    /// Record that docs exist for `id` at `version`.
    ///
    /// Creates the module record if needed, keeping the umbrella record
    /// first and the others sorted by id. The version is prepended unless
    /// it is already present. Returns `true` if the manifest changed.
    pub fn record_version(&mut self, id: &str, version: &str, umbrella: &str, scope: &str) -> bool {
        let index = match self.modules.iter().position(|m| m.id == id) {
            Some(index) => index,
            None => self.insert_sorted(ModuleEntry::new(id, umbrella, scope), umbrella),
        };

        let module = &mut self.modules[index];
        if module.has_version(version) {
            return false;
        }

        tracing::debug!("recording {} {} in manifest", id, version);
        module.versions.insert(0, version.to_string());
        true
    }

    fn insert_sorted(&mut self, entry: ModuleEntry, umbrella: &str) -> usize {
        let key = |m: &ModuleEntry| (m.id != umbrella, m.id.clone());
        let entry_key = key(&entry);
        let index = self
            .modules
            .iter()
            .position(|m| key(m) > entry_key)
            .unwrap_or(self.modules.len());
        self.modules.insert(index, entry);
        index
    }
}
