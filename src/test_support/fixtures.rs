//! Monorepo fixtures.

use std::path::Path;

use tempfile::TempDir;

use crate::core::Workspace;
use crate::util::Config;

/// A temporary monorepo checkout.
#[derive(Debug)]
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("packages")).unwrap();
        TestRepo { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Workspace over this checkout with the default configuration.
    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.root(), Config::default())
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a `package.json` for `packages/<name>`.
pub fn package_json(name: &str, version: &str, deps: &[(&str, &str)]) -> String {
    let published = if name == "google-cloud" {
        name.to_string()
    } else {
        format!("@google-cloud/{}", name)
    };
    let deps: serde_json::Map<String, serde_json::Value> = deps
        .iter()
        .map(|(dep, range)| (dep.to_string(), serde_json::Value::from(*range)))
        .collect();

    let value = serde_json::json!({
        "name": published,
        "version": version,
        "dependencies": deps,
    });
    serde_json::to_string_pretty(&value).unwrap()
}

/// Write `packages/<name>` with a `package.json` and source files,
/// replacing whatever was there.
pub fn write_package(
    root: &Path,
    name: &str,
    version: &str,
    deps: &[(&str, &str)],
    files: &[(&str, &str)],
) {
    let dir = root.join("packages").join(name);
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("package.json"), package_json(name, version, deps)).unwrap();

    for (rel, contents) in files {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
}
