//! Package metadata read from a package's `package.json`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::util::fs::read_json;

/// The fields of `package.json` the docs pipeline cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageJson {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

impl PackageJson {
    /// Load `package.json` from a package directory.
    pub fn load(package_dir: &Path) -> Result<Self> {
        read_json(&package_dir.join("package.json"))
    }

    /// Dependencies published under `scope`, as `(short name, range)` pairs.
    ///
    /// `@google-cloud/bigtable: ^0.4.0` yields `("bigtable", "^0.4.0")`.
    pub fn scoped_dependencies<'a>(
        &'a self,
        scope: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.dependencies.iter().filter_map(move |(name, range)| {
            let short = name.strip_prefix(scope)?.strip_prefix('/')?;
            Some((short, range.as_str()))
        })
    }

    /// Declared range for the scoped dependency `short_name`.
    pub fn dependency_range(&self, scope: &str, short_name: &str) -> Option<&str> {
        self.dependencies
            .get(&format!("{}/{}", scope, short_name))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scoped_dependencies() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("package.json"),
            r#"{
  "name": "google-cloud",
  "version": "0.45.0",
  "dependencies": {
    "@google-cloud/bigtable": "^0.4.0",
    "@google-cloud/pubsub": "^0.8.0",
    "extend": "^3.0.0"
  }
}"#,
        )
        .unwrap();

        let pkg = PackageJson::load(tmp.path()).unwrap();
        let deps: Vec<_> = pkg.scoped_dependencies("@google-cloud").collect();

        assert_eq!(deps, vec![("bigtable", "^0.4.0"), ("pubsub", "^0.8.0")]);
        assert_eq!(pkg.dependency_range("@google-cloud", "pubsub"), Some("^0.8.0"));
        assert_eq!(pkg.dependency_range("@google-cloud", "extend"), None);
    }

    #[test]
    fn test_missing_package_json() {
        let tmp = TempDir::new().unwrap();
        assert!(PackageJson::load(tmp.path()).is_err());
    }
}
