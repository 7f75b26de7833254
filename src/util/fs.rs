//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob, MatchOptions, Pattern};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Copy a single file, creating the destination's parent directories.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dst).with_context(|| {
        format!("failed to copy {} to {}", src.display(), dst.display())
    })?;
    Ok(())
}

/// Deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = read_to_string(path)?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse JSON: {}", path.display()))
}

/// Serialize a value as pretty-printed JSON and write it.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut contents = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    contents.push('\n');
    write_string(path, &contents)
}

/// Find files matching glob patterns relative to a base directory.
///
/// Files whose base-relative path matches any of `ignore` are skipped.
pub fn glob_files(base: &Path, patterns: &[String], ignore: &[String]) -> Result<Vec<PathBuf>> {
    let ignore = ignore
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("invalid ignore pattern: {}", p)))
        .collect::<Result<Vec<_>>>()?;
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };

    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in
            glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if !path.is_file() {
                        continue;
                    }
                    let rel = relative_path(base, &path);
                    let rel = to_slash(&rel);
                    if ignore.iter().any(|p| p.matches_with(&rel, options)) {
                        tracing::debug!("ignoring {}", rel);
                        continue;
                    }
                    results.push(path);
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Render a relative path with forward slashes, for use in JSON documents.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("index.js"), "module.exports = {};").unwrap();
        fs::write(src.join("table.js"), "function Table() {}").unwrap();
        fs::write(src.join("readme.txt"), "readme").unwrap();

        let files = glob_files(tmp.path(), &["src/**/*.js".to_string()], &[]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_glob_files_ignore() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("v1")).unwrap();
        fs::write(src.join("index.js"), "").unwrap();
        fs::write(src.join("vision.js"), "").unwrap();
        fs::write(src.join("v1").join("client.js"), "").unwrap();

        let files = glob_files(
            tmp.path(),
            &["src/**/*.js".to_string()],
            &["src/v[0-9]*/**".to_string()],
        )
        .unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| to_slash(&relative_path(tmp.path(), p)))
            .collect();
        assert_eq!(names, vec!["src/index.js", "src/vision.js"]);
    }

    #[test]
    fn test_json_roundtrip_pretty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/out.json");

        write_json(&path, &serde_json::json!({ "a": 1 })).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"a\": 1"));
        let value: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(value["a"], 1);
    }
}
