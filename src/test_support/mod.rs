//! Test utilities and mocks for unit tests.
//!
//! [`MockRepo`] stands in for a git checkout: tags are snapshots of the
//! `packages/` tree, and checking one out writes the snapshot back. The git
//! helpers build real repositories for tests that exercise `git2`.
//!
//! # Example
//!
//! ```rust,ignore
//! let repo = TestRepo::new();
//! write_package(repo.root(), "bigtable", "0.4.1", &[], &[("src/index.js", "")]);
//!
//! let scm = MockRepo::new(repo.root());
//! scm.tag("bigtable-0.4.1");
//! scm.checkout("bigtable-0.4.1")?;
//! assert_eq!(scm.calls(), vec!["checkout bigtable-0.4.1"]);
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use git2::{IndexAddOption, Repository, Signature};
use walkdir::WalkDir;

use crate::sources::{SourceControl, Submodule};

pub use fixtures::*;

/// Files under `packages/`, relative to the checkout root.
type Snapshot = Vec<(PathBuf, Vec<u8>)>;

#[derive(Debug, Default)]
struct MockState {
    refs: HashMap<String, Snapshot>,
    calls: Vec<String>,
}

/// In-memory source control over a directory on disk.
#[derive(Debug, Clone)]
pub struct MockRepo {
    workdir: PathBuf,
    name: Option<String>,
    head: Arc<Mutex<String>>,
    state: Arc<Mutex<MockState>>,
}

impl MockRepo {
    /// Create a mock repository on branch `master`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        MockRepo {
            workdir: workdir.into(),
            name: None,
            head: Arc::new(Mutex::new("master".to_string())),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Record the current `packages/` tree under `reference`.
    pub fn tag(&self, reference: &str) {
        let snapshot = snapshot(&self.workdir);
        self.state
            .lock()
            .unwrap()
            .refs
            .insert(reference.to_string(), snapshot);
    }

    /// Every operation performed, in order. Operations inside a submodule
    /// are prefixed with its name.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) {
        let call = match &self.name {
            Some(name) => format!("{}: {}", name, call),
            None => call,
        };
        self.state.lock().unwrap().calls.push(call);
    }
}

impl SourceControl for MockRepo {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn head(&self) -> Result<String> {
        Ok(self.head.lock().unwrap().clone())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = self.head.lock().unwrap().clone();
        Ok((head == "master").then_some(head))
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        self.record(format!("checkout {}", reference));

        let files = match self.state.lock().unwrap().refs.get(reference) {
            Some(files) => files.clone(),
            None => bail!("unknown revision `{}`", reference),
        };

        let packages = self.workdir.join("packages");
        if packages.exists() {
            std::fs::remove_dir_all(&packages)?;
        }
        for (rel, contents) in files {
            let path = self.workdir.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, contents)?;
        }

        *self.head.lock().unwrap() = reference.to_string();
        Ok(())
    }

    fn submodule(&self, branch: Option<&str>, name: &str) -> Result<Submodule> {
        self.record(format!("submodule {}", name));

        let cwd = self.workdir.join(".submodules").join(name);
        std::fs::create_dir_all(&cwd)?;

        let repo = MockRepo {
            workdir: cwd.clone(),
            name: Some(name.to_string()),
            head: Arc::new(Mutex::new(String::new())),
            state: Arc::clone(&self.state),
        };
        if let Some(branch) = branch {
            repo.checkout(branch)?;
        }

        Ok(Submodule::new(cwd, Box::new(repo)))
    }

    fn deinit(&self, submodule: Submodule) -> Result<()> {
        let name = submodule
            .cwd()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record(format!("deinit {}", name));
        std::fs::remove_dir_all(submodule.cwd())?;
        Ok(())
    }
}

fn snapshot(workdir: &Path) -> Snapshot {
    let packages = workdir.join("packages");
    if !packages.exists() {
        return Vec::new();
    }

    WalkDir::new(&packages)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(workdir).unwrap().to_path_buf();
            (rel, std::fs::read(e.path()).unwrap())
        })
        .collect()
}

/// Initialize a git repository on `master` with a committer identity.
pub fn init_repo(path: &Path) -> Repository {
    let repo = Repository::init(path).unwrap();
    repo.set_head("refs/heads/master").unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Docs Test").unwrap();
        config.set_str("user.email", "docs@example.com").unwrap();
    }
    repo
}

/// Stage every file in the working tree and commit it on HEAD.
pub fn commit_all(repo: &Repository, message: &str) {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = Signature::now("Docs Test", "docs@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap();
}

/// Create a lightweight tag at HEAD.
pub fn tag_head(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.tag_lightweight(name, head.as_object(), false).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repo_restores_snapshots() {
        let repo = TestRepo::new();
        write_package(repo.root(), "dns", "0.1.0", &[], &[("src/index.js", "// one")]);
        let scm = MockRepo::new(repo.root());
        scm.tag("dns-0.1.0");
        write_package(repo.root(), "dns", "0.2.0", &[], &[("src/index.js", "// two")]);
        scm.tag("master");

        scm.checkout("dns-0.1.0").unwrap();
        let index = repo.root().join("packages/dns/src/index.js");
        assert_eq!(std::fs::read_to_string(&index).unwrap(), "// one");
        assert_eq!(scm.current_branch().unwrap(), None);

        scm.checkout("master").unwrap();
        assert_eq!(std::fs::read_to_string(&index).unwrap(), "// two");
        assert!(scm.checkout("dns-9.9.9").is_err());
        assert_eq!(
            scm.calls(),
            vec!["checkout dns-0.1.0", "checkout master", "checkout dns-9.9.9"]
        );
    }
}
