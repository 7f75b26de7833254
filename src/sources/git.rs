//! Git-backed source control.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{AutotagOption, FetchOptions, Repository};

use crate::sources::{SourceControl, Submodule};
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};

/// A git working tree.
pub struct GitRepo {
    /// Open repository handle
    repo: Repository,

    /// Root of the working tree
    workdir: PathBuf,

    /// Where isolated checkouts are cloned
    submodule_dir: PathBuf,
}

impl GitRepo {
    /// Open the repository whose working tree is rooted at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path)
            .with_context(|| format!("failed to open git repository: {}", path.display()))?;
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .with_context(|| format!("repository has no working tree: {}", path.display()))?;
        let submodule_dir = workdir.join(".submodules");

        Ok(GitRepo {
            repo,
            workdir,
            submodule_dir,
        })
    }

    /// Clone isolated checkouts into `dir` instead of `<root>/.submodules`.
    pub fn with_submodule_dir(mut self, dir: PathBuf) -> Self {
        self.submodule_dir = dir;
        self
    }
}

impl SourceControl for GitRepo {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn head(&self) -> Result<String> {
        let head = self.repo.head().context("failed to read HEAD")?;
        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(name.to_string());
            }
        }
        let commit = head.peel_to_commit().context("HEAD does not point at a commit")?;
        Ok(commit.id().to_string())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        if self.repo.head_detached()? {
            return Ok(None);
        }
        let head = self.repo.head().context("failed to read HEAD")?;
        Ok(head.shorthand().map(str::to_string))
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        let (object, resolved) = self
            .repo
            .revparse_ext(reference)
            .with_context(|| format!("unknown revision `{}`", reference))?;
        let commit = object
            .peel_to_commit()
            .with_context(|| format!("`{}` does not point at a commit", reference))?;

        let mut opts = CheckoutBuilder::new();
        opts.safe();
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut opts))
            .with_context(|| format!("failed to check out `{}`", reference))?;

        match resolved {
            Some(r) if r.is_branch() => {
                let name = r.name().context("branch name is not valid UTF-8")?;
                self.repo.set_head(name)?;
            }
            _ => self.repo.set_head_detached(commit.id())?,
        }

        tracing::debug!("checked out {} in {}", reference, self.workdir.display());
        Ok(())
    }

    fn submodule(&self, branch: Option<&str>, name: &str) -> Result<Submodule> {
        let path = self.submodule_dir.join(name);
        remove_dir_all_if_exists(&path)?;
        ensure_dir(&self.submodule_dir)?;

        tracing::info!("Cloning {} into {}", name, path.display());

        let mut fetch = FetchOptions::new();
        fetch.download_tags(AutotagOption::All);

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch);
        if let Some(branch) = branch {
            builder.branch(branch);
        }

        let source = self.workdir.to_string_lossy();
        builder
            .clone(&source, &path)
            .with_context(|| format!("failed to clone {} into {}", source, path.display()))?;

        let repo = GitRepo::open(&path)?;
        Ok(Submodule::new(path, Box::new(repo)))
    }

    fn deinit(&self, submodule: Submodule) -> Result<()> {
        let path = submodule.cwd().to_path_buf();
        drop(submodule);
        tracing::debug!("removing {}", path.display());
        remove_dir_all_if_exists(&path)
    }
}
