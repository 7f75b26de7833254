//! Command implementations

pub mod build;
pub mod build_all;
pub mod completions;
pub mod manifest;

use std::path::PathBuf;

use anyhow::Result;

use gcloud_docs::core::{DocsManifest, Workspace};
use gcloud_docs::{GitRepo, GlobalContext, JsDocParser};

/// Everything a docs command runs against.
pub struct Session {
    pub ws: Workspace,
    pub scm: GitRepo,
    pub parser: JsDocParser,
    pub manifest: DocsManifest,
}

impl Session {
    /// Locate the repository and load its configuration and manifest.
    pub fn open(ctx: &GlobalContext) -> Result<Self> {
        let root = ctx.find_root()?;
        let config = ctx.load_config(&root);
        let ws = Workspace::new(root, config);
        tracing::debug!("repository root: {}", ws.root().display());

        let scm = GitRepo::open(ws.root())?.with_submodule_dir(ws.submodule_dir());
        let parser = JsDocParser::from_config(ws.config());
        let manifest = DocsManifest::load(&ws.manifest_path())?;

        Ok(Session {
            ws,
            scm,
            parser,
            manifest,
        })
    }

    /// Manifest path for messages.
    pub fn manifest_path(&self) -> PathBuf {
        self.ws.manifest_path()
    }
}
