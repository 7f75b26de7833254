//! Build context - the collaborators a documentation build runs against.

use std::fmt;

use crate::builder::parser::DocParser;
use crate::core::{DocsManifest, Workspace};
use crate::sources::SourceControl;

/// Borrowed collaborators shared by builders and bundlers.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    /// Monorepo layout and configuration
    pub workspace: &'a Workspace,

    /// Comment parser
    pub parser: &'a dyn DocParser,

    /// Source control for the main working tree
    pub scm: &'a dyn SourceControl,

    /// Known modules and versions
    pub manifest: &'a DocsManifest,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        workspace: &'a Workspace,
        parser: &'a dyn DocParser,
        scm: &'a dyn SourceControl,
        manifest: &'a DocsManifest,
    ) -> Self {
        BuildContext {
            workspace,
            parser,
            scm,
            manifest,
        }
    }
}

impl fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("root", &self.workspace.root())
            .field("workdir", &self.scm.workdir())
            .field("manifest", &self.manifest.path())
            .finish()
    }
}
