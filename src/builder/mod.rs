//! Documentation build pipeline.
//!
//! A [`Builder`] documents one package at one version; a [`Bundler`]
//! merges dependency documentation into umbrella releases.

pub mod bundler;
pub mod context;
pub mod doc;
pub mod errors;
pub mod parser;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::{DocsManifest, Workspace};
use crate::util::fs::{
    copy_file, ensure_dir, glob_files, read_to_string, relative_path, remove_dir_all_if_exists,
    to_slash, write_json,
};

pub use bundler::Bundler;
pub use context::BuildContext;
pub use doc::{FileDoc, TableOfContents, TocGuide, TypeEntry};
pub use errors::DocsError;
pub use parser::{DocParser, JsDocParser, ParseError};

/// Result of building one package version.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Type dictionary as written (merged with dependencies for bundles)
    pub types: Vec<TypeEntry>,

    /// Table of contents as written
    pub toc: TableOfContents,

    /// Number of documents in the release
    pub files: usize,
}

/// Builds the documentation of one package at one version.
#[derive(Debug, Clone)]
pub struct Builder {
    name: String,
    version: String,
    source_root: PathBuf,
    output_dir: PathBuf,
    is_umbrella: bool,
    is_master: bool,
}

impl Builder {
    /// Create a builder; `None` selects the default (working tree) version.
    pub fn new(name: &str, version: Option<&str>, ws: &Workspace) -> Self {
        let default_version = ws.config().default_version();
        let version = version.unwrap_or(default_version).to_string();

        Builder {
            name: name.to_string(),
            output_dir: ws.output_dir(name, &version),
            source_root: ws.root().to_path_buf(),
            is_umbrella: ws.is_umbrella(name),
            is_master: version == default_version,
            version,
        }
    }

    /// Create a builder for the umbrella package.
    pub fn umbrella(version: &str, ws: &Workspace) -> Self {
        Self::new(ws.umbrella(), Some(version), ws)
    }

    /// Read sources from another checkout of the repository.
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = root.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn is_umbrella(&self) -> bool {
        self.is_umbrella
    }

    pub fn is_master(&self) -> bool {
        self.is_master
    }

    /// Source-control tag of this release, also stamped into `toc.json`.
    pub fn tag_name(&self) -> String {
        if self.is_master {
            self.version.clone()
        } else if self.is_umbrella {
            format!("v{}", self.version)
        } else {
            format!("{}-{}", self.name, self.version)
        }
    }

    /// Generate the documentation tree for this package version.
    ///
    /// The output directory is recreated from scratch. Umbrella releases
    /// are bundled with their dependencies afterwards.
    pub fn build(&self, cx: &BuildContext<'_>) -> Result<BuildOutput> {
        let ws = cx.workspace;
        let config = ws.config();
        tracing::info!("Building docs for {} {}", self.name, self.version);

        let package_dir = ws.package_dir(&self.source_root, &self.name);
        if !package_dir.is_dir() {
            return Err(DocsError::PackageNotFound {
                package: self.name.clone(),
                path: package_dir,
            }
            .into());
        }

        remove_dir_all_if_exists(&self.output_dir)?;
        ensure_dir(&self.output_dir)?;

        let guides = self.copy_guides(ws)?;

        let files = glob_files(
            &package_dir,
            &[config.source_glob().to_string()],
            &config.ignore(),
        )?;

        let mut docs = Vec::with_capacity(files.len());
        for file in &files {
            let source = to_slash(&relative_path(&self.source_root, file));
            let contents = read_to_string(file)?;
            let mut doc = cx
                .parser
                .parse_file(&source, &contents)
                .map_err(|e| DocsError::ParseFailed {
                    file: source.clone(),
                    source: e,
                })?;
            doc.path = output_path(&package_dir, file);
            tracing::debug!("parsed {} -> {}", source, doc.path);
            docs.push(doc);
        }

        link_family(&mut docs);
        for doc in &docs {
            write_json(&self.output_dir.join(&doc.path), doc)?;
        }

        let types = cx.parser.create_types_dictionary(&docs);
        let mut toc = cx.parser.create_toc(&types, &self.tag_name());
        toc.guides = guides;

        write_json(&self.output_dir.join(config.types_file()), &types)?;
        write_json(&self.output_dir.join(config.toc_file()), &toc)?;

        let mut output = BuildOutput {
            types,
            toc,
            files: docs.len(),
        };

        if self.is_umbrella && !self.is_master {
            let bundled = Bundler::for_builder(self.clone()).bundle(cx)?;
            output = bundled;
        }

        Ok(output)
    }

    /// Record this version in the manifest. Returns `true` if it changed.
    pub fn update_manifest(&self, manifest: &mut DocsManifest, ws: &Workspace) -> bool {
        manifest.record_version(
            &self.name,
            &self.version,
            ws.umbrella(),
            ws.config().scope(),
        )
    }

    /// Copy the repository's markdown guides into the output directory.
    fn copy_guides(&self, ws: &Workspace) -> Result<Vec<TocGuide>> {
        let pattern = ws.config().guides().to_string();
        let mut guides = Vec::new();

        for path in glob_files(&self.source_root, &[pattern], &[])? {
            let Some(file_name) = path.file_name() else {
                continue;
            };
            copy_file(&path, &self.output_dir.join(file_name))?;

            let id = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            guides.push(TocGuide {
                title: title_case(&id),
                contents: file_name.to_string_lossy().into_owned(),
                id,
            });
        }

        Ok(guides)
    }
}

/// Output path of a source file: `src/table.js` becomes `table.json`.
fn output_path(package_dir: &Path, file: &Path) -> String {
    let rel = relative_path(package_dir, file);
    let rel = rel.strip_prefix("src").map(Path::to_path_buf).unwrap_or(rel);
    to_slash(&rel.with_extension("json"))
}

/// Make the package's entry point the parent of every other file.
fn link_family(docs: &mut [FileDoc]) {
    let Some(root) = docs.iter().position(|d| !d.id.contains('/')) else {
        return;
    };
    let root_id = docs[root].id.clone();

    let children: Vec<String> = docs
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != root)
        .map(|(_, d)| d.id.clone())
        .collect();

    for (i, doc) in docs.iter_mut().enumerate() {
        if i == root {
            doc.children = children.clone();
        } else {
            doc.parent = Some(root_id.clone());
        }
    }
}

fn title_case(id: &str) -> String {
    id.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_package, MockRepo, TestRepo};
    use crate::util::fs::read_json;
    use crate::util::Config;

    fn ws() -> Workspace {
        Workspace::new("/repo", Config::default())
    }

    #[test]
    fn test_tag_name() {
        let ws = ws();

        assert_eq!(Builder::new("google-cloud", Some("0.44.0"), &ws).tag_name(), "v0.44.0");
        assert_eq!(Builder::new("bigtable", Some("0.4.1"), &ws).tag_name(), "bigtable-0.4.1");
        assert_eq!(Builder::new("bigtable", None, &ws).tag_name(), "master");
        assert_eq!(Builder::new("google-cloud", None, &ws).tag_name(), "master");
    }

    #[test]
    fn test_builder_flags() {
        let ws = ws();

        let umbrella = Builder::umbrella("0.45.0", &ws);
        assert!(umbrella.is_umbrella());
        assert!(!umbrella.is_master());
        assert_eq!(
            umbrella.output_dir(),
            Path::new("/repo/docs/json/google-cloud/0.45.0")
        );

        let master = Builder::new("bigtable", Some("master"), &ws);
        assert!(master.is_master());
        assert!(!master.is_umbrella());
    }

    #[test]
    fn test_update_manifest_idempotent() {
        let ws = ws();
        let mut manifest = DocsManifest::new("/repo/docs/manifest.json");
        let builder = Builder::new("bigtable", Some("0.4.1"), &ws);

        assert!(builder.update_manifest(&mut manifest, &ws));
        assert!(!builder.update_manifest(&mut manifest, &ws));
        assert_eq!(manifest.versions("bigtable"), ["0.4.1"]);
    }

    #[test]
    fn test_build_writes_docs_types_and_toc() {
        let repo = TestRepo::new();
        write_package(
            repo.root(),
            "bigtable",
            "0.4.1",
            &[],
            &[
                ("src/index.js", "/**\n * Cloud Bigtable.\n * @class\n */\nfunction Bigtable(options) {}\n"),
                ("src/table.js", "/**\n * A table.\n * @constructor\n */\nfunction Table(name) {}\n"),
                ("src/v2/bigtable_client.js", "/** @class */\nfunction Client() {}\n"),
            ],
        );
        std::fs::create_dir_all(repo.root().join("docs")).unwrap();
        std::fs::write(repo.root().join("docs/authentication.md"), "# Auth\n").unwrap();

        let ws = repo.workspace();
        let scm = MockRepo::new(repo.root());
        let parser = JsDocParser::default();
        let manifest = DocsManifest::new(ws.manifest_path());
        let cx = BuildContext::new(&ws, &parser, &scm, &manifest);

        let builder = Builder::new("bigtable", Some("0.4.1"), &ws);
        let output = builder.build(&cx).unwrap();
        assert_eq!(output.files, 2);

        let out = builder.output_dir();
        assert!(out.join("index.json").exists());
        assert!(out.join("table.json").exists());
        assert!(!out.join("v2").exists());
        assert!(out.join("authentication.md").exists());

        let table: FileDoc = read_json(&out.join("table.json")).unwrap();
        assert_eq!(table.path, "table.json");
        assert_eq!(table.parent.as_deref(), Some("bigtable"));
        assert_eq!(table.source, "packages/bigtable/src/table.js");

        let index: FileDoc = read_json(&out.join("index.json")).unwrap();
        assert_eq!(index.children, vec!["bigtable/table"]);

        let types: Vec<TypeEntry> = read_json(&out.join("types.json")).unwrap();
        assert_eq!(types.len(), 2);

        let toc: TableOfContents = read_json(&out.join("toc.json")).unwrap();
        assert_eq!(toc.tag_name, "bigtable-0.4.1");
        assert_eq!(toc.guides[0].title, "Authentication");
        assert_eq!(toc.services[0].title, "Bigtable");
    }

    #[test]
    fn test_build_names_file_that_fails_to_parse() {
        let repo = TestRepo::new();
        write_package(
            repo.root(),
            "dns",
            "0.2.0",
            &[],
            &[("src/zone.js", "/**\n * Broken.\n")],
        );

        let ws = repo.workspace();
        let scm = MockRepo::new(repo.root());
        let parser = JsDocParser::default();
        let manifest = DocsManifest::new(ws.manifest_path());
        let cx = BuildContext::new(&ws, &parser, &scm, &manifest);

        let err = Builder::new("dns", None, &ws).build(&cx).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("failed to parse packages/dns/src/zone.js"));
        assert!(message.contains("unterminated doc comment"));
    }

    #[test]
    fn test_build_missing_package() {
        let repo = TestRepo::new();
        let ws = repo.workspace();
        let scm = MockRepo::new(repo.root());
        let parser = JsDocParser::default();
        let manifest = DocsManifest::new(ws.manifest_path());
        let cx = BuildContext::new(&ws, &parser, &scm, &manifest);

        let err = Builder::new("spanner", None, &ws).build(&cx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DocsError>(),
            Some(DocsError::PackageNotFound { .. })
        ));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("troubleshooting"), "Troubleshooting");
        assert_eq!(title_case("getting-started"), "Getting Started");
    }
}
