//! Umbrella bundling.
//!
//! An umbrella release carries the documentation of every dependency at the
//! version its `package.json` resolves to. [`Bundler::bundle`] assembles a
//! whole release; [`Bundler::update_dep`] pushes a freshly built dependency
//! release into the umbrella releases that resolve to it.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::builder::doc::{TableOfContents, TypeEntry};
use crate::builder::{BuildContext, Builder, BuildOutput, DocsError};
use crate::core::{PackageJson, Workspace};
use crate::resolver::{max_satisfying, ResolveError, VersionRange};
use crate::sources::{scoped_checkout, SourceControl, Submodule};
use crate::util::fs::{ensure_dir, read_json, relative_path, remove_dir_all_if_exists, write_json};

/// A dependency release selected for an umbrella bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDep {
    pub name: String,
    pub version: String,
}

/// Merges dependency documentation into one umbrella release.
#[derive(Debug, Clone)]
pub struct Bundler {
    builder: Builder,
}

impl Bundler {
    /// Bundle the release a builder has just produced.
    pub fn for_builder(builder: Builder) -> Self {
        Bundler { builder }
    }

    /// Bundle an already built umbrella release.
    pub fn for_version(version: &str, ws: &Workspace) -> Self {
        Bundler {
            builder: Builder::umbrella(version, ws),
        }
    }

    /// The umbrella builder this bundler writes into.
    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    /// Copy a dependency's built documents into `<umbrella>/<dep>/`.
    ///
    /// The type dictionary and table of contents are left behind. Every
    /// document's `overview` is replaced with the umbrella usage snippet.
    /// Returns the number of documents copied.
    pub fn add(&self, dep: &Builder, cx: &BuildContext<'_>) -> Result<usize> {
        let config = cx.workspace.config();
        let src_dir = dep.output_dir();
        if !src_dir.is_dir() {
            return Err(DocsError::MissingDocs {
                package: dep.name().to_string(),
                path: src_dir.to_path_buf(),
            }
            .into());
        }

        let dst_dir = self.builder.output_dir().join(dep.name());
        remove_dir_all_if_exists(&dst_dir)?;
        ensure_dir(&dst_dir)?;

        let overview = cx.parser.create_overview(dep.name(), true);
        let mut copied = 0;

        for entry in WalkDir::new(src_dir).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("failed to walk directory: {}", src_dir.display()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension() != Some(OsStr::new("json")) {
                continue;
            }
            let rel = relative_path(src_dir, path);
            if rel == Path::new(config.types_file()) || rel == Path::new(config.toc_file()) {
                continue;
            }

            let mut doc: serde_json::Value = read_json(path)?;
            let Some(fields) = doc.as_object_mut() else {
                return Err(DocsError::InvalidDocument {
                    path: path.to_path_buf(),
                    message: "expected a JSON object".to_string(),
                }
                .into());
            };
            fields.insert(
                "overview".to_string(),
                serde_json::Value::String(overview.clone()),
            );

            write_json(&dst_dir.join(&rel), &doc)?;
            copied += 1;
        }

        tracing::debug!(
            "added {} {} documents to {} {}",
            copied,
            dep.name(),
            self.builder.name(),
            self.builder.version()
        );
        Ok(copied)
    }

    /// Resolve every scoped dependency of the umbrella against the manifest.
    pub fn resolve_dependencies(&self, cx: &BuildContext<'_>) -> Result<Vec<ResolvedDep>> {
        let ws = cx.workspace;
        let scope = ws.config().scope();
        let package_dir = ws.package_dir(self.builder.source_root(), self.builder.name());
        let package = PackageJson::load(&package_dir)?;

        let mut resolved = Vec::new();
        for (name, range) in package.scoped_dependencies(scope) {
            let version = resolve_version(cx, name, range)?;
            tracing::debug!("{} {} resolves to {}", name, range, version);
            resolved.push(ResolvedDep {
                name: name.to_string(),
                version,
            });
        }

        Ok(resolved)
    }

    /// Build every dependency at its resolved version and merge it into
    /// the umbrella release.
    ///
    /// Dependencies are built from an isolated checkout so the main working
    /// tree keeps the umbrella release checked out. The isolated checkout is
    /// torn down whether or not bundling succeeds.
    pub fn bundle(&self, cx: &BuildContext<'_>) -> Result<BuildOutput> {
        let ws = cx.workspace;
        let config = ws.config();
        let out = self.builder.output_dir();

        tracing::info!(
            "Bundling {} {}",
            self.builder.name(),
            self.builder.version()
        );

        let mut types: Vec<TypeEntry> = read_json(&out.join(config.types_file()))?;
        let deps = self.resolve_dependencies(cx)?;

        let branch = cx.scm.current_branch()?;
        let submodule = cx
            .scm
            .submodule(branch.as_deref(), config.submodule_name())?;

        let bundled = self.bundle_in(&submodule, &deps, cx);
        let deinit = cx.scm.deinit(submodule);
        let dep_types = bundled?;
        deinit?;

        for (dep, dep_types) in deps.iter().zip(dep_types) {
            types.extend(dep_types.into_iter().map(|t| t.prefixed(&dep.name)));
        }

        let toc_path = out.join(config.toc_file());
        let guides = if toc_path.exists() {
            read_json::<TableOfContents>(&toc_path)?.guides
        } else {
            Vec::new()
        };
        let mut toc = cx.parser.create_toc(&types, &self.builder.tag_name());
        toc.guides = guides;

        write_json(&out.join(config.types_file()), &types)?;
        write_json(&toc_path, &toc)?;

        Ok(BuildOutput {
            files: count_documents(out, cx.workspace)?,
            types,
            toc,
        })
    }

    fn bundle_in(
        &self,
        submodule: &Submodule,
        deps: &[ResolvedDep],
        cx: &BuildContext<'_>,
    ) -> Result<Vec<Vec<TypeEntry>>> {
        let mut merged = Vec::with_capacity(deps.len());

        for dep in deps {
            let builder = Builder::new(&dep.name, Some(&dep.version), cx.workspace)
                .with_source_root(submodule.cwd());
            submodule.checkout(&builder.tag_name())?;

            let output = builder
                .build(cx)
                .with_context(|| format!("failed to build {} {}", dep.name, dep.version))?;
            self.add(&builder, cx)?;
            merged.push(output.types);
        }

        Ok(merged)
    }

    /// Propagate a dependency release into compatible umbrella releases.
    ///
    /// Umbrella releases are visited in manifest order, newest first. Each
    /// one is checked out to read the range it declares for the dependency;
    /// the walk stops at the first release that does not resolve to
    /// `builder`'s version. Returns the umbrella versions updated.
    pub fn update_dep(builder: &Builder, cx: &BuildContext<'_>) -> Result<Vec<String>> {
        if builder.is_master() {
            return Err(DocsError::MasterPropagation {
                package: builder.name().to_string(),
            }
            .into());
        }

        let ws = cx.workspace;
        let config = ws.config();
        let umbrella_versions = cx.manifest.versions(ws.umbrella());
        let mut updated = Vec::new();

        for version in umbrella_versions {
            if version == config.default_version() {
                continue;
            }

            let bundler = Bundler::for_version(version, ws);
            let range = {
                let guard = scoped_checkout(cx.scm, &bundler.builder.tag_name())?;
                let range = declared_range(cx.scm, ws, builder.name())?;
                guard.restore()?;
                range
            };

            let Some(range) = range else {
                tracing::debug!(
                    "{} {} does not depend on {}",
                    ws.umbrella(),
                    version,
                    builder.name()
                );
                break;
            };

            let range = VersionRange::parse(&range)?;
            let resolved = max_satisfying(cx.manifest.versions(builder.name()), &range);
            if resolved != Some(builder.version()) {
                tracing::debug!(
                    "{} {} resolves {} {} to {}",
                    ws.umbrella(),
                    version,
                    builder.name(),
                    range,
                    resolved.unwrap_or("nothing")
                );
                break;
            }

            tracing::info!(
                "Updating {} {} with {} {}",
                ws.umbrella(),
                version,
                builder.name(),
                builder.version()
            );
            bundler.add(builder, cx)?;
            bundler.refresh_types(builder, cx)?;
            updated.push(version.clone());
        }

        Ok(updated)
    }

    /// Replace a dependency's entries in the umbrella type dictionary and
    /// table of contents with those of a fresh build.
    fn refresh_types(&self, dep: &Builder, cx: &BuildContext<'_>) -> Result<()> {
        let config = cx.workspace.config();
        let out = self.builder.output_dir();
        let types_path = out.join(config.types_file());
        if !types_path.exists() {
            return Ok(());
        }

        let prefix = format!("{}/", dep.name());
        let mut types: Vec<TypeEntry> = read_json(&types_path)?;
        types.retain(|t| !t.contents.starts_with(&prefix));

        let dep_types: Vec<TypeEntry> = read_json(&dep.output_dir().join(config.types_file()))?;
        types.extend(dep_types.into_iter().map(|t| t.prefixed(dep.name())));

        let toc_path = out.join(config.toc_file());
        let guides = if toc_path.exists() {
            read_json::<TableOfContents>(&toc_path)?.guides
        } else {
            Vec::new()
        };
        let mut toc = cx.parser.create_toc(&types, &self.builder.tag_name());
        toc.guides = guides;

        write_json(&types_path, &types)?;
        write_json(&toc_path, &toc)
    }
}

/// Documents in a release directory, bundled dependencies included.
fn count_documents(out: &Path, ws: &Workspace) -> Result<usize> {
    let config = ws.config();
    let mut count = 0;

    for entry in WalkDir::new(out) {
        let entry = entry.with_context(|| format!("failed to walk directory: {}", out.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension() != Some(OsStr::new("json")) {
            continue;
        }
        let rel = relative_path(out, path);
        if rel == Path::new(config.types_file()) || rel == Path::new(config.toc_file()) {
            continue;
        }
        count += 1;
    }

    Ok(count)
}

/// Range the checked-out umbrella declares for `dep`, if any.
fn declared_range(scm: &dyn SourceControl, ws: &Workspace, dep: &str) -> Result<Option<String>> {
    let package_dir = ws.package_dir(scm.workdir(), ws.umbrella());
    let package = PackageJson::load(&package_dir)?;
    Ok(package
        .dependency_range(ws.config().scope(), dep)
        .map(str::to_string))
}

fn resolve_version(cx: &BuildContext<'_>, name: &str, range: &str) -> Result<String> {
    let Some(module) = cx.manifest.module(name) else {
        return Err(DocsError::MissingModule {
            package: name.to_string(),
        }
        .into());
    };

    let parsed = VersionRange::parse(range)?;
    let version =
        max_satisfying(&module.versions, &parsed).ok_or_else(|| ResolveError::NoMatchingVersion {
            package: name.to_string(),
            range: range.to_string(),
            available: module.versions.clone(),
        })?;

    Ok(version.to_string())
}
