//! Implementation of `gcloud-docs build` and `gcloud-docs build-all`.

use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::builder::{BuildContext, Builder, Bundler, DocParser};
use crate::core::{DocsManifest, Workspace};
use crate::sources::{scoped_checkout, SourceControl};

/// Options for building one package.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Package directory name under `packages/`
    pub name: String,

    /// Release to build (`None` = the working tree)
    pub version: Option<String>,

    /// Push a dependency release into compatible umbrella releases
    pub propagate: bool,
}

impl BuildOptions {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        BuildOptions {
            name: name.into(),
            version,
            propagate: true,
        }
    }
}

/// What a single package build did.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub name: String,
    pub version: String,
    pub tag_name: String,

    /// Documents written, including bundled dependency documents
    pub files: usize,

    /// Whether the manifest gained a version
    pub manifest_changed: bool,

    /// Umbrella versions the release was propagated into
    pub propagated: Vec<String>,
}

/// Build one package at one version, record it and propagate it.
///
/// Every build checks out its reference in the main working tree first: the
/// release tag, or the default-version branch for master builds. The previous
/// checkout is restored afterwards, also when the build fails. The manifest
/// is saved before propagation so a failed propagation keeps the record.
pub fn build(
    ws: &Workspace,
    scm: &dyn SourceControl,
    parser: &dyn DocParser,
    manifest: &mut DocsManifest,
    opts: &BuildOptions,
) -> Result<BuildReport> {
    let builder = Builder::new(&opts.name, opts.version.as_deref(), ws);
    let tag_name = builder.tag_name();

    let output = {
        let guard = scoped_checkout(scm, &tag_name)?;

        let cx = BuildContext::new(ws, parser, scm, manifest);
        let output = builder
            .build(&cx)
            .with_context(|| format!("failed to build {} {}", builder.name(), builder.version()))?;

        guard.restore()?;
        output
    };

    let manifest_changed = builder.update_manifest(manifest, ws);
    if manifest_changed {
        tracing::debug!("recorded {} {} in the manifest", builder.name(), builder.version());
    }
    manifest.save()?;

    let propagated = if opts.propagate && !builder.is_master() && !builder.is_umbrella() {
        let cx = BuildContext::new(ws, parser, scm, manifest);
        Bundler::update_dep(&builder, &cx)?
    } else {
        Vec::new()
    };

    Ok(BuildReport {
        name: builder.name().to_string(),
        version: builder.version().to_string(),
        tag_name,
        files: output.files,
        manifest_changed,
        propagated,
    })
}

/// Options for building every package.
#[derive(Debug, Clone, Default)]
pub struct BuildAllOptions {
    /// Also rebuild every version recorded in the manifest
    pub all_versions: bool,

    /// Verbose output (disables the progress bar)
    pub verbose: bool,
}

/// The builds `build_all` runs, in order.
///
/// Every package is built from the working tree first. Recorded releases
/// follow with the umbrella last, so bundles pick up freshly built
/// dependency documents. Recorded releases are not propagated again.
pub fn plan_all(
    ws: &Workspace,
    manifest: &DocsManifest,
    all_versions: bool,
) -> Result<Vec<BuildOptions>> {
    let mut jobs: Vec<BuildOptions> = ws
        .package_names()?
        .into_iter()
        .map(|name| BuildOptions::new(name, None))
        .collect();

    if !all_versions {
        return Ok(jobs);
    }

    let default_version = ws.config().default_version();
    let mut umbrella_jobs = Vec::new();

    for module in manifest.modules() {
        for version in &module.versions {
            if version == default_version {
                continue;
            }
            let job = BuildOptions {
                name: module.id.clone(),
                version: Some(version.clone()),
                propagate: false,
            };
            if ws.is_umbrella(&module.id) {
                umbrella_jobs.push(job);
            } else {
                jobs.push(job);
            }
        }
    }

    jobs.extend(umbrella_jobs);
    Ok(jobs)
}

/// Build every package, stopping at the first failure.
pub fn build_all(
    ws: &Workspace,
    scm: &dyn SourceControl,
    parser: &dyn DocParser,
    manifest: &mut DocsManifest,
    opts: &BuildAllOptions,
) -> Result<Vec<BuildReport>> {
    let start = Instant::now();
    let jobs = plan_all(ws, manifest, opts.all_versions)?;

    let pb = if !opts.verbose && jobs.len() > 1 {
        let pb = ProgressBar::new(jobs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut reports = Vec::with_capacity(jobs.len());
    for job in &jobs {
        if let Some(pb) = &pb {
            pb.set_message(match &job.version {
                Some(version) => format!("{} {}", job.name, version),
                None => job.name.clone(),
            });
        }

        let report = build(ws, scm, parser, manifest, job);
        let report = match report {
            Ok(report) => report,
            Err(e) => {
                if let Some(pb) = &pb {
                    pb.abandon();
                }
                return Err(e);
            }
        };
        reports.push(report);

        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    tracing::info!(
        "Built {} release(s) in {:.2}s",
        reports.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(reports)
}
