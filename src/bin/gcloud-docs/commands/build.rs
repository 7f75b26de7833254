//! `gcloud-docs build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::Session;
use gcloud_docs::ops::{build, BuildOptions};
use gcloud_docs::GlobalContext;

pub fn execute(args: BuildArgs, ctx: &GlobalContext) -> Result<()> {
    let mut session = Session::open(ctx)?;

    let mut opts = BuildOptions::new(args.name, args.version);
    opts.propagate = !args.no_propagate;

    let report = build(
        &session.ws,
        &session.scm,
        &session.parser,
        &mut session.manifest,
        &opts,
    )?;

    eprintln!(
        "    Finished {} {} ({} documents, tag {})",
        report.name, report.version, report.files, report.tag_name
    );
    if report.manifest_changed {
        eprintln!("     Updated {}", session.manifest_path().display());
    }
    for version in &report.propagated {
        eprintln!(
            "  Propagated {} {} into {} {}",
            report.name,
            report.version,
            session.ws.umbrella(),
            version
        );
    }

    Ok(())
}
