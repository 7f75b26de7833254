//! `gcloud-docs build-all` command

use anyhow::Result;

use crate::cli::BuildAllArgs;
use crate::commands::Session;
use gcloud_docs::ops::{build_all, BuildAllOptions};
use gcloud_docs::GlobalContext;

pub fn execute(args: BuildAllArgs, ctx: &GlobalContext) -> Result<()> {
    let mut session = Session::open(ctx)?;

    let opts = BuildAllOptions {
        all_versions: args.all_versions,
        verbose: ctx.is_verbose(),
    };

    let reports = build_all(
        &session.ws,
        &session.scm,
        &session.parser,
        &mut session.manifest,
        &opts,
    )?;

    for report in &reports {
        eprintln!(
            "    Finished {} {} ({} documents)",
            report.name, report.version, report.files
        );
    }

    Ok(())
}
