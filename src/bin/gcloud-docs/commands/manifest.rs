//! `gcloud-docs manifest` command

use anyhow::Result;

use crate::cli::ManifestArgs;
use crate::commands::Session;
use gcloud_docs::ops::{format_modules, list_modules};
use gcloud_docs::GlobalContext;

pub fn execute(args: ManifestArgs, ctx: &GlobalContext) -> Result<()> {
    let session = Session::open(ctx)?;

    if args.json {
        let json = serde_json::to_string_pretty(session.manifest.modules())?;
        println!("{}", json);
        return Ok(());
    }

    let modules = list_modules(&session.manifest);
    if modules.is_empty() {
        eprintln!("no modules recorded in {}", session.manifest_path().display());
        return Ok(());
    }

    print!("{}", format_modules(&modules));
    Ok(())
}
