//! gcloud-docs CLI - builds the google-cloud-node documentation

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use gcloud_docs::GlobalContext;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("gcloud_docs=debug")
    } else {
        EnvFilter::new("gcloud_docs=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = GlobalContext::new()?.with_root(cli.root);
    ctx.set_verbose(cli.verbose);

    match cli.command {
        Commands::Build(args) => commands::build::execute(args, &ctx),
        Commands::BuildAll(args) => commands::build_all::execute(args, &ctx),
        Commands::Manifest(args) => commands::manifest::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
