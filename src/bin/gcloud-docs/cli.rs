//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// gcloud-docs - JSON documentation builder for google-cloud-node
#[derive(Parser)]
#[command(name = "gcloud-docs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Repository root (defaults to searching upward from the current directory)
    #[arg(long, global = true, env = "GCLOUD_DOCS_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the docs of one package
    Build(BuildArgs),

    /// Build the docs of every package
    BuildAll(BuildAllArgs),

    /// List the modules recorded in the docs manifest
    Manifest(ManifestArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Package name (directory under packages/)
    pub name: String,

    /// Release to build (defaults to the working tree)
    pub version: Option<String>,

    /// Do not push the release into compatible umbrella releases
    #[arg(long)]
    pub no_propagate: bool,
}

#[derive(Args)]
pub struct BuildAllArgs {
    /// Also rebuild every version recorded in the manifest
    #[arg(long)]
    pub all_versions: bool,
}

#[derive(Args)]
pub struct ManifestArgs {
    /// Print the manifest as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
