//! ply - save git commit ranges as patch series and restore them later.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod util;

/// Ply - patch-series management on top of git
#[derive(Parser)]
#[command(name = "ply")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new patch repository
    Init {
        /// Directory for the patch repo
        path: PathBuf,
    },
    /// Link the current working repo to a patch repo
    Link {
        /// Path to the patch repo
        path: PathBuf,
    },
    /// Remove the patch-repo link
    Unlink,
    /// Save commits after <since> into the patch repo
    Save {
        /// Lower (exclusive) bound of the commit range, e.g. HEAD~3
        since: String,
        /// Suppress per-patch output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Apply the stored patch series onto the current branch
    Restore {
        /// Disable the three-way merge fallback
        #[arg(long)]
        no_three_way: bool,
    },
    /// Show applied-patch status for the working repo
    Status,
    /// Sanity-check the patch repo's series file against its patch files
    Check,
    /// Hard-reset the branch to the last commit before the applied patches
    Rollback {
        /// Discard uncommitted changes too
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => cmd::init::run(&path),
        Commands::Link { path } => cmd::link::run(&path),
        Commands::Unlink => cmd::unlink::run(),
        Commands::Save { since, quiet } => cmd::save::run(&since, quiet),
        Commands::Restore { no_three_way } => cmd::restore::run(!no_three_way),
        Commands::Status => cmd::status::run(),
        Commands::Check => cmd::check::run(),
        Commands::Rollback { force } => cmd::rollback::run(force),
    }
}
