//! Initialize a new patch repository

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use ply_core::PatchStore;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let store = PatchStore::new(path);
    store
        .init()
        .with_context(|| format!("Failed to initialize patch repo at {}", path.display()))?;

    println!("{} Initialized patch repo at {}", "✓".green(), path.display());
    println!(
        "  {} Link it from your working repo with: ply link {}",
        "→".dimmed(),
        path.display()
    );
    Ok(())
}
