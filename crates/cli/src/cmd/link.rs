//! Link the working repo to a patch repo

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let working = util::open_working()?;
    working
        .link(path)
        .with_context(|| format!("Failed to link patch repo at {}", path.display()))?;

    println!("{} Linked to patch repo at {}", "✓".green(), path.display());
    Ok(())
}
