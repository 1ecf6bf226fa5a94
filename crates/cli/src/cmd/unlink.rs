//! Remove the patch-repo link

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    let working = util::open_working()?;
    working.unlink().context("Failed to unlink patch repo")?;

    println!("{} Unlinked patch repo", "✓".green());
    Ok(())
}
