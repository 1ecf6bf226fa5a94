//! Reset the branch to the last commit before the applied patches

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

pub fn run(force: bool) -> Result<()> {
    let working = util::open_working()?;
    working.rollback(force).context("Failed to roll back")?;

    println!("{} Rolled back to the last upstream commit", "✓".green());
    Ok(())
}
