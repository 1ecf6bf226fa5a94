//! Save a commit range into the patch repo

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

pub fn run(since: &str, quiet: bool) -> Result<()> {
    let ply = util::open_ply()?;
    let added = ply
        .save(since, quiet)
        .with_context(|| format!("Failed to save patches since {since}"))?;

    if !quiet {
        for name in &added {
            println!("{} {}", "✓".green(), name);
        }
    }

    let noun = if added.len() == 1 { "patch" } else { "patches" };
    println!(
        "Saved {} {} to {}",
        added.len(),
        noun,
        ply.store().path().display()
    );
    Ok(())
}
