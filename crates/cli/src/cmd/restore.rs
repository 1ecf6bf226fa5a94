//! Apply the stored patch series onto the current branch

use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run(three_way_merge: bool) -> Result<()> {
    let ply = util::open_ply()?;

    let total = ply.store().series()?.len();
    let applied = ply.restore(three_way_merge)?;

    if applied == 0 {
        println!("{}", "Already up to date".dimmed());
    } else {
        println!(
            "{} Applied {}/{} patches ({} already applied)",
            "✓".green(),
            applied,
            total,
            total - applied
        );
    }
    Ok(())
}
