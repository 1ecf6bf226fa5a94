//! Sanity-check the patch repo

use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    let ply = util::open_ply()?;
    let check = ply.store().check()?;

    if check.is_ok() {
        println!("{}", "OK".green());
        return Ok(());
    }

    if !check.missing_file.is_empty() {
        println!("{}", "Series entries with no patch file:".red());
        for name in &check.missing_file {
            println!("  - {name}");
        }
    }

    if !check.missing_entry.is_empty() {
        println!("{}", "Patch files with no series entry:".red());
        for name in &check.missing_entry {
            println!("  - {name}");
        }
    }

    anyhow::bail!("patch repo check failed")
}
