//! Show applied-patch status for the working repo

use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;
use ply_core::Status;

pub fn run() -> Result<()> {
    let ply = util::open_ply()?;

    match ply.status()? {
        Status::NoPatchesApplied => {
            println!("{}", "no-patches-applied".yellow());
        }
        Status::AllPatchesApplied => {
            let applied = ply.applied_patches()?;
            println!("{}", "all-patches-applied".green());
            for name in &applied {
                println!("  {name}");
            }
        }
    }
    Ok(())
}
