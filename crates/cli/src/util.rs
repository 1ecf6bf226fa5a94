//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use ply_core::{Ply, PlyError, WorkingRepo};
use std::path::PathBuf;

/// Find the working repo root by walking up from cwd to find .git/
pub fn find_working_root() -> Result<PathBuf> {
    let mut current = std::env::current_dir().context("Failed to get current directory")?;

    loop {
        if current.join(".git").is_dir() {
            return Ok(current);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => anyhow::bail!("Not inside a git repository (no .git directory found)"),
        }
    }
}

/// Open the working repo at cwd.
pub fn open_working() -> Result<WorkingRepo> {
    Ok(WorkingRepo::new(find_working_root()?))
}

/// Open the orchestrator for the working repo at cwd and its linked patch
/// repo (the `ply.patchrepo` git config key, set by `ply link`).
pub fn open_ply() -> Result<Ply> {
    let root = find_working_root()?;
    let working = WorkingRepo::new(&root);
    let patch_repo = working
        .patch_repo_path()?
        .ok_or(PlyError::NoLinkedPatchRepo)?;
    Ok(Ply::new(root, patch_repo))
}
