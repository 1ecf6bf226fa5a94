//! Shared fixtures: real git repositories in temp directories.

use anyhow::Result;
use ply_core::{PatchStore, Ply};
use ply_git::Repo;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A working repo with one base commit plus an initialized patch repo,
/// both inside one temp directory.
pub struct RepoPair {
    _temp: TempDir,
    pub working_dir: PathBuf,
    pub patch_dir: PathBuf,
}

impl RepoPair {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let working_dir = temp.path().join("working");
        let patch_dir = temp.path().join("patches");

        let working = Repo::new(&working_dir);
        working.init()?;
        set_identity(&working)?;
        fs::write(working_dir.join("README.md"), "base\n")?;
        working.add("README.md")?;
        working.commit("Initial commit", false, true)?;

        let patch_repo = Repo::new(&patch_dir);
        patch_repo.init()?;
        set_identity(&patch_repo)?;
        PatchStore::new(&patch_dir).init()?;

        Ok(Self {
            _temp: temp,
            working_dir,
            patch_dir,
        })
    }

    pub fn ply(&self) -> Ply {
        Ply::new(&self.working_dir, &self.patch_dir)
    }

    pub fn working_repo(&self) -> Repo {
        Repo::new(&self.working_dir)
    }

    pub fn patch_repo(&self) -> Repo {
        Repo::new(&self.patch_dir)
    }

    /// Write a file and commit it in the working repo.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Result<()> {
        fs::write(self.working_dir.join(name), content)?;
        let repo = self.working_repo();
        repo.add(name)?;
        repo.commit(message, false, true)?;
        Ok(())
    }

    /// Current HEAD hash of the working repo.
    pub fn head(&self) -> Result<String> {
        Ok(self.working_repo().log(1, "%H", 0)?.trim().to_string())
    }

    /// Number of commits reachable from HEAD in `repo`.
    pub fn commit_count(repo: &Repo) -> Result<usize> {
        Ok(repo
            .log(100_000, "%H", 0)?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count())
    }
}

fn set_identity(repo: &Repo) -> Result<()> {
    repo.config_add("user.name", "Ply Test")?;
    repo.config_add("user.email", "ply@example.com")?;
    repo.config_add("commit.gpgsign", "false")?;
    Ok(())
}
