//! Synchronous wrapper over the `git` binary.
//!
//! Everything ply needs from version control goes through this crate:
//! patch generation (`format-patch`), patch application (`am`), commits,
//! log reads, staging, init, resets, and config access. Each call shells
//! out to `git` in the repo's directory and blocks until it finishes.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Errors from the git collaborator.
///
/// `PatchDidNotApplyCleanly` is separated out because callers need to
/// branch on it: a failed apply leaves an in-progress `git am` session
/// behind for the operator to resolve, which is recoverable, while a
/// generic command failure is not.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to run git: {0}. Is git installed?")]
    Io(#[from] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("patch did not apply cleanly: {}", patch.display())]
    PatchDidNotApplyCleanly { patch: PathBuf },
}

pub type Result<T> = std::result::Result<T, GitError>;

/// Handle to a git repository rooted at `path`.
///
/// The directory does not have to contain a repository yet; `init` creates
/// one in place.
#[derive(Debug, Clone)]
pub struct Repo {
    path: PathBuf,
}

impl Repo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a git command in the repo directory, returning stdout.
    fn run(&self, args: &[&str]) -> Result<String> {
        tracing::debug!(repo = %self.path.display(), ?args, "git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .output()?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Initialize a repository in the repo directory, creating it first if
    /// necessary. Reinitializing an existing repository is left to git.
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(&self.path)?;
        self.run(&["init"])?;
        Ok(())
    }

    /// Generate one patch file per commit in `(since, HEAD]`, in
    /// chronological order, and return the filenames git chose.
    ///
    /// Filenames come back ordinal-prefixed (`0001-...patch`). The flags
    /// keep patch content stable across regenerations: no `[PATCH]`
    /// subject prefix, no diffstat, no `n/m` numbering.
    pub fn format_patch(&self, since: &str) -> Result<Vec<String>> {
        let stdout = self.run(&[
            "format-patch",
            "--keep-subject",
            "--no-numbered",
            "--no-stat",
            since,
        ])?;

        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Apply a single mbox-formatted patch as a new commit.
    ///
    /// On failure the in-progress `git am` session is left in place so the
    /// operator can resolve conflicts and `git am --continue` by hand.
    pub fn am(&self, patch_path: &Path, three_way_merge: bool) -> Result<()> {
        let patch = patch_path.display().to_string();

        let mut args = vec!["am"];
        if three_way_merge {
            args.push("--3way");
        }
        args.push(&patch);

        match self.run(&args) {
            Ok(_) => Ok(()),
            Err(GitError::CommandFailed { stderr, .. }) => {
                tracing::warn!(patch = %patch, stderr = %stderr.trim(), "git am failed");
                Err(GitError::PatchDidNotApplyCleanly {
                    patch: patch_path.to_path_buf(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Commit staged changes. With `amend`, rewrite the HEAD commit instead.
    pub fn commit(&self, message: &str, amend: bool, quiet: bool) -> Result<()> {
        let mut args = vec!["commit", "-m", message];
        if amend {
            args.push("--amend");
        }
        if quiet {
            args.push("-q");
        }
        self.run(&args)?;
        Ok(())
    }

    /// Formatted log output for `count` commits starting `skip` commits
    /// behind HEAD. Returns an empty string once `skip` walks past the
    /// root commit.
    pub fn log(&self, count: usize, pretty: &str, skip: usize) -> Result<String> {
        let count = format!("-{count}");
        let pretty = format!("--pretty=format:{pretty}");
        let skip = format!("--skip={skip}");
        self.run(&["log", &pretty, &count, &skip])
    }

    /// Stage a path.
    pub fn add(&self, path: &str) -> Result<()> {
        self.run(&["add", path])?;
        Ok(())
    }

    /// Reset the current branch to `refspec`.
    pub fn reset(&self, refspec: &str, hard: bool) -> Result<()> {
        let mut args = vec!["reset", "-q"];
        if hard {
            args.push("--hard");
        }
        args.push(refspec);
        self.run(&args)?;
        Ok(())
    }

    /// Read a config value. Returns `None` when the key is unset.
    pub fn config_get(&self, key: &str) -> Result<Option<String>> {
        match self.run(&["config", "--get", key]) {
            Ok(stdout) => {
                let value = stdout.trim();
                if value.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(value.to_string()))
                }
            }
            // `git config --get` exits non-zero for unset keys
            Err(GitError::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Add a config entry.
    pub fn config_add(&self, key: &str, value: &str) -> Result<()> {
        self.run(&["config", "--add", key, value])?;
        Ok(())
    }

    /// Unset a config key.
    pub fn config_unset(&self, key: &str) -> Result<()> {
        self.run(&["config", "--unset", key])?;
        Ok(())
    }

    /// True when the index or working tree differs from HEAD.
    ///
    /// Uses `diff-index` rather than `status --porcelain` so untracked
    /// files don't count as uncommitted changes.
    pub fn uncommitted_changes(&self) -> Result<bool> {
        let stdout = self.run(&["diff-index", "--name-only", "HEAD"])?;
        Ok(!stdout.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_reports_command_and_stderr_on_failure() {
        let temp = tempfile::tempdir().unwrap();
        let repo = Repo::new(temp.path());
        repo.init().unwrap();

        let err = repo.run(&["log", "-1"]).unwrap_err();
        match err {
            GitError::CommandFailed { command, .. } => {
                assert_eq!(command, "log -1");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn config_get_returns_none_for_unset_key() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let repo = Repo::new(temp.path());
        repo.init()?;

        assert_eq!(repo.config_get("ply.doesnotexist")?, None);

        repo.config_add("ply.doesnotexist", "value")?;
        assert_eq!(repo.config_get("ply.doesnotexist")?.as_deref(), Some("value"));

        repo.config_unset("ply.doesnotexist")?;
        assert_eq!(repo.config_get("ply.doesnotexist")?, None);
        Ok(())
    }
}
