//! Working-repo side of the patch lifecycle.
//!
//! Generates patch files from commit history, applies an ordered series
//! while skipping entries already on the branch, and stamps every applied
//! commit with a `Ply-Patch` trailer. The set of applied patches is never
//! held in memory between runs; it is reconstructed on demand by scanning
//! commit messages from HEAD backwards.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ply_git::{GitError, Repo};

use crate::error::{PlyError, Result};

/// Trailer key marking a commit as carrying a specific patch.
pub const PATCH_TRAILER: &str = "Ply-Patch:";

/// Git config key linking a working repo to its patch repo.
pub const PATCH_REPO_CONFIG_KEY: &str = "ply.patchrepo";

/// One entry of the applied-patch ledger.
#[derive(Debug, Clone)]
struct AppliedEntry {
    commit: String,
    patch_name: String,
}

pub struct WorkingRepo {
    repo: Repo,
    path: PathBuf,
}

impl WorkingRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            repo: Repo::new(&path),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Generate one patch file per commit in `(since, HEAD]`.
    ///
    /// git numbers the files (`0001-...`); the ordinal prefix is stripped
    /// here because application order lives in the series manifest, not in
    /// filenames. Returns the final paths, chronological order.
    pub fn format_patches(&self, since: &str) -> Result<Vec<PathBuf>> {
        let filenames = self.repo.format_patch(since)?;
        if filenames.is_empty() {
            return Err(PlyError::EmptyPatchRange {
                since: since.to_string(),
            });
        }

        let mut paths = Vec::with_capacity(filenames.len());
        for filename in filenames {
            let from = self.path.join(&filename);
            let mut to = self.path.join(strip_ordinal_prefix(&filename));
            if paths.contains(&to) {
                // Two commits in the range share a subject; keep git's
                // numbered name for the later one and let the store dedup.
                to = from.clone();
            }
            if from != to {
                fs::rename(&from, &to)?;
            }
            paths.push(to);
        }

        tracing::debug!(count = paths.len(), since = %since, "generated patches");
        Ok(paths)
    }

    /// Names of patches already applied to the current branch, HEAD-most
    /// first.
    ///
    /// Walks the log newest-first collecting `Ply-Patch` trailers and
    /// stops at the first commit without one, so only the contiguous run
    /// of stamped commits ending at HEAD counts. An unrelated commit on
    /// top of applied patches hides everything beneath it.
    pub fn applied_patches(&self) -> Result<Vec<String>> {
        Ok(self
            .applied_entries()?
            .into_iter()
            .map(|entry| entry.patch_name)
            .collect())
    }

    fn applied_entries(&self) -> Result<Vec<AppliedEntry>> {
        let mut applied = Vec::new();

        for skip in 0.. {
            let output = self.repo.log(1, "%H %B", skip)?;
            let output = output.trim();
            if output.is_empty() {
                // Walked past the root commit
                break;
            }

            let (commit, message) = match output.split_once(' ') {
                Some(parts) => parts,
                None => (output, ""),
            };

            match patch_trailer(message) {
                Some(name) => applied.push(AppliedEntry {
                    commit: commit.to_string(),
                    patch_name: name.to_string(),
                }),
                None => break,
            }
        }

        Ok(applied)
    }

    /// Apply `patch_names` in order from files under `base_path`, skipping
    /// names the ledger already records. Returns how many patches were
    /// newly applied.
    ///
    /// A conflict stops the run with `PatchApplyConflict`; everything
    /// applied earlier in the run stays committed and stamped, which is
    /// what makes a rerun resume instead of starting over.
    pub fn apply_patches(
        &self,
        base_path: &Path,
        patch_names: &[String],
        three_way_merge: bool,
    ) -> Result<usize> {
        let applied: HashSet<String> = self.applied_patches()?.into_iter().collect();
        let mut newly_applied = 0;

        for name in patch_names {
            if applied.contains(name) {
                tracing::debug!(patch = %name, "already applied, skipping");
                continue;
            }

            let patch_path = base_path.join(name);
            if !patch_path.exists() {
                return Err(PlyError::ManifestIntegrity { name: name.clone() });
            }

            match self.repo.am(&patch_path, three_way_merge) {
                Ok(()) => {}
                Err(GitError::PatchDidNotApplyCleanly { .. }) => {
                    return Err(PlyError::PatchApplyConflict {
                        patch_name: name.clone(),
                    });
                }
                Err(e) => return Err(e.into()),
            }

            self.add_patch_trailer(name)?;
            newly_applied += 1;
            tracing::info!(patch = %name, "applied");
        }

        Ok(newly_applied)
    }

    /// Append the `Ply-Patch` trailer to HEAD's message, blank-line
    /// separated, unless one is already present.
    fn add_patch_trailer(&self, patch_name: &str) -> Result<()> {
        let message = self.repo.log(1, "%B", 0)?;
        if patch_trailer(&message).is_some() {
            return Ok(());
        }

        let stamped = format!(
            "{}\n\n{} {}",
            message.trim_end(),
            PATCH_TRAILER,
            patch_name
        );
        self.repo.commit(&stamped, true, true)?;
        Ok(())
    }

    /// Hard-reset the branch to the last commit before the contiguous
    /// applied run. With no patches applied, only uncommitted work is
    /// discarded.
    pub fn rollback(&self, lose_uncommitted: bool) -> Result<()> {
        if !lose_uncommitted && self.uncommitted_changes()? {
            return Err(PlyError::UncommittedChanges);
        }

        match self.applied_entries()?.last() {
            Some(oldest) => self.repo.reset(&format!("{}^", oldest.commit), true)?,
            None => self.repo.reset("HEAD", true)?,
        }
        Ok(())
    }

    pub fn uncommitted_changes(&self) -> Result<bool> {
        Ok(self.repo.uncommitted_changes()?)
    }

    /// Patch repo path recorded in the working repo's git config, if any.
    pub fn patch_repo_path(&self) -> Result<Option<PathBuf>> {
        Ok(self
            .repo
            .config_get(PATCH_REPO_CONFIG_KEY)?
            .map(PathBuf::from))
    }

    /// Record the patch repo path in git config. Linking twice is an
    /// error; re-linking the same repo and pointing at a different one
    /// are reported separately so the operator knows whether `unlink`
    /// would lose anything.
    pub fn link(&self, patch_repo_path: &Path) -> Result<()> {
        let absolute =
            fs::canonicalize(patch_repo_path).map_err(|_| PlyError::PatchRepoNotFound {
                path: patch_repo_path.to_path_buf(),
            })?;

        if let Some(existing) = self.patch_repo_path()? {
            if existing == absolute {
                return Err(PlyError::AlreadyLinkedToSame { path: existing });
            }
            return Err(PlyError::AlreadyLinkedToDifferent { path: existing });
        }

        self.repo
            .config_add(PATCH_REPO_CONFIG_KEY, &absolute.to_string_lossy())?;
        Ok(())
    }

    /// Remove the patch repo link.
    pub fn unlink(&self) -> Result<()> {
        if self.patch_repo_path()?.is_none() {
            return Err(PlyError::NoLinkedPatchRepo);
        }
        self.repo.config_unset(PATCH_REPO_CONFIG_KEY)?;
        Ok(())
    }
}

/// Extract the patch name from the first `Ply-Patch` trailer in a commit
/// message, if present.
fn patch_trailer(message: &str) -> Option<&str> {
    message
        .lines()
        .find_map(|line| line.trim().strip_prefix(PATCH_TRAILER))
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// Strip git's `NNNN-` filename prefix: `0001-Fix-bug.patch` becomes
/// `Fix-bug.patch`. Filenames without the prefix pass through unchanged.
fn strip_ordinal_prefix(filename: &str) -> &str {
    match filename.split_once('-') {
        Some((ordinal, rest))
            if !ordinal.is_empty()
                && !rest.is_empty()
                && ordinal.bytes().all(|b| b.is_ascii_digit()) =>
        {
            rest
        }
        _ => filename,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailer_found_anywhere_in_message() {
        let message = "Fix the frobnicator\n\nLong body text.\n\nPly-Patch: Fix-the-frobnicator.patch\n";
        assert_eq!(patch_trailer(message), Some("Fix-the-frobnicator.patch"));
    }

    #[test]
    fn trailer_absent() {
        assert_eq!(patch_trailer("Just a commit\n\nNo trailer here."), None);
        assert_eq!(patch_trailer(""), None);
    }

    #[test]
    fn trailer_with_empty_name_is_ignored() {
        assert_eq!(patch_trailer("msg\n\nPly-Patch:\n"), None);
        assert_eq!(patch_trailer("msg\n\nPly-Patch:   \n"), None);
    }

    #[test]
    fn ordinal_prefix_stripped() {
        assert_eq!(strip_ordinal_prefix("0001-Fix-bug.patch"), "Fix-bug.patch");
        assert_eq!(strip_ordinal_prefix("0012-a.patch"), "a.patch");
    }

    #[test]
    fn non_ordinal_names_pass_through() {
        assert_eq!(strip_ordinal_prefix("Fix-bug.patch"), "Fix-bug.patch");
        assert_eq!(strip_ordinal_prefix("noprefix.patch"), "noprefix.patch");
        assert_eq!(strip_ordinal_prefix("0001-"), "0001-");
    }
}
