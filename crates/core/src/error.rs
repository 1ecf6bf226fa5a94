//! Error taxonomy for the patch lifecycle.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, PlyError>;

/// Fatal conditions surfaced by save/restore.
///
/// Every variant carries which patch or which step failed so the operator
/// can intervene; nothing is swallowed or retried internally.
#[derive(Debug, thiserror::Error)]
pub enum PlyError {
    /// `format-patch` produced no files: `since` is not an ancestor of
    /// HEAD, or the range is empty.
    #[error("no patches generated from range ({since}, HEAD]")]
    EmptyPatchRange { since: String },

    /// `add_patches` was handed an empty file list. Callers normally catch
    /// the empty range upstream via `EmptyPatchRange`.
    #[error("no patch files to add")]
    NoPatchesGenerated,

    /// A patch failed to apply even with the requested merge strategy.
    /// Patches applied earlier in the same run stay committed and stamped,
    /// so rerunning restore resumes past them once the conflict is fixed.
    #[error(
        "patch '{patch_name}' did not apply cleanly; fix the conflicts, \
         run `git am --continue`, add a 'Ply-Patch: {patch_name}' trailer \
         to the commit message, then rerun restore"
    )]
    PatchApplyConflict { patch_name: String },

    #[error("no free name for '{name}' after {attempts} rename attempts")]
    DuplicateFilenameExhausted { name: String, attempts: u32 },

    #[error("series lists '{name}' but the patch repo has no such file")]
    ManifestIntegrity { name: String },

    #[error("working repo is not linked to a patch repo; run `ply link <path>`")]
    NoLinkedPatchRepo,

    #[error("already linked to patch repo at {}", path.display())]
    AlreadyLinkedToSame { path: PathBuf },

    #[error(
        "already linked to a different patch repo at {}; run `ply unlink` first",
        path.display()
    )]
    AlreadyLinkedToDifferent { path: PathBuf },

    #[error("no patch repo found at {}", path.display())]
    PatchRepoNotFound { path: PathBuf },

    #[error("uncommitted changes present; commit or discard them first")]
    UncommittedChanges,

    #[error(transparent)]
    Git(#[from] ply_git::GitError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
