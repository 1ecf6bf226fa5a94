//! Patch-series management over git.
//!
//! This crate extracts contiguous commit ranges from a working repository
//! into ordered patch files, stores them durably in a separate patch
//! repository alongside a `series` manifest, and reapplies the series onto
//! a fresh branch later. Applied patches are recorded as `Ply-Patch`
//! trailers in commit messages, so "already applied" is a durable fact
//! recomputed from history rather than in-memory state, and restore is
//! idempotent and resumable after conflicts.

pub mod error;
pub mod store;
pub mod working;

pub use error::{PlyError, Result};
pub use store::{PatchStore, SeriesIter, StoreCheck, SERIES_FILE};
pub use working::{WorkingRepo, PATCH_REPO_CONFIG_KEY, PATCH_TRAILER};

/// Coarse working-repo status derived from the applied-patch ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    NoPatchesApplied,
    AllPatchesApplied,
}

/// Orchestrates one working repo / patch repo pair.
///
/// Both paths are explicit constructor arguments; there are no
/// process-wide defaults. Operations are synchronous and must not run
/// concurrently against the same repository pair.
pub struct Ply {
    working: WorkingRepo,
    store: PatchStore,
}

impl Ply {
    pub fn new(
        working_dir: impl Into<std::path::PathBuf>,
        patch_repo_dir: impl Into<std::path::PathBuf>,
    ) -> Self {
        Self {
            working: WorkingRepo::new(working_dir),
            store: PatchStore::new(patch_repo_dir),
        }
    }

    pub fn working(&self) -> &WorkingRepo {
        &self.working
    }

    pub fn store(&self) -> &PatchStore {
        &self.store
    }

    /// Extract `(since, HEAD]` from the working repo into the patch store
    /// as a single commit. Returns the stored patch names in order.
    ///
    /// An empty range fails fast without touching the store.
    pub fn save(&self, since: &str, quiet: bool) -> Result<Vec<String>> {
        if self.working.uncommitted_changes()? || self.store.uncommitted_changes()? {
            return Err(PlyError::UncommittedChanges);
        }

        let patch_paths = self.working.format_patches(since)?;
        self.store.add_patches(&patch_paths, quiet)
    }

    /// Apply the stored series onto the working repo's current branch,
    /// skipping patches the ledger already records. Returns how many
    /// patches were newly applied; zero means the branch was already up
    /// to date, which is what makes repeated restores idempotent.
    pub fn restore(&self, three_way_merge: bool) -> Result<usize> {
        if self.working.uncommitted_changes()? {
            return Err(PlyError::UncommittedChanges);
        }

        let series = self.store.series()?;
        self.working
            .apply_patches(self.store.path(), &series, three_way_merge)
    }

    /// Names of patches already applied to the working branch, HEAD-most
    /// first.
    pub fn applied_patches(&self) -> Result<Vec<String>> {
        self.working.applied_patches()
    }

    /// Initialize the patch repository.
    pub fn init_patch_repo(&self) -> Result<()> {
        self.store.init()
    }

    pub fn status(&self) -> Result<Status> {
        if self.applied_patches()?.is_empty() {
            Ok(Status::NoPatchesApplied)
        } else {
            Ok(Status::AllPatchesApplied)
        }
    }
}
