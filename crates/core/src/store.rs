//! Durable, ordered patch storage.
//!
//! A patch store is a git repository holding patch files plus a `series`
//! manifest listing their filenames, one per line, in application order.
//! The series file is the single source of truth for ordering; patch
//! filenames carry no ordinal information.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use ply_git::Repo;

use crate::error::{PlyError, Result};

/// Manifest filename inside the patch repo.
pub const SERIES_FILE: &str = "series";

/// Dedup suffix search gives up after this many candidates.
const MAX_RENAME_ATTEMPTS: u32 = 999;

pub struct PatchStore {
    repo: Repo,
    path: PathBuf,
}

impl PatchStore {
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

    fn series_path(&self) -> PathBuf {
        self.path.join(SERIES_FILE)
    }

    /// Initialize the patch repo: `git init`, an empty `series` file if
    /// one is absent, and an initial commit. Safe to call on an already
    /// initialized store; an existing manifest is left untouched and no
    /// new commit is made.
    pub fn init(&self) -> Result<()> {
        self.repo.init()?;

        let series_path = self.series_path();
        if !series_path.exists() {
            File::create(&series_path)?;
            self.repo.add(SERIES_FILE)?;
            self.repo.commit("Initialize patch repo", false, true)?;
            tracing::info!(path = %self.path.display(), "initialized patch repo");
        }

        Ok(())
    }

    /// Move freshly generated patch files into the store, extend the
    /// series, and commit everything as a single commit.
    ///
    /// Filenames that collide with existing store entries get a `-<n>`
    /// suffix inserted before the extension. Returns the final names in
    /// input order. Atomicity is the commit primitive's: either the commit
    /// lands with all patches plus the updated series, or no commit is
    /// created.
    pub fn add_patches(&self, patch_paths: &[PathBuf], quiet: bool) -> Result<Vec<String>> {
        if patch_paths.is_empty() {
            return Err(PlyError::NoPatchesGenerated);
        }

        let series_path = self.series_path();
        let mut added = Vec::with_capacity(patch_paths.len());

        for source in patch_paths {
            let basename = source
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let name = unique_patch_name(&self.path, &basename)?;
            move_file(source, &self.path.join(&name))?;
            self.repo.add(&name)?;
            append_series_line(&series_path, &name)?;

            tracing::debug!(patch = %name, "added patch to store");
            added.push(name);
        }

        self.repo.add(SERIES_FILE)?;

        let message = if added.len() == 1 {
            "Add 1 patch".to_string()
        } else {
            format!("Add {} patches", added.len())
        };
        self.repo.commit(&message, false, quiet)?;

        tracing::info!(count = added.len(), "committed patches to store");
        Ok(added)
    }

    /// Iterate patch names in stored order.
    ///
    /// Re-reads the series file on every call, so the result reflects the
    /// latest committed state. Blank lines are skipped.
    pub fn patch_names(&self) -> Result<SeriesIter> {
        let file = File::open(self.series_path())?;
        Ok(SeriesIter {
            lines: BufReader::new(file).lines(),
        })
    }

    /// Collect the full series into a vector.
    pub fn series(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for name in self.patch_names()? {
            names.push(name?);
        }
        Ok(names)
    }

    /// Cross-check the series file against the patch files on disk.
    pub fn check(&self) -> Result<StoreCheck> {
        let series = self.series()?;

        let mut missing_file = Vec::new();
        for name in &series {
            if !self.path.join(name).exists() {
                missing_file.push(name.clone());
            }
        }

        let mut missing_entry = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".patch") && !series.contains(&name) {
                missing_entry.push(name);
            }
        }
        missing_entry.sort();

        Ok(StoreCheck {
            missing_file,
            missing_entry,
        })
    }

    pub fn uncommitted_changes(&self) -> Result<bool> {
        Ok(self.repo.uncommitted_changes()?)
    }
}

/// Result of a series/files consistency check.
#[derive(Debug, Default)]
pub struct StoreCheck {
    /// Series entries with no patch file on disk.
    pub missing_file: Vec<String>,
    /// Patch files on disk with no series entry.
    pub missing_entry: Vec<String>,
}

impl StoreCheck {
    pub fn is_ok(&self) -> bool {
        self.missing_file.is_empty() && self.missing_entry.is_empty()
    }
}

/// Lazy iterator over series entries.
pub struct SeriesIter {
    lines: io::Lines<BufReader<File>>,
}

impl Iterator for SeriesIter {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) => {
                    let name = line.trim();
                    if name.is_empty() {
                        continue;
                    }
                    return Some(Ok(name.to_string()));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Pick a destination name that does not collide with an existing store
/// entry: `fix.patch`, then `fix-1.patch`, `fix-2.patch`, and so on.
fn unique_patch_name(dir: &Path, name: &str) -> Result<String> {
    if !dir.join(name).exists() {
        return Ok(name.to_string());
    }

    let (stem, extension) = split_extension(name);
    for n in 1..=MAX_RENAME_ATTEMPTS {
        let candidate = match extension {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        if !dir.join(&candidate).exists() {
            return Ok(candidate);
        }
    }

    Err(PlyError::DuplicateFilenameExhausted {
        name: name.to_string(),
        attempts: MAX_RENAME_ATTEMPTS,
    })
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

/// Rename, falling back to copy-and-remove for cross-device moves.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

fn append_series_line(series_path: &Path, name: &str) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(series_path)?;
    writeln!(file, "{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_name_passes_through_when_free() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        assert_eq!(unique_patch_name(temp.path(), "fix.patch")?, "fix.patch");
        Ok(())
    }

    #[test]
    fn unique_name_inserts_suffix_before_extension() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("fix.patch"), "")?;
        assert_eq!(unique_patch_name(temp.path(), "fix.patch")?, "fix-1.patch");

        fs::write(temp.path().join("fix-1.patch"), "")?;
        assert_eq!(unique_patch_name(temp.path(), "fix.patch")?, "fix-2.patch");
        Ok(())
    }

    #[test]
    fn unique_name_without_extension() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("series"), "")?;
        assert_eq!(unique_patch_name(temp.path(), "series")?, "series-1");
        Ok(())
    }

    #[test]
    fn split_extension_handles_dotfiles() {
        assert_eq!(split_extension("fix.patch"), ("fix", Some("patch")));
        assert_eq!(split_extension("noext"), ("noext", None));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
        assert_eq!(split_extension("a.b.patch"), ("a.b", Some("patch")));
    }

    #[test]
    fn series_iter_skips_blank_lines() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let store = PatchStore::new(temp.path());
        fs::write(temp.path().join(SERIES_FILE), "one.patch\n\n  \ntwo.patch\n")?;

        assert_eq!(store.series()?, vec!["one.patch", "two.patch"]);
        Ok(())
    }

    #[test]
    fn series_iter_restarts_from_disk() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let store = PatchStore::new(temp.path());
        fs::write(temp.path().join(SERIES_FILE), "one.patch\n")?;
        assert_eq!(store.series()?, vec!["one.patch"]);

        fs::write(temp.path().join(SERIES_FILE), "one.patch\ntwo.patch\n")?;
        assert_eq!(store.series()?, vec!["one.patch", "two.patch"]);
        Ok(())
    }
}
