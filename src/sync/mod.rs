//! Media directory diffing and the re-save strategy choice.
//!
//! A re-save compares the blob names the collection wants against the
//! names already in the container's media directory. The resulting
//! [`MediaDiff`] drives the strategy choice: carry unchanged blobs over
//! and touch only the churn, or rebuild the directory from scratch.
//! The choice is a cost heuristic; both strategies must write the same
//! container.

use std::collections::BTreeSet;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::LabelpackError;

/// How a re-save brings the media directory in line with the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Carry unchanged blobs over byte-for-byte; encode only additions.
    Incremental,
    /// Encode every retained item from scratch.
    Rebuild,
}

/// The name-set difference between the media a container holds and the
/// media the collection wants on the next save.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaDiff {
    /// Names present on both sides (carry-over candidates).
    pub common: BTreeSet<String>,
    /// Names the collection wants that the container lacks.
    pub added: BTreeSet<String>,
    /// Names the container holds that the collection no longer wants.
    pub removed: BTreeSet<String>,
}

impl MediaDiff {
    /// Computes the diff between the blob names in the prior container
    /// (`old`) and the names the collection will persist under (`new`).
    pub fn between(old: &BTreeSet<String>, new: &BTreeSet<String>) -> Self {
        Self {
            common: old.intersection(new).cloned().collect(),
            added: new.difference(old).cloned().collect(),
            removed: old.difference(new).cloned().collect(),
        }
    }

    /// Picks the cheaper strategy for this diff: incremental unless more
    /// blobs are being removed than are being added or kept.
    ///
    /// Heuristic only; correctness never depends on which side is taken.
    pub fn choose_strategy(&self) -> SyncStrategy {
        if self.removed.len() <= self.added.len() || self.removed.len() < self.common.len() {
            SyncStrategy::Incremental
        } else {
            SyncStrategy::Rebuild
        }
    }

    /// Returns true when the name sets already agree.
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Enumerates the PNG blob names in a media directory (top level only;
/// anything nested or non-PNG is not media). A missing directory reads
/// as empty, which makes a fresh save look like an all-added diff.
pub fn media_file_names(dir: &Path) -> Result<BTreeSet<String>, LabelpackError> {
    let mut names = BTreeSet::new();
    if !dir.is_dir() {
        return Ok(names);
    }
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.insert(name.to_owned());
            }
        }
    }
    Ok(names)
}
