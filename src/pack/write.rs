//! Pack writing: staged container build, media sync, atomic swap.

use std::collections::BTreeSet;
use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;

use crate::error::LabelpackError;
use crate::model::{Collection, Item, ItemId};
use crate::progress::{CancelToken, ProgressFn};
use crate::raster;
use crate::sync::{self, MediaDiff, SyncStrategy};

use super::{build_progress, ItemEntry, PackFormat, MEDIA_DIR, METADATA_FILE};

/// Options for [`write_pack_with_options`].
#[derive(Clone, Default)]
pub struct WriteOptions {
    /// On-disk format to produce.
    pub format: PackFormat,

    /// Forces a media sync strategy instead of letting the diff decide.
    pub strategy: Option<SyncStrategy>,

    /// Cooperative cancellation; polled before each copy and encode.
    pub cancel: CancelToken,

    /// Invoked with the overall fraction as media files land.
    pub on_progress: Option<ProgressFn>,
}

impl fmt::Debug for WriteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOptions")
            .field("format", &self.format)
            .field("strategy", &self.strategy)
            .field("cancel", &self.cancel)
            .field("on_progress", &self.on_progress.as_ref().map(|_| "Fn"))
            .finish()
    }
}

/// What a save actually did.
#[derive(Clone, Debug)]
pub struct WriteReport {
    pub format: PackFormat,

    /// Strategy the media sync ran with.
    pub strategy: SyncStrategy,

    /// Media blobs freshly encoded into the container.
    pub written: usize,

    /// Media blobs reused byte-for-byte from the previous container.
    pub carried_over: usize,

    /// Stale media names absent from the new container.
    pub removed: usize,

    /// Items left out of the written container, in collection order.
    pub skipped: Vec<SkippedItem>,
}

/// An item left out of a written pack.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedItem {
    /// Position of the item in the collection.
    pub index: usize,

    pub id: ItemId,

    /// Why the item was skipped.
    pub message: String,
}

/// Writes a pack in project format with default options.
pub fn write_pack(path: &Path, collection: &Collection) -> Result<WriteReport, LabelpackError> {
    write_pack_with_options(path, collection, &WriteOptions::default())
}

/// Writes a collection to a container directory.
///
/// The container is assembled in a sibling staging directory and
/// swapped into place only once fully written, so an interrupted or
/// cancelled save never leaves a half-written pack at `path`. Media
/// blobs already present in the previous container are carried over
/// byte-for-byte when the diff favors it; everything else is encoded
/// fresh, in parallel. Items the container cannot represent, whether
/// the raster fails to encode or a region carries non-finite
/// coordinates, are skipped and reported rather than failing the save.
pub fn write_pack_with_options(
    path: &Path,
    collection: &Collection,
    options: &WriteOptions,
) -> Result<WriteReport, LabelpackError> {
    let mut early_skips = Vec::new();
    let mut retained: Vec<(usize, &Item)> = Vec::new();
    for (index, item) in collection.items.iter().enumerate() {
        if !options.format.retains(item) {
            continue;
        }
        // serde_json writes non-finite floats as null, which the
        // loader rejects, so such items never reach the wire.
        if let Some(region) = item.regions.iter().find(|r| !r.bounds.is_finite()) {
            let skip = SkippedItem {
                index,
                id: item.id,
                message: format!("region '{}' has non-finite bounds", region.label),
            };
            warn!("skipping item #{} ({}): {}", skip.index, skip.id, skip.message);
            early_skips.push(skip);
            continue;
        }
        retained.push((index, item));
    }

    let desired: BTreeSet<String> = retained.iter().map(|(_, item)| item.media_name()).collect();
    let prior = sync::media_file_names(&path.join(MEDIA_DIR))?;
    let diff = MediaDiff::between(&prior, &desired);
    let strategy = options.strategy.unwrap_or_else(|| diff.choose_strategy());
    debug!(
        "saving {} items to {} ({} format, {strategy:?} sync: {} common, {} added, {} removed)",
        retained.len(),
        path.display(),
        options.format.as_str(),
        diff.common.len(),
        diff.added.len(),
        diff.removed.len(),
    );

    let staging = sibling(path, ".staging");
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(staging.join(MEDIA_DIR))?;

    let mut report = match stage_container(path, &staging, &retained, &diff, strategy, options) {
        Ok(report) => report,
        Err(err) => {
            let _ = fs::remove_dir_all(&staging);
            return Err(err);
        }
    };

    // Last cancellation point before the swap commits the new container.
    if let Err(err) = options.cancel.check() {
        let _ = fs::remove_dir_all(&staging);
        return Err(err);
    }
    if let Err(err) = swap_into_place(&staging, path) {
        let _ = fs::remove_dir_all(&staging);
        return Err(err);
    }

    report.skipped.extend(early_skips);
    report.skipped.sort_by_key(|s| s.index);
    Ok(report)
}

fn stage_container(
    target: &Path,
    staging: &Path,
    retained: &[(usize, &Item)],
    diff: &MediaDiff,
    strategy: SyncStrategy,
    options: &WriteOptions,
) -> Result<WriteReport, LabelpackError> {
    let carry: Vec<String> = match strategy {
        SyncStrategy::Incremental => diff.common.iter().cloned().collect(),
        SyncStrategy::Rebuild => Vec::new(),
    };
    let carry_set: BTreeSet<&str> = carry.iter().map(String::as_str).collect();
    let to_encode: Vec<(usize, &Item)> = retained
        .iter()
        .filter(|(_, item)| !carry_set.contains(item.media_name().as_str()))
        .copied()
        .collect();

    let root = build_progress(
        (carry.len() + to_encode.len()) as u64,
        options.on_progress.as_ref(),
    );
    let copy_phase = root.child(carry.len() as u64, carry.len() as u64);
    let encode_phase = root.child(to_encode.len() as u64, to_encode.len() as u64);

    let prior_media = target.join(MEDIA_DIR);
    let staged_media = staging.join(MEDIA_DIR);

    let copied: Vec<Result<(), LabelpackError>> = carry
        .par_iter()
        .map(|name| {
            options.cancel.check()?;
            fs::copy(prior_media.join(name), staged_media.join(name))?;
            copy_phase.advance(1);
            Ok(())
        })
        .collect();
    for result in copied {
        result?;
    }
    copy_phase.complete();

    let encoded: Vec<Result<Option<SkippedItem>, LabelpackError>> = to_encode
        .par_iter()
        .map(|&(index, item)| {
            options.cancel.check()?;
            match raster::encode_png(item.id, &item.image) {
                Ok(blob) => {
                    fs::write(staged_media.join(item.media_name()), blob)?;
                    encode_phase.advance(1);
                    Ok(None)
                }
                Err(LabelpackError::MediaEncode { id, message }) => {
                    encode_phase.advance(1);
                    Ok(Some(SkippedItem { index, id, message }))
                }
                Err(other) => Err(other),
            }
        })
        .collect();

    let mut skipped = Vec::new();
    for result in encoded {
        if let Some(skip) = result? {
            warn!(
                "skipping item #{} ({}): {}",
                skip.index, skip.id, skip.message
            );
            skipped.push(skip);
        }
    }
    encode_phase.complete();

    // Skipped items are left out of the metadata as well, so the written
    // container never references a blob that is not there.
    let skipped_ids: BTreeSet<ItemId> = skipped.iter().map(|s| s.id).collect();
    let entries: Vec<ItemEntry> = retained
        .iter()
        .filter(|(_, item)| !skipped_ids.contains(&item.id))
        .map(|(_, item)| ItemEntry::from_item(item, options.format))
        .collect();

    let metadata_path = staging.join(METADATA_FILE);
    let file = File::create(&metadata_path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &entries).map_err(|source| {
        LabelpackError::MetadataWrite {
            path: metadata_path,
            source,
        }
    })?;
    root.complete();

    Ok(WriteReport {
        format: options.format,
        strategy,
        written: to_encode.len() - skipped.len(),
        carried_over: carry.len(),
        removed: diff.removed.len(),
        skipped,
    })
}

/// Promotes a fully staged container to the target path. An existing
/// target is parked as a sibling first so a failed promotion can put
/// it back.
fn swap_into_place(staging: &Path, target: &Path) -> Result<(), LabelpackError> {
    if target.exists() {
        let doomed = sibling(target, ".replaced");
        if doomed.exists() {
            fs::remove_dir_all(&doomed)?;
        }
        fs::rename(target, &doomed)?;
        if let Err(err) = fs::rename(staging, target) {
            let _ = fs::rename(&doomed, target);
            return Err(err.into());
        }
        fs::remove_dir_all(&doomed)?;
    } else {
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::rename(staging, target)?;
    }
    Ok(())
}

fn sibling(target: &Path, suffix: &str) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
