//! Pack reading: structural checks, metadata parse, parallel blob decode.

use std::fmt;
use std::fs;
use std::path::{Component, Path};

use log::warn;
use rayon::prelude::*;

use crate::error::LabelpackError;
use crate::model::{Collection, Item, ItemId};
use crate::progress::{CancelToken, ProgressFn};
use crate::raster;

use super::{build_progress, ItemEntry, MEDIA_DIR, METADATA_FILE};

/// Options for [`read_pack_with_options`].
#[derive(Clone, Default)]
pub struct ReadOptions {
    /// Cooperative cancellation; polled before each blob decode.
    pub cancel: CancelToken,

    /// Invoked with the overall fraction as entries resolve.
    pub on_progress: Option<ProgressFn>,
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("cancel", &self.cancel)
            .field("on_progress", &self.on_progress.as_ref().map(|_| "Fn"))
            .finish()
    }
}

/// A loaded collection plus what the loader had to drop to produce it.
#[derive(Clone, Debug)]
pub struct LoadedPack {
    pub collection: Collection,

    /// Metadata entries that did not make it into the collection, in
    /// metadata order.
    pub dropped: Vec<DroppedEntry>,
}

/// One metadata entry the loader dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct DroppedEntry {
    /// Position of the entry in the metadata array.
    pub index: usize,

    /// Persisted item id, when the entry carried one.
    pub id: Option<ItemId>,

    /// The entry's media path, verbatim.
    pub media_path: String,

    pub reason: DropReason,
}

/// Why a metadata entry was dropped.
#[derive(Clone, Debug, PartialEq)]
pub enum DropReason {
    /// No blob at the entry's media path.
    MissingBlob,
    /// The media path points outside the container.
    EscapesContainer,
    /// The blob exists but does not decode as PNG.
    Undecodable { message: String },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingBlob => write!(f, "media blob missing"),
            DropReason::EscapesContainer => write!(f, "media path escapes the container"),
            DropReason::Undecodable { message } => write!(f, "media blob undecodable: {message}"),
        }
    }
}

/// Reads a pack with default options.
pub fn read_pack(path: &Path) -> Result<LoadedPack, LabelpackError> {
    read_pack_with_options(path, &ReadOptions::default())
}

/// Reads a pack from a container directory.
///
/// Accepts both wire formats: entries without an `id` (export output)
/// get a fresh one. Blob decode fans out in parallel; collection order
/// always follows the metadata array. Cancellation is all-or-nothing:
/// a cancelled read returns [`Cancelled`](LabelpackError::Cancelled)
/// and no partial collection.
pub fn read_pack_with_options(
    path: &Path,
    options: &ReadOptions,
) -> Result<LoadedPack, LabelpackError> {
    let metadata_path = path.join(METADATA_FILE);
    let media_dir = path.join(MEDIA_DIR);

    if !metadata_path.is_file() {
        return Err(LabelpackError::CorruptContainer {
            path: path.to_path_buf(),
            message: format!("missing {METADATA_FILE}"),
        });
    }
    if !media_dir.is_dir() {
        return Err(LabelpackError::CorruptContainer {
            path: path.to_path_buf(),
            message: format!("missing {MEDIA_DIR}/ directory"),
        });
    }

    let metadata = fs::read_to_string(&metadata_path)?;
    let entries: Vec<ItemEntry> =
        serde_json::from_str(&metadata).map_err(|source| LabelpackError::MetadataParse {
            path: metadata_path,
            source,
        })?;

    let progress = build_progress(entries.len() as u64, options.on_progress.as_ref());

    // Indexed parallel fan-out: the collected Vec keeps metadata order.
    let outcomes: Vec<Result<EntryOutcome, LabelpackError>> = entries
        .into_par_iter()
        .enumerate()
        .map(|(index, entry)| {
            options.cancel.check()?;
            let outcome = resolve_entry(path, index, entry)?;
            progress.advance(1);
            Ok(outcome)
        })
        .collect();

    let mut items = Vec::new();
    let mut dropped = Vec::new();
    for outcome in outcomes {
        match outcome? {
            EntryOutcome::Loaded(item) => items.push(item),
            EntryOutcome::Dropped(entry) => {
                warn!(
                    "dropping entry #{} ({}): {}",
                    entry.index, entry.media_path, entry.reason
                );
                dropped.push(entry);
            }
        }
    }
    progress.complete();

    Ok(LoadedPack {
        collection: Collection::from_items(items),
        dropped,
    })
}

enum EntryOutcome {
    Loaded(Item),
    Dropped(DroppedEntry),
}

fn resolve_entry(
    container: &Path,
    index: usize,
    entry: ItemEntry,
) -> Result<EntryOutcome, LabelpackError> {
    let ItemEntry {
        id,
        image: media_path,
        annotations,
    } = entry;

    let Some(relative) = relative_blob_path(&media_path) else {
        return Ok(EntryOutcome::Dropped(DroppedEntry {
            index,
            id,
            media_path,
            reason: DropReason::EscapesContainer,
        }));
    };

    let blob_path = container.join(relative);
    let bytes = match fs::read(&blob_path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(EntryOutcome::Dropped(DroppedEntry {
                index,
                id,
                media_path,
                reason: DropReason::MissingBlob,
            }));
        }
        Err(err) => return Err(err.into()),
    };

    let raster = match raster::decode_png(&media_path, &bytes) {
        Ok(raster) => raster,
        Err(LabelpackError::MediaDecode { message, .. }) => {
            return Ok(EntryOutcome::Dropped(DroppedEntry {
                index,
                id,
                media_path,
                reason: DropReason::Undecodable { message },
            }));
        }
        Err(other) => return Err(other),
    };

    let regions = annotations.into_iter().map(|r| r.into_region()).collect();
    let item = match id {
        Some(id) => Item::with_id(id, raster, regions),
        None => Item::new(raster, regions),
    };
    Ok(EntryOutcome::Loaded(item))
}

/// Accepts only non-empty, purely relative paths: no root, no prefix,
/// no `..`, so a blob reference can never reach outside the container.
fn relative_blob_path(raw: &str) -> Option<&Path> {
    if raw.is_empty() {
        return None;
    }
    let path = Path::new(raw);
    path.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use uuid::Uuid;

    fn png_blob(seed: u8) -> Vec<u8> {
        let raster = RgbaImage::from_pixel(2, 2, Rgba([seed, seed, seed, 255]));
        raster::encode_png(ItemId::new(), &raster).unwrap()
    }

    fn fixture_pack(root: &Path, metadata: &str, blobs: &[(&str, &[u8])]) {
        fs::create_dir_all(root.join(MEDIA_DIR)).unwrap();
        fs::write(root.join(METADATA_FILE), metadata).unwrap();
        for (name, bytes) in blobs {
            fs::write(root.join(MEDIA_DIR).join(name), bytes).unwrap();
        }
    }

    fn entry_json(id: Option<Uuid>, blob: &str) -> String {
        match id {
            Some(id) => format!(
                r#"{{"id":"{id}","image":"{MEDIA_DIR}/{blob}","annotations":[]}}"#
            ),
            None => format!(r#"{{"image":"{MEDIA_DIR}/{blob}","annotations":[]}}"#),
        }
    }

    #[test]
    fn test_missing_metadata_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(MEDIA_DIR)).unwrap();
        let err = read_pack(dir.path()).unwrap_err();
        match err {
            LabelpackError::CorruptContainer { message, .. } => {
                assert!(message.contains(METADATA_FILE));
            }
            other => panic!("expected CorruptContainer, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_media_dir_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(METADATA_FILE), "[]").unwrap();
        let err = read_pack(dir.path()).unwrap_err();
        assert!(matches!(err, LabelpackError::CorruptContainer { .. }));
    }

    #[test]
    fn test_malformed_metadata_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fixture_pack(dir.path(), "this is not json", &[]);
        let err = read_pack(dir.path()).unwrap_err();
        assert!(matches!(err, LabelpackError::MetadataParse { .. }));
    }

    #[test]
    fn test_missing_blob_dropped_order_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let metadata = format!(
            "[{},{},{}]",
            entry_json(Some(a), "a.png"),
            entry_json(Some(b), "b.png"),
            entry_json(Some(c), "c.png"),
        );
        let blob_a = png_blob(1);
        let blob_c = png_blob(3);
        fixture_pack(
            dir.path(),
            &metadata,
            &[("a.png", &blob_a), ("c.png", &blob_c)],
        );

        let loaded = read_pack(dir.path()).unwrap();
        assert_eq!(loaded.collection.len(), 2);
        assert_eq!(loaded.collection.items[0].id, ItemId::from_uuid(a));
        assert_eq!(loaded.collection.items[1].id, ItemId::from_uuid(c));
        assert_eq!(loaded.dropped.len(), 1);
        assert_eq!(loaded.dropped[0].index, 1);
        assert_eq!(loaded.dropped[0].id, Some(ItemId::from_uuid(b)));
        assert_eq!(loaded.dropped[0].reason, DropReason::MissingBlob);
    }

    #[test]
    fn test_escaping_paths_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = format!(
            r#"[{{"image":"../outside.png","annotations":[]}},{{"image":"/etc/shadow.png","annotations":[]}},{}]"#,
            entry_json(None, "ok.png"),
        );
        let ok = png_blob(7);
        fixture_pack(dir.path(), &metadata, &[("ok.png", &ok)]);

        let loaded = read_pack(dir.path()).unwrap();
        assert_eq!(loaded.collection.len(), 1);
        assert_eq!(loaded.dropped.len(), 2);
        assert!(loaded
            .dropped
            .iter()
            .all(|d| d.reason == DropReason::EscapesContainer));
    }

    #[test]
    fn test_undecodable_blob_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = format!("[{}]", entry_json(None, "junk.png"));
        fixture_pack(dir.path(), &metadata, &[("junk.png", b"garbage bytes")]);

        let loaded = read_pack(dir.path()).unwrap();
        assert!(loaded.collection.is_empty());
        assert_eq!(loaded.dropped.len(), 1);
        assert!(matches!(
            loaded.dropped[0].reason,
            DropReason::Undecodable { .. }
        ));
    }

    #[test]
    fn test_entry_without_id_gets_a_fresh_one() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = format!("[{}]", entry_json(None, "a.png"));
        let blob = png_blob(9);
        fixture_pack(dir.path(), &metadata, &[("a.png", &blob)]);

        let first = read_pack(dir.path()).unwrap();
        let second = read_pack(dir.path()).unwrap();
        assert_ne!(
            first.collection.items[0].id,
            second.collection.items[0].id
        );
    }

    #[test]
    fn test_region_ids_are_regenerated_per_read() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let metadata = format!(
            r#"[{{"id":"{id}","image":"{MEDIA_DIR}/a.png","annotations":[{{"label":"cat","x":1.0,"y":2.0,"width":3.0,"height":4.0}}]}}]"#
        );
        let blob = png_blob(5);
        fixture_pack(dir.path(), &metadata, &[("a.png", &blob)]);

        let first = read_pack(dir.path()).unwrap();
        let second = read_pack(dir.path()).unwrap();
        let r1 = &first.collection.items[0].regions[0];
        let r2 = &second.collection.items[0].regions[0];
        assert_eq!(r1.label, "cat");
        assert_eq!(r1.bounds, r2.bounds);
        assert_ne!(r1.id, r2.id);
        // Item identity, by contrast, is stable.
        assert_eq!(first.collection.items[0].id, second.collection.items[0].id);
    }

    #[test]
    fn test_cancelled_read_returns_no_partial_result() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = format!("[{}]", entry_json(None, "a.png"));
        let blob = png_blob(2);
        fixture_pack(dir.path(), &metadata, &[("a.png", &blob)]);

        let options = ReadOptions::default();
        options.cancel.cancel();
        let err = read_pack_with_options(dir.path(), &options).unwrap_err();
        assert!(matches!(err, LabelpackError::Cancelled));
    }

    #[test]
    fn test_unknown_fields_and_compact_json_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = format!(
            r#"[{{"image":"{MEDIA_DIR}/a.png","annotations":[{{"label":"cat","x":1,"y":2,"width":3,"height":4,"reviewer":"pat"}}],"starred":true}}]"#
        );
        let blob = png_blob(8);
        fixture_pack(dir.path(), &metadata, &[("a.png", &blob)]);

        let loaded = read_pack(dir.path()).unwrap();
        assert_eq!(loaded.collection.region_count(), 1);
        assert_eq!(loaded.collection.items[0].regions[0].bounds.width, 3.0);
    }
}
