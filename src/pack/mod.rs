//! The pack container codec.
//!
//! A pack is a directory with a fixed layout:
//!
//! ```text
//! MyProject/
//! ├── annotations.json      one entry per item, in collection order
//! └── Media/
//!     ├── <item-id>.png     lossless RGBA8 blob per item
//!     └── ...
//! ```
//!
//! Two wire formats share this layout. The *project* format persists
//! item ids and every item, including ones without regions; it is the
//! round-trip format. The *export* format drops the ids and omits
//! empty-region items entirely, for downstream consumption.
//!
//! Reading tolerates compact or pretty JSON, any field order, and
//! unknown fields. Entries whose media blob is missing, escapes the
//! container, or fails to decode are dropped (with a report), never
//! fatal; a missing metadata file or media directory is.

mod read;
mod write;

pub use read::{read_pack, read_pack_with_options, DropReason, DroppedEntry, LoadedPack, ReadOptions};
pub use write::{write_pack, write_pack_with_options, SkippedItem, WriteOptions, WriteReport};

use serde::{Deserialize, Serialize};

use crate::model::{Item, ItemId, Region, RegionBox};
use crate::progress::{Progress, ProgressFn};

/// Metadata file name inside a pack.
pub const METADATA_FILE: &str = "annotations.json";

/// Media directory name inside a pack.
pub const MEDIA_DIR: &str = "Media";

/// Which wire format a pack is written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PackFormat {
    /// Round-trip format: item ids persisted, empty-region items kept.
    #[default]
    Project,
    /// Hand-off format: no item ids, empty-region items omitted.
    Export,
}

impl PackFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            PackFormat::Project => "project",
            PackFormat::Export => "export",
        }
    }

    /// Whether this format persists the given item at all.
    pub(crate) fn retains(self, item: &Item) -> bool {
        match self {
            PackFormat::Project => true,
            PackFormat::Export => !item.regions.is_empty(),
        }
    }
}

// ============================================================================
// Wire schema
// ============================================================================

/// One metadata entry as it appears in `annotations.json`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ItemEntry {
    /// Item identity; absent in export-format output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<ItemId>,

    /// Media blob path relative to the container root.
    pub(crate) image: String,

    /// Region descriptors in region order.
    pub(crate) annotations: Vec<RegionEntry>,
}

impl ItemEntry {
    pub(crate) fn from_item(item: &Item, format: PackFormat) -> Self {
        Self {
            id: match format {
                PackFormat::Project => Some(item.id),
                PackFormat::Export => None,
            },
            image: format!("{MEDIA_DIR}/{}", item.media_name()),
            annotations: item.regions.iter().map(RegionEntry::from_region).collect(),
        }
    }
}

/// One region descriptor: label plus center-origin geometry. Region ids
/// and the hidden flag are not part of the wire schema.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RegionEntry {
    pub(crate) label: String,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl RegionEntry {
    pub(crate) fn from_region(region: &Region) -> Self {
        Self {
            label: region.label.clone(),
            x: region.bounds.x,
            y: region.bounds.y,
            width: region.bounds.width,
            height: region.bounds.height,
        }
    }

    /// Rehydrates a model region. Wire entries carry no id, so every
    /// decode mints a fresh one.
    pub(crate) fn into_region(self) -> Region {
        Region::new(
            self.label,
            RegionBox::new(self.x, self.y, self.width, self.height),
        )
    }
}

/// Builds the internal progress root for a batch operation, wiring in
/// the caller's observer when one was supplied.
pub(crate) fn build_progress(total: u64, observer: Option<&ProgressFn>) -> Progress {
    match observer {
        Some(f) => {
            let f = f.clone();
            Progress::with_observer(total, move |fraction| f(fraction))
        }
        None => Progress::new(total),
    }
}
