//! The in-memory annotation model.
//!
//! This module defines the value types a labeling session works on: an
//! ordered [`Collection`] of [`Item`]s, each holding an RGBA raster and
//! ordered labeled [`Region`]s, plus the derived label queries, the
//! snapshot [`History`], and the display [`LabelPalette`].
//!
//! # Design Principles
//!
//! 1. **Values, not graphs**: collections are plain owned data compared
//!    by value. The single mutation is whole-collection replacement,
//!    which keeps undo/redo a matter of stacking snapshots.
//!
//! 2. **Type-safe identity**: items and regions carry UUID newtypes so
//!    the two kinds of id cannot be mixed up at compile time.
//!
//! 3. **Permissive construction**: degenerate geometry is representable
//!    (and reportable) rather than rejected at construction time.
//!
//! # Example
//!
//! ```
//! use labelpack::model::{Collection, History, Item, Region, RegionBox};
//! use image::{Rgba, RgbaImage};
//!
//! let raster = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 255]));
//! let region = Region::new("cat", RegionBox::new(32.0, 32.0, 16.0, 12.0));
//! let collection = Collection::from_items(vec![Item::new(raster, vec![region])]);
//!
//! let mut history = History::new(collection.clone());
//! history.replace(collection.with_label_renamed("cat", "tiger"));
//! assert_eq!(history.current().labels(), vec!["tiger"]);
//! assert!(history.undo());
//! assert_eq!(history.current().labels(), vec!["cat"]);
//! ```

mod collection;
mod history;
mod ids;
mod item;
mod palette;
mod region;

// Re-export core types for convenient access
pub use collection::Collection;
pub use history::History;
pub use ids::{ItemId, RegionId};
pub use item::Item;
pub use palette::{Color, LabelPalette};
pub use region::{Region, RegionBox};
