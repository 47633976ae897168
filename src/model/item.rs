//! Items: one annotated raster plus its ordered regions.

use std::fmt;

use image::RgbaImage;

use super::ids::ItemId;
use super::region::Region;

/// One annotated image (or extracted video frame) in a collection.
///
/// The raster is held decoded in memory as RGBA8; persistence encodes it
/// to a PNG blob keyed by the item id.
#[derive(Clone, PartialEq)]
pub struct Item {
    /// Unique identifier, preserved across project-format round trips.
    pub id: ItemId,

    /// Decoded RGBA8 raster.
    pub image: RgbaImage,

    /// Regions in insertion order.
    pub regions: Vec<Region>,
}

impl Item {
    /// Creates an item with a fresh id.
    pub fn new(image: RgbaImage, regions: Vec<Region>) -> Self {
        Self {
            id: ItemId::new(),
            image,
            regions,
        }
    }

    /// Creates an item with an explicit id, used when loading containers
    /// that persist item identity.
    pub fn with_id(id: ItemId, image: RgbaImage, regions: Vec<Region>) -> Self {
        Self { id, image, regions }
    }

    /// The media blob name this item persists under.
    pub fn media_name(&self) -> String {
        format!("{}.png", self.id)
    }
}

// Rasters don't belong in debug output; print dimensions instead.
impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field(
                "image",
                &format_args!("{}x{} rgba8", self.image.width(), self.image.height()),
            )
            .field("regions", &self.regions)
            .finish()
    }
}
