//! Labeled bounding-box regions in image-pixel space.

use super::ids::RegionId;

/// An axis-aligned box in image-pixel space, addressed by its center.
///
/// `(x, y)` locate the center of the box; the image origin is the
/// top-left corner with y growing downward, as in the raster itself.
/// All four fields may be fractional.
///
/// Note: construction does NOT reject zero or negative extents. Malformed
/// boxes can be represented so that filtering and reporting can see them
/// rather than panicking during parsing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RegionBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RegionBox {
    /// Creates a box from a center point and extents.
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the area of the box.
    ///
    /// May be negative if the box is malformed.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns true if all four fields are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Returns the smallest square sharing this box's center that contains
    /// it (side length `max(width, height)`).
    ///
    /// This is the crop window used for square thumbnails.
    #[inline]
    pub fn square_container(&self) -> Self {
        let side = self.width.max(self.height);
        Self::new(self.x, self.y, side, side)
    }
}

/// One labeled region on an item.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// Unique identifier, assigned at creation and never reassigned.
    pub id: RegionId,

    /// Display label. Arbitrary UTF-8, mutable, not unique.
    pub label: String,

    /// Box geometry in image-pixel space (center-origin).
    pub bounds: RegionBox,

    /// Display-only visibility flag. Never persisted; loading a container
    /// yields visible regions.
    pub hidden: bool,
}

impl Region {
    /// Creates a visible region with a fresh id.
    pub fn new(label: impl Into<String>, bounds: RegionBox) -> Self {
        Self {
            id: RegionId::new(),
            label: label.into(),
            bounds,
            hidden: false,
        }
    }
}
