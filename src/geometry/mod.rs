//! Coordinate conversions between image, view, and detection space.
//!
//! Three coordinate conventions meet here:
//!
//! - **Image space**: pixels, origin at the top-left of the raster,
//!   y growing downward. [`RegionBox`] centers live in this space.
//! - **View space**: points in a viewport, origin at the bottom-left,
//!   y growing upward. The image is letterboxed into the viewport:
//!   scaled uniformly to fit, centered along the slack axis.
//! - **Detection space**: the unit square, origin at the bottom-left,
//!   y growing upward, as emitted by ML detectors.
//!
//! Every function is pure. Degenerate sizes (zero, negative, or
//! non-finite extents) fail with
//! [`InvalidGeometry`](LabelpackError::InvalidGeometry) instead of
//! producing NaN geometry.

use crate::error::LabelpackError;
use crate::model::{Region, RegionBox};

// ============================================================================
// Sizes
// ============================================================================

/// Image dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

impl PixelSize {
    /// Creates a size from explicit extents.
    #[inline]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Dimensions of a decoded raster.
    pub fn of_image(image: &image::RgbaImage) -> Self {
        Self::new(f64::from(image.width()), f64::from(image.height()))
    }

    /// Width over height.
    #[inline]
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Returns true when either extent is zero, negative, or non-finite.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0
            && self.height > 0.0
            && self.width.is_finite()
            && self.height.is_finite())
    }
}

/// Viewport dimensions in view points.
///
/// A separate type from [`PixelSize`] so image and viewport extents
/// cannot be swapped at a call site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    /// Creates a size from explicit extents.
    #[inline]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width over height.
    #[inline]
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Returns true when either extent is zero, negative, or non-finite.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0
            && self.height > 0.0
            && self.width.is_finite()
            && self.height.is_finite())
    }
}

// ============================================================================
// Letterbox fit
// ============================================================================

/// The uniform scale and centering margins that fit an image into a
/// viewport without cropping or distortion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Letterbox {
    /// Image pixels to view points.
    pub scale: f64,
    /// Horizontal slack on each side, in view points.
    pub margin_x: f64,
    /// Vertical slack on each side, in view points.
    pub margin_y: f64,
}

/// Computes the letterbox fit of `image` into `viewport`.
///
/// A wider-than-viewport image fits to width and centers vertically;
/// a taller one fits to height and centers horizontally. Exactly one
/// margin is nonzero unless the aspects match.
pub fn letterbox(image: PixelSize, viewport: ViewportSize) -> Result<Letterbox, LabelpackError> {
    check_sizes(image, viewport)?;
    if image.aspect() >= viewport.aspect() {
        let scale = viewport.width / image.width;
        Ok(Letterbox {
            scale,
            margin_x: 0.0,
            margin_y: (viewport.height - image.height * scale) / 2.0,
        })
    } else {
        let scale = viewport.height / image.height;
        Ok(Letterbox {
            scale,
            margin_x: (viewport.width - image.width * scale) / 2.0,
            margin_y: 0.0,
        })
    }
}

fn check_sizes(image: PixelSize, viewport: ViewportSize) -> Result<(), LabelpackError> {
    if image.is_degenerate() {
        return Err(LabelpackError::InvalidGeometry {
            message: format!(
                "image size {}x{} must be positive and finite",
                image.width, image.height
            ),
        });
    }
    if viewport.is_degenerate() {
        return Err(LabelpackError::InvalidGeometry {
            message: format!(
                "viewport size {}x{} must be positive and finite",
                viewport.width, viewport.height
            ),
        });
    }
    Ok(())
}

// ============================================================================
// Image space <-> view space
// ============================================================================

/// A rectangle in view space, stored as its bottom-left corner plus size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewRect {
    /// Creates a rect from its bottom-left corner and size.
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rect's center point.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Maps an image-space region box into view space under the letterbox
/// fit of `image` into `viewport`.
///
/// The center scales and shifts by the margins; y flips from the image's
/// top-left-origin convention into the viewport's bottom-left-origin one.
pub fn to_view_rect(
    bounds: RegionBox,
    image: PixelSize,
    viewport: ViewportSize,
) -> Result<ViewRect, LabelpackError> {
    let fit = letterbox(image, viewport)?;
    let center_x = bounds.x * fit.scale + fit.margin_x;
    let center_y = viewport.height - (bounds.y * fit.scale + fit.margin_y);
    let width = bounds.width * fit.scale;
    let height = bounds.height * fit.scale;
    Ok(ViewRect::new(
        center_x - width / 2.0,
        center_y - height / 2.0,
        width,
        height,
    ))
}

/// Maps a view-space rect back to an image-space region box; the exact
/// inverse of [`to_view_rect`] up to floating-point rounding.
pub fn from_view_rect(
    rect: ViewRect,
    image: PixelSize,
    viewport: ViewportSize,
) -> Result<RegionBox, LabelpackError> {
    let fit = letterbox(image, viewport)?;
    let (center_x, center_y) = rect.center();
    Ok(RegionBox::new(
        (center_x - fit.margin_x) / fit.scale,
        (viewport.height - center_y - fit.margin_y) / fit.scale,
        rect.width / fit.scale,
        rect.height / fit.scale,
    ))
}

// ============================================================================
// Detection space -> image space
// ============================================================================

/// A box in detection space: the unit square with origin at the
/// bottom-left corner and y growing upward. `(x, y)` is the box's own
/// bottom-left corner, not its center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedBox {
    /// Creates a box from its bottom-left corner and size.
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One detector output prior to adoption into the model.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Classifier label, when the detector produced one.
    pub label: Option<String>,

    /// Detector confidence, nominally in `[0, 1]`.
    pub confidence: f64,

    /// Box in detection space.
    pub bounds: NormalizedBox,
}

impl Detection {
    /// Creates an unlabeled detection.
    pub fn new(bounds: NormalizedBox, confidence: f64) -> Self {
        Self {
            label: None,
            confidence,
            bounds,
        }
    }

    /// Attaches a classifier label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Converts a detection-space box to an image-space center-origin box.
///
/// The y axis flips from the detector's bottom-left-origin convention
/// into the raster's top-left-origin one.
pub fn region_box_from_detection(
    norm: NormalizedBox,
    image: PixelSize,
) -> Result<RegionBox, LabelpackError> {
    if image.is_degenerate() {
        return Err(LabelpackError::InvalidGeometry {
            message: format!(
                "image size {}x{} must be positive and finite",
                image.width, image.height
            ),
        });
    }
    Ok(RegionBox::new(
        (norm.x + norm.width / 2.0) * image.width,
        image.height - (norm.y * image.height + norm.height * image.height / 2.0),
        norm.width * image.width,
        norm.height * image.height,
    ))
}

/// Converts detector output into model regions: detections below
/// `min_confidence` are dropped, and detections without a label get
/// `fallback_label`.
pub fn regions_from_detections(
    detections: &[Detection],
    image: PixelSize,
    min_confidence: f64,
    fallback_label: &str,
) -> Result<Vec<Region>, LabelpackError> {
    let mut regions = Vec::new();
    for detection in detections {
        if detection.confidence < min_confidence {
            continue;
        }
        let bounds = region_box_from_detection(detection.bounds, image)?;
        let label = detection.label.as_deref().unwrap_or(fallback_label);
        regions.push(Region::new(label, bounds));
    }
    Ok(regions)
}
