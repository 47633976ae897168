//! PNG encode/decode for item rasters.
//!
//! Media blobs are always PNG: lossless RGBA8, so pixels survive any
//! number of save/load cycles byte-for-byte.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::error::LabelpackError;
use crate::model::ItemId;

/// Decodes a PNG blob into an RGBA8 raster.
///
/// `name` is the blob's media name, carried into the error for
/// diagnostics.
pub fn decode_png(name: &str, bytes: &[u8]) -> Result<RgbaImage, LabelpackError> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png).map_err(|e| {
        LabelpackError::MediaDecode {
            name: name.to_owned(),
            message: e.to_string(),
        }
    })?;
    Ok(decoded.into_rgba8())
}

/// Encodes a raster as a PNG blob.
///
/// A zero-size buffer cannot be represented as PNG and fails with
/// [`MediaEncode`](LabelpackError::MediaEncode).
pub fn encode_png(id: ItemId, image: &RgbaImage) -> Result<Vec<u8>, LabelpackError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(LabelpackError::MediaEncode {
            id,
            message: "raster has no pixels".to_owned(),
        });
    }
    let mut blob = Cursor::new(Vec::new());
    image
        .write_to(&mut blob, ImageFormat::Png)
        .map_err(|e| LabelpackError::MediaEncode {
            id,
            message: e.to_string(),
        })?;
    Ok(blob.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_png_round_trip_preserves_pixels() {
        let mut raster = RgbaImage::new(3, 2);
        raster.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        raster.put_pixel(2, 1, Rgba([0, 255, 0, 128]));

        let blob = encode_png(ItemId::new(), &raster).unwrap();
        let back = decode_png("roundtrip.png", &blob).unwrap();
        assert_eq!(back, raster);
    }

    #[test]
    fn test_encode_rejects_empty_raster() {
        let id = ItemId::new();
        let err = encode_png(id, &RgbaImage::new(0, 0)).unwrap_err();
        match err {
            LabelpackError::MediaEncode { id: got, .. } => assert_eq!(got, id),
            other => panic!("expected MediaEncode, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_png("bad.png", b"not a png at all").unwrap_err();
        match err {
            LabelpackError::MediaDecode { name, .. } => assert_eq!(name, "bad.png"),
            other => panic!("expected MediaDecode, got {other:?}"),
        }
    }
}
