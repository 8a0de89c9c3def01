//! Bounding and re-encoding of uploaded images.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::error::{Error, Result};

/// Longest allowed side in pixels.
pub const MAX_LONG_SIDE: u32 = 800;
/// Longest allowed short side in pixels.
pub const MAX_SHORT_SIDE: u32 = 600;
/// JPEG quality used for embedded payloads.
pub const JPEG_QUALITY: u8 = 80;

/// Re-encoded upload ready to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Target dimensions for `width` x `height` under the 800 x 600 bound.
///
/// The longer side is capped at [`MAX_LONG_SIDE`] and the shorter at
/// [`MAX_SHORT_SIDE`], preserving aspect ratio. Images already inside the
/// bound are returned unchanged, so applying this twice is a no-op.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn bounded_dimensions(width: u32, height: u32) -> (u32, u32) {
    let long = width.max(height);
    let short = width.min(height);
    if short == 0 || (long <= MAX_LONG_SIDE && short <= MAX_SHORT_SIDE) {
        return (width, height);
    }

    let scale = (f64::from(MAX_LONG_SIDE) / f64::from(long))
        .min(f64::from(MAX_SHORT_SIDE) / f64::from(short));
    let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Decode `source_bytes`, shrink into the bound and encode as JPEG.
pub(super) fn bound_and_encode(source_bytes: &[u8]) -> Result<EncodedImage> {
    let source = image::load_from_memory(source_bytes).map_err(|error| {
        Error::UnsupportedType(format!("Failed to decode uploaded image: {error}"))
    })?;

    let (source_width, source_height) = source.dimensions();
    let (width, height) = bounded_dimensions(source_width, source_height);
    let resized = if (width, height) == (source_width, source_height) {
        source
    } else {
        source.resize_exact(width, height, FilterType::Triangle)
    };

    let bytes = encode_jpeg(&resized)?;
    Ok(EncodedImage {
        bytes,
        width,
        height,
    })
}

fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    let rgb = image.to_rgb8();
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .map_err(|error| Error::InvalidInput(format!("Failed to encode JPEG image: {error}")))?;
    Ok(cursor.into_inner())
}
