//! Image decoding and luminance conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the two
//! pixel layouts the pipeline works with: opaque RGB for garments and
//! RGBA for graphics. [`luminance`] provides the single-channel view
//! used both for silhouette detection and as the wrinkle height field.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::types::PipelineError;

/// Decode raw image bytes into a [`DynamicImage`].
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    Ok(image::load_from_memory(bytes)?)
}

/// Decode a garment photograph as opaque RGB.
///
/// Any alpha channel in the source is discarded.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_garment(bytes: &[u8]) -> Result<RgbImage, PipelineError> {
    decode(bytes).map(|img| img.to_rgb8())
}

/// Decode a graphic as RGBA. Opaque sources get alpha 255.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_graphic(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    decode(bytes).map(|img| img.to_rgba8())
}

/// Convert an RGB image to 8-bit luminance.
#[must_use = "returns the luminance image"]
pub fn luminance(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}
