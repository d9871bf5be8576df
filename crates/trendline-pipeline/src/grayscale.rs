//! Image loading: encoded bytes or raw luma buffers to `GrayImage`.
//!
//! This is the entry step of the pipeline. Everything downstream works
//! on a single-channel 8-bit raster.

use image::GrayImage;

use crate::types::PipelineError;

/// Decode raw image bytes and convert to grayscale.
///
/// Supports whatever the `image` crate was built to decode (PNG, JPEG,
/// BMP, WebP). Color images are converted with the standard luminance
/// weights.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageLoad`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_and_grayscale(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_luma8())
}

/// Wrap an already-decoded row-major luma buffer (one byte per pixel).
///
/// # Errors
///
/// Returns [`PipelineError::PixelBuffer`] if either dimension is zero or
/// `pixels.len()` is not `width * height`.
pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<GrayImage, PipelineError> {
    let len = pixels.len();
    let expected = u64::from(width) * u64::from(height);
    if expected == 0 || u64::try_from(len).ok() != Some(expected) {
        return Err(PipelineError::PixelBuffer { width, height, len });
    }
    GrayImage::from_raw(width, height, pixels)
        .ok_or(PipelineError::PixelBuffer { width, height, len })
}
