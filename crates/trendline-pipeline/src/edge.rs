//! Canny edge detection.
//!
//! Wraps [`crate::canny::canny`] to turn a grayscale image into a
//! binary edge map where white pixels (255) are edges and black pixels
//! (0) are background.

use image::GrayImage;

/// Minimum allowed Canny threshold.
///
/// With a low threshold of zero, hysteresis accepts every
/// zero-magnitude pixel next to an edge and floods the image. Both
/// thresholds are clamped to at least this value.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Detect edges using the Canny algorithm.
///
/// Returns a binary image with the same dimensions as `image`: 255 for
/// edge pixels, 0 for non-edge.
///
/// Internally, Canny computes Sobel gradients (after a Gaussian blur
/// when `blur_sigma` is set), thins them with non-maximum suppression
/// and applies 8-connected hysteresis. Pixels with
/// gradient magnitude at or above `high_threshold` are definite edges;
/// those between `low_threshold` and `high_threshold` are edges only if
/// connected to a definite edge.
///
/// Both thresholds are clamped to a minimum of [`MIN_THRESHOLD`] and
/// `low_threshold` is clamped to be at most `high_threshold`.
#[must_use = "returns the binary edge map"]
pub fn detect(
    image: &GrayImage,
    low_threshold: f32,
    high_threshold: f32,
    blur_sigma: Option<f32>,
) -> GrayImage {
    let high = high_threshold.max(MIN_THRESHOLD);
    let low = low_threshold.max(MIN_THRESHOLD).min(high);
    crate::canny::canny(image, low, high, blur_sigma)
}

/// Count edge pixels (value == 255) in a binary edge map.
#[must_use]
pub fn count_edge_pixels(edges: &GrayImage) -> u64 {
    edges
        .pixels()
        .map(|p| u64::from(u8::from(p.0[0] == 255)))
        .sum()
}
