//! Canny edge detection with 8-connected hysteresis.
//!
//! A local take on `imageproc::edges::canny` (0.26) with two changes:
//!
//! 1. **Hysteresis walks all 8 neighbours.** Upstream only visits 6 of
//!    them, skipping north `(x, y-1)` and northeast `(x+1, y-1)`, so weak
//!    edge pixels reachable only through those directions are dropped.
//!    It also underflows `u32` when the walk reaches row or column 0.
//!    Upstream references:
//!    - Issue: <https://github.com/image-rs/imageproc/issues/705>
//!    - Fix PR: <https://github.com/image-rs/imageproc/pull/746>
//!
//! 2. **Smoothing is optional.** Upstream always applies a Gaussian blur
//!    with sigma 1.4 before taking gradients. That blur flattens 1-pixel
//!    strokes below typical thresholds, so thin line art loses every
//!    edge. Here gradients are taken from the image itself unless a
//!    sigma is given.
//!
//! Drop back to `imageproc::edges::canny` once the hysteresis fix is
//! released and the blur can be skipped upstream.

use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::filter::{filter_clamped, gaussian_blur_f32};
use imageproc::kernel;

const EDGE: Luma<u8> = Luma([255]);

/// Run Canny edge detection.
///
/// `blur_sigma` of `None` takes Sobel gradients directly from `image`.
/// `low_threshold` must not exceed `high_threshold`; callers clamp.
#[must_use = "returns the binary edge map"]
pub fn canny(
    image: &GrayImage,
    low_threshold: f32,
    high_threshold: f32,
    blur_sigma: Option<f32>,
) -> GrayImage {
    let blurred;
    let source = match blur_sigma {
        Some(sigma) => {
            blurred = gaussian_blur_f32(image, sigma);
            &blurred
        }
        None => image,
    };

    let gx: Image<Luma<i16>> = filter_clamped(source, kernel::SOBEL_HORIZONTAL_3X3);
    let gy: Image<Luma<i16>> = filter_clamped(source, kernel::SOBEL_VERTICAL_3X3);
    let magnitude: Image<Luma<f32>> = Image::from_fn(image.width(), image.height(), |x, y| {
        let h = f32::from(gx.get_pixel(x, y)[0]);
        let v = f32::from(gy.get_pixel(x, y)[0]);
        Luma([h.hypot(v)])
    });

    let thinned = non_maximum_suppression(&magnitude, &gx, &gy);
    hysteresis(&thinned, low_threshold, high_threshold)
}

/// Gradient direction quantized to the four neighbour axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Diagonal,
    Vertical,
    AntiDiagonal,
}

impl Axis {
    fn from_gradient(gx: f32, gy: f32) -> Self {
        let mut angle = gy.atan2(gx).to_degrees();
        if angle < 0.0 {
            angle += 180.0;
        }
        if (22.5..67.5).contains(&angle) {
            Self::Diagonal
        } else if (67.5..112.5).contains(&angle) {
            Self::Vertical
        } else if (112.5..157.5).contains(&angle) {
            Self::AntiDiagonal
        } else {
            Self::Horizontal
        }
    }

    /// Offsets of the two neighbours along the gradient.
    const fn neighbours(self) -> [(i64, i64); 2] {
        match self {
            Self::Horizontal => [(-1, 0), (1, 0)],
            Self::Diagonal => [(1, 1), (-1, -1)],
            Self::Vertical => [(0, -1), (0, 1)],
            Self::AntiDiagonal => [(-1, 1), (1, -1)],
        }
    }
}

/// Keep only pixels that are local maxima along their gradient.
///
/// The one-pixel border is always zero.
fn non_maximum_suppression(
    magnitude: &Image<Luma<f32>>,
    gx: &Image<Luma<i16>>,
    gy: &Image<Luma<i16>>,
) -> Image<Luma<f32>> {
    let (width, height) = magnitude.dimensions();
    let mut out = Image::from_pixel(width, height, Luma([0.0]));
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let axis = Axis::from_gradient(
                f32::from(gx.get_pixel(x, y)[0]),
                f32::from(gy.get_pixel(x, y)[0]),
            );
            let value = magnitude.get_pixel(x, y)[0];
            let is_max = axis.neighbours().iter().all(|&(dx, dy)| {
                offset(x, y, dx, dy, width, height)
                    .is_none_or(|(nx, ny)| value >= magnitude.get_pixel(nx, ny)[0])
            });
            if is_max {
                out.put_pixel(x, y, Luma([value]));
            }
        }
    }
    out
}

/// Dual-threshold hysteresis over the thinned magnitudes.
///
/// Pixels at or above `high` seed a depth-first walk that marks every
/// 8-connected pixel at or above `low`.
fn hysteresis(input: &Image<Luma<f32>>, low: f32, high: f32) -> GrayImage {
    const NEIGHBOURS: [(i64, i64); 8] = [
        (1, 0),
        (1, 1),
        (0, 1),
        (-1, 1),
        (-1, 0),
        (-1, -1),
        (0, -1),
        (1, -1),
    ];

    let (width, height) = input.dimensions();
    let mut out = GrayImage::new(width, height);
    let mut stack = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if input.get_pixel(x, y)[0] < high || out.get_pixel(x, y)[0] != 0 {
                continue;
            }
            out.put_pixel(x, y, EDGE);
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                for &(dx, dy) in &NEIGHBOURS {
                    let Some((nx, ny)) = offset(cx, cy, dx, dy, width, height) else {
                        continue;
                    };
                    if input.get_pixel(nx, ny)[0] >= low && out.get_pixel(nx, ny)[0] == 0 {
                        out.put_pixel(nx, ny, EDGE);
                        stack.push((nx, ny));
                    }
                }
            }
        }
    }
    out
}

/// `(x + dx, y + dy)` if it lies inside a `width` x `height` image.
fn offset(x: u32, y: u32, dx: i64, dy: i64, width: u32, height: u32) -> Option<(u32, u32)> {
    let nx = u32::try_from(i64::from(x) + dx).ok()?;
    let ny = u32::try_from(i64::from(y) + dy).ok()?;
    (nx < width && ny < height).then_some((nx, ny))
}
