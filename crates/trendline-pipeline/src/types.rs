//! Shared types for the trendline pipeline.

use serde::{Deserialize, Serialize};

use crate::edge::MIN_THRESHOLD;
use crate::summary::Summary;

/// Re-export `GrayImage` so downstream crates can hand in decoded
/// rasters without depending on `image` directly.
pub use image::GrayImage;

/// A 2D point in image pixel coordinates.
///
/// Identity is value-based: two points with equal coordinates are the
/// same graph node. Ordering is lexicographic by `x`, then `y`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: i32,
    /// Vertical position (pixels from top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Configuration for the trend pipeline.
///
/// Defaults reproduce the reference behavior: Canny hysteresis at
/// 100 / 200 on unsmoothed gradients, hole borders included, and no
/// bound on contour size.
///
/// Deserialization fills missing fields from [`Default`], so a partial
/// JSON object such as `{"canny_high": 150}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Canny low threshold. Pixels with gradient magnitude between
    /// `canny_low` and `canny_high` are edges only if connected to a
    /// strong edge.
    pub canny_low: f32,

    /// Canny high threshold. Pixels with gradient magnitude above this
    /// value are definite edges.
    pub canny_high: f32,

    /// Gaussian sigma applied before taking gradients. `None` measures
    /// the image's own gradients, which keeps 1-pixel strokes.
    ///
    /// Smoothing helps with noisy photographs but erases thin line art.
    pub blur_sigma: Option<f32>,

    /// Whether hole borders (inner boundaries of traced regions)
    /// contribute points to the graph.
    pub include_holes: bool,

    /// Upper bound on points kept per contour before graph
    /// construction. `None` keeps every point.
    ///
    /// Graph construction is quadratic in contour length, so dense
    /// images should set this.
    pub max_contour_points: Option<usize>,
}

impl PipelineConfig {
    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 100.0;
    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 200.0;
    /// Hole borders are included by default.
    pub const DEFAULT_INCLUDE_HOLES: bool = true;

    /// Check the invariants the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if a threshold is not a
    /// finite number of at least [`MIN_THRESHOLD`], if
    /// `canny_low > canny_high`, if `blur_sigma` is set but not a
    /// positive finite number, or if `max_contour_points` is `Some(0)`.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, value) in [("canny_low", self.canny_low), ("canny_high", self.canny_high)] {
            if !value.is_finite() || value < MIN_THRESHOLD {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name} must be a finite number of at least {MIN_THRESHOLD}, got {value}"
                )));
            }
        }
        if self.canny_low > self.canny_high {
            return Err(PipelineError::InvalidConfig(format!(
                "canny_low ({}) exceeds canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        if let Some(sigma) = self.blur_sigma
            && !(sigma.is_finite() && sigma > 0.0)
        {
            return Err(PipelineError::InvalidConfig(format!(
                "blur_sigma must be a positive finite number, got {sigma}"
            )));
        }
        if self.max_contour_points == Some(0) {
            return Err(PipelineError::InvalidConfig(
                "max_contour_points must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
            blur_sigma: None,
            include_holes: Self::DEFAULT_INCLUDE_HOLES,
            max_contour_points: None,
        }
    }
}

/// Result of running the full pipeline on one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Dimensions of the source raster in pixels.
    pub dimensions: Dimensions,
    /// Number of distinct points in the point graph.
    pub point_count: usize,
    /// Hull vertices sorted by x.
    pub trend_points: Vec<Point>,
    /// Slope summary of `trend_points`.
    pub summary: Summary,
}

/// Errors that can occur during pipeline processing.
///
/// `EmptyInput`, `ImageLoad` and `PixelBuffer` all mean the input could
/// not be read as a grayscale raster; see [`Self::is_image_load`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    /// A raw pixel buffer does not describe a `width` x `height` raster.
    #[error("pixel buffer of {len} bytes is not a {width}x{height} grayscale raster")]
    PixelBuffer {
        /// Claimed width in pixels.
        width: u32,
        /// Claimed height in pixels.
        height: u32,
        /// Actual buffer length in bytes.
        len: usize,
    },

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// Too few distinct points survived edge detection and graph
    /// construction to form a hull.
    #[error("at least 3 points required to form a convex hull (found {found})")]
    InsufficientPoints {
        /// Number of distinct points available.
        found: usize,
    },

    /// Every trend segment is vertical, so no slope can be averaged.
    #[error("no slope data: every trend segment is vertical")]
    NoSlopeData,
}

impl PipelineError {
    /// Whether this error means the input could not be loaded as a
    /// grayscale raster.
    #[must_use]
    pub const fn is_image_load(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::ImageLoad(_) | Self::PixelBuffer { .. }
        )
    }
}

/// Wire shape of a pipeline outcome: `{"summary": "..."}` on success,
/// `{"error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendResponse {
    /// Rendered summary text.
    Summary(String),
    /// Error message.
    Error(String),
}

impl From<&Result<Summary, PipelineError>> for TrendResponse {
    fn from(result: &Result<Summary, PipelineError>) -> Self {
        match result {
            Ok(summary) => Self::Summary(summary.to_string()),
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

impl From<Result<Summary, PipelineError>> for TrendResponse {
    fn from(result: Result<Summary, PipelineError>) -> Self {
        Self::from(&result)
    }
}
