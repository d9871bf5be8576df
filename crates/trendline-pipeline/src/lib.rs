//! trendline-pipeline: Pure image-to-trend pipeline (sans-IO).
//!
//! Turns a chart-like or line-drawing raster into a short text
//! description of its dominant trend through:
//! grayscale -> Canny edges -> contour tracing -> point graph ->
//! convex hull -> slope summary.
//!
//! This crate has **no I/O dependencies** and keeps no state between
//! calls. It operates on in-memory byte slices or pixel buffers and
//! returns structured data; every entry point may be called from any
//! number of threads at once. File reading and presentation live in
//! `trendline-cli`.

pub mod canny;
pub mod contour;
pub mod diagnostics;
pub mod edge;
pub mod graph;
pub mod grayscale;
pub mod hull;
pub mod summary;
pub mod types;

pub use graph::PointGraph;
pub use summary::{ChangeKind, Direction, SignificantChange, Summary};
pub use types::{
    Dimensions, GrayImage, PipelineConfig, PipelineError, Point, TrendResponse, TrendResult,
};

/// Run the full pipeline on encoded image bytes and return the summary.
///
/// # Pipeline steps
///
/// 1. Decode image and convert to grayscale
/// 2. Canny edge detection
/// 3. Contour tracing (outer and hole borders, straight runs compressed)
/// 4. Point graph construction
/// 5. Convex hull, vertices sorted by x
/// 6. Slope summary
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// [`PipelineConfig::validate`].
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageLoad`] if the image cannot be decoded.
/// Returns [`PipelineError::InsufficientPoints`] if fewer than 3
/// distinct edge points are found.
/// Returns [`PipelineError::NoSlopeData`] if every trend segment is
/// vertical.
pub fn process(image_bytes: &[u8], config: &PipelineConfig) -> Result<Summary, PipelineError> {
    analyze(image_bytes, config).map(|result| result.summary)
}

/// Run the full pipeline on an already-decoded row-major luma buffer.
///
/// # Errors
///
/// Returns [`PipelineError::PixelBuffer`] if `pixels` is not a
/// `width` x `height` raster; otherwise as [`process`].
pub fn process_pixels(
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    config: &PipelineConfig,
) -> Result<Summary, PipelineError> {
    config.validate()?;
    let gray = grayscale::from_raw(width, height, pixels)?;
    run(&gray, config).map(|result| result.summary)
}

/// Run the pipeline on a grayscale image.
///
/// # Errors
///
/// As [`process`], minus the decoding errors.
pub fn process_gray(gray: &GrayImage, config: &PipelineConfig) -> Result<Summary, PipelineError> {
    config.validate()?;
    run(gray, config).map(|result| result.summary)
}

/// Like [`process`], but also returns the trend points and dimensions.
///
/// # Errors
///
/// As [`process`].
pub fn analyze(image_bytes: &[u8], config: &PipelineConfig) -> Result<TrendResult, PipelineError> {
    config.validate()?;
    let gray = grayscale::decode_and_grayscale(image_bytes)?;
    run(&gray, config)
}

/// Stages 2-6 on a validated config.
fn run(gray: &GrayImage, config: &PipelineConfig) -> Result<TrendResult, PipelineError> {
    let edges = edge::detect(gray, config.canny_low, config.canny_high, config.blur_sigma);
    let contours = contour::select(
        contour::trace(&edges),
        config.include_holes,
        config.max_contour_points,
    );
    let graph = PointGraph::build(&contours);
    let trend_points = hull::extract(&graph)?;
    let summary = summary::summarize(&trend_points)?;
    Ok(TrendResult {
        dimensions: Dimensions {
            width: gray.width(),
            height: gray.height(),
        },
        point_count: graph.node_count(),
        trend_points,
        summary,
    })
}
