//! Pipeline diagnostics: timing and counts for each stage.
//!
//! [`process_with_diagnostics`] runs the same stages as
//! [`crate::analyze`] while recording how long each took and how much
//! data it produced. Useful for spotting images whose contours make the
//! quadratic graph step dominate.
//!
//! Timing goes through the [`Clock`] trait so the crate itself never
//! reads the system clock. Durations are serialized as fractional
//! seconds (`f64`), since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::graph::PointGraph;
use crate::types::{Dimensions, PipelineConfig, PipelineError, TrendResult};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// Current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: decoding and grayscale conversion.
    pub decode: StageDiagnostics,
    /// Stage 2: Canny edge detection.
    pub edge_detection: StageDiagnostics,
    /// Stage 3: contour tracing and selection.
    pub contour_tracing: StageDiagnostics,
    /// Stage 4: point graph construction.
    pub graph: StageDiagnostics,
    /// Stage 5: convex hull.
    pub hull: StageDiagnostics,
    /// Stage 6: slope summary.
    pub summarize: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
    },
    /// Canny edge detection metrics.
    EdgeDetection {
        /// Low threshold as configured.
        low_threshold: f32,
        /// High threshold as configured.
        high_threshold: f32,
        /// Number of edge pixels (value == 255) in the output.
        edge_pixel_count: u64,
        /// Total pixel count for computing edge density.
        total_pixel_count: u64,
    },
    /// Contour tracing metrics.
    ContourTracing {
        /// Borders found by the tracer.
        traced_count: usize,
        /// Of those, hole borders.
        hole_count: usize,
        /// Deepest border nesting (0 when nothing is enclosed).
        max_nesting_depth: usize,
        /// Contours kept for graph construction.
        kept_count: usize,
        /// Total points across kept contours.
        total_point_count: usize,
        /// Points in the longest kept contour.
        max_contour_points: usize,
    },
    /// Point graph metrics.
    Graph {
        /// Distinct points.
        node_count: usize,
        /// Distinct point pairs.
        edge_count: usize,
    },
    /// Convex hull metrics.
    Hull {
        /// Hull vertices on the trend line.
        vertex_count: usize,
    },
    /// Slope summary metrics.
    Summarize {
        /// Non-vertical segments.
        slope_count: usize,
        /// Segments flagged as significant.
        significant_count: usize,
    },
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());
        lines.push(format!(
            "{:<18} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Edge Detection", &self.edge_detection),
            ("Contour Tracing", &self.contour_tracing),
            ("Graph", &self.graph),
            ("Hull", &self.hull),
            ("Summarize", &self.summarize),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<18} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::EdgeDetection {
            low_threshold,
            high_threshold,
            edge_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *edge_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!(
                "low={low_threshold:.1} high={high_threshold:.1} edges={edge_pixel_count} ({density:.1}%)",
            )
        }
        StageMetrics::ContourTracing {
            traced_count,
            hole_count,
            max_nesting_depth,
            kept_count,
            total_point_count,
            max_contour_points,
        } => format!(
            "{traced_count} traced ({hole_count} holes, depth {max_nesting_depth}), {kept_count} kept, {total_point_count} pts (max={max_contour_points})",
        ),
        StageMetrics::Graph {
            node_count,
            edge_count,
        } => format!("{node_count} nodes, {edge_count} edges"),
        StageMetrics::Hull { vertex_count } => format!("{vertex_count} vertices"),
        StageMetrics::Summarize {
            slope_count,
            significant_count,
        } => format!("{slope_count} slopes, {significant_count} significant"),
    }
}

/// Time one stage, returning its output and duration.
fn timed<C: Clock, T>(clock: &C, f: impl FnOnce() -> T) -> (T, Duration) {
    let start = clock.now();
    let out = f();
    (out, clock.elapsed(&start))
}

/// Run the full pipeline, collecting per-stage diagnostics.
///
/// Produces the same [`TrendResult`] as [`crate::analyze`].
///
/// # Errors
///
/// As [`crate::process`]. Diagnostics for the stages that did run are
/// discarded on failure.
pub fn process_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &PipelineConfig,
    clock: &C,
) -> Result<(TrendResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let total_start = clock.now();

    let (gray, decode_time) = timed(clock, || crate::grayscale::decode_and_grayscale(image_bytes));
    let gray = gray?;
    let dimensions = Dimensions {
        width: gray.width(),
        height: gray.height(),
    };

    let (edges, edge_time) = timed(clock, || {
        crate::edge::detect(&gray, config.canny_low, config.canny_high, config.blur_sigma)
    });

    let ((traced_count, hole_count, max_nesting_depth, contours), contour_time) = timed(clock, || {
        let traced = crate::contour::trace(&edges);
        let traced_count = traced.len();
        let hole_count = traced
            .iter()
            .filter(|c| c.kind == crate::contour::BorderKind::Hole)
            .count();
        let max_depth = crate::contour::nesting_depths(&traced)
            .into_iter()
            .max()
            .unwrap_or(0);
        let kept = crate::contour::select(traced, config.include_holes, config.max_contour_points);
        (traced_count, hole_count, max_depth, kept)
    });

    let (graph, graph_time) = timed(clock, || PointGraph::build(&contours));

    let (trend_points, hull_time) = timed(clock, || crate::hull::extract(&graph));
    let trend_points = trend_points?;

    let (summary, summarize_time) = timed(clock, || crate::summary::summarize(&trend_points));
    let summary = summary?;

    let total_duration = clock.elapsed(&total_start);

    let diagnostics = PipelineDiagnostics {
        decode: StageDiagnostics {
            duration: decode_time,
            metrics: StageMetrics::Decode {
                input_bytes: image_bytes.len(),
                width: dimensions.width,
                height: dimensions.height,
            },
        },
        edge_detection: StageDiagnostics {
            duration: edge_time,
            metrics: StageMetrics::EdgeDetection {
                low_threshold: config.canny_low,
                high_threshold: config.canny_high,
                edge_pixel_count: crate::edge::count_edge_pixels(&edges),
                total_pixel_count: u64::from(dimensions.width) * u64::from(dimensions.height),
            },
        },
        contour_tracing: StageDiagnostics {
            duration: contour_time,
            metrics: StageMetrics::ContourTracing {
                traced_count,
                hole_count,
                max_nesting_depth,
                kept_count: contours.len(),
                total_point_count: contours.iter().map(|c| c.points.len()).sum(),
                max_contour_points: contours.iter().map(|c| c.points.len()).max().unwrap_or(0),
            },
        },
        graph: StageDiagnostics {
            duration: graph_time,
            metrics: StageMetrics::Graph {
                node_count: graph.node_count(),
                edge_count: graph.edge_count(),
            },
        },
        hull: StageDiagnostics {
            duration: hull_time,
            metrics: StageMetrics::Hull {
                vertex_count: trend_points.len(),
            },
        },
        summarize: StageDiagnostics {
            duration: summarize_time,
            metrics: StageMetrics::Summarize {
                slope_count: summary.slopes.len(),
                significant_count: summary.significant_changes.len(),
            },
        },
        total_duration,
    };

    let result = TrendResult {
        dimensions,
        point_count: graph.node_count(),
        trend_points,
        summary,
    };
    Ok((result, diagnostics))
}
