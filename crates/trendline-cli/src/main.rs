//! trendline: describe the dominant trend of an image from the command line.
//!
//! Reads an image file, runs the trend pipeline, and prints the summary
//! text, or the `{"summary": ...}` / `{"error": ...}` envelope with
//! `--json`. Per-stage diagnostics go to stderr with `--diagnostics`.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin trendline -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Logging is controlled by `RUST_LOG` (default `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use trendline_pipeline::diagnostics::{Clock, process_with_diagnostics};
use trendline_pipeline::{PipelineConfig, PipelineError, Summary, TrendResponse};

/// Describe the dominant trend of a chart-like or line-drawing image.
///
/// Detects edges, traces contours, takes the convex hull of the traced
/// points and summarizes the slopes of the hull read left to right.
#[derive(Parser)]
#[command(name = "trendline", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Canny low threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Gaussian blur sigma applied before edge detection.
    ///
    /// Off by default. Smoothing erases 1-pixel strokes.
    #[arg(long)]
    blur_sigma: Option<f32>,

    /// Ignore hole borders (inner boundaries of traced regions).
    #[arg(long)]
    exclude_holes: bool,

    /// Subsample each contour to at most this many points.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    max_contour_points: Option<usize>,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// Missing fields take their default values.
    #[arg(long)]
    config_json: Option<String>,

    /// Print the JSON response envelope instead of plain text.
    #[arg(long)]
    json: bool,

    /// Print per-stage timing and counts to stderr.
    #[arg(long)]
    diagnostics: bool,
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PipelineConfig {
        canny_low: cli.canny_low,
        canny_high: cli.canny_high,
        blur_sigma: cli.blur_sigma,
        include_holes: !cli.exclude_holes,
        max_contour_points: cli.max_contour_points,
    })
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Run the pipeline, reporting diagnostics when requested.
fn run(cli: &Cli, image_bytes: &[u8], config: &PipelineConfig) -> Result<Summary, PipelineError> {
    if !cli.diagnostics {
        return trendline_pipeline::process(image_bytes, config);
    }

    let (result, diagnostics) = process_with_diagnostics(image_bytes, config, &StdClock)?;
    eprintln!("{}", diagnostics.report());
    log::debug!("trend points: {:?}", result.trend_points);
    Ok(result.summary)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            log::error!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    log::debug!("config: {config:?}");

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Image: {} ({} bytes)",
        cli.image_path.display(),
        image_bytes.len(),
    );

    let result = run(&cli, &image_bytes, &config);
    if let Err(ref e) = result {
        log::error!("Pipeline error: {e}");
    }

    if cli.json {
        match serde_json::to_string(&TrendResponse::from(&result)) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("Error serializing response: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else if let Ok(ref summary) = result {
        println!("{summary}");
    }

    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
