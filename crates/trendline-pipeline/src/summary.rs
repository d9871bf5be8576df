//! Trend summarization: slopes along the trend line, rendered as text.
//!
//! The summary reports the sign of the average slope, its value, and
//! every segment whose slope is steep relative to that average.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{PipelineError, Point};

/// A segment is significant when `|slope| > SIGNIFICANCE_FACTOR * |average|`.
pub const SIGNIFICANCE_FACTOR: f64 = 1.5;

/// Overall direction of the trend, from the sign of the average slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Average slope above zero.
    Upward,
    /// Average slope below zero.
    Downward,
    /// Average slope exactly zero.
    Horizontal,
}

impl Direction {
    /// Classify an average slope.
    #[must_use]
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            Self::Upward
        } else if slope < 0.0 {
            Self::Downward
        } else {
            Self::Horizontal
        }
    }

    /// Lowercase label used in the summary text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upward => "upward",
            Self::Downward => "downward",
            Self::Horizontal => "horizontal",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sign of a significant segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Positive slope.
    Increase,
    /// Zero or negative slope.
    Decrease,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        })
    }
}

/// A segment whose slope is steep relative to the average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificantChange {
    /// Index in the retained-slope list (vertical segments excluded).
    pub index: usize,
    /// Increase or decrease.
    pub kind: ChangeKind,
    /// The segment's slope.
    pub slope: f64,
}

impl fmt::Display for SignificantChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Significant {} between points {} and {}.",
            self.kind,
            self.index,
            self.index + 1
        )
    }
}

/// Description of a trend line.
///
/// [`Display`](fmt::Display) renders the user-facing text:
///
/// ```text
/// Overall Trend: The trend is generally upward.
/// Average Slope: 1.00
/// Significant Changes:
/// Significant increase between points 2 and 3.
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Direction label derived from the average slope.
    pub direction: Direction,
    /// Mean of the retained (non-vertical) segment slopes.
    pub average_slope: f64,
    /// Retained slopes in trend-line order.
    pub slopes: Vec<f64>,
    /// Segments steeper than [`SIGNIFICANCE_FACTOR`] times the average.
    pub significant_changes: Vec<SignificantChange>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Overall Trend: The trend is generally {}.", self.direction)?;
        writeln!(f, "Average Slope: {:.2}", self.average_slope)?;
        if self.significant_changes.is_empty() {
            return f.write_str("No significant changes detected.");
        }
        f.write_str("Significant Changes:")?;
        for change in &self.significant_changes {
            write!(f, "\n{change}")?;
        }
        Ok(())
    }
}

/// Slopes between consecutive points, skipping vertical segments.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn slopes(points: &[Point]) -> Vec<f64> {
    points
        .windows(2)
        .filter_map(|w| {
            let dx = i64::from(w[1].x) - i64::from(w[0].x);
            let dy = i64::from(w[1].y) - i64::from(w[0].y);
            (dx != 0).then(|| dy as f64 / dx as f64)
        })
        .collect()
}

/// Summarize a trend line (points ordered by x).
///
/// # Errors
///
/// Returns [`PipelineError::NoSlopeData`] if no non-vertical segment
/// exists, which includes inputs of fewer than two points.
pub fn summarize(points: &[Point]) -> Result<Summary, PipelineError> {
    let slopes = slopes(points);
    if slopes.is_empty() {
        return Err(PipelineError::NoSlopeData);
    }

    #[allow(clippy::cast_precision_loss)]
    let average_slope = slopes.iter().sum::<f64>() / slopes.len() as f64;
    let threshold = SIGNIFICANCE_FACTOR * average_slope.abs();

    let significant_changes = slopes
        .iter()
        .enumerate()
        .filter(|&(_, s)| s.abs() > threshold)
        .map(|(index, &slope)| SignificantChange {
            index,
            kind: if slope > 0.0 {
                ChangeKind::Increase
            } else {
                ChangeKind::Decrease
            },
            slope,
        })
        .collect();

    Ok(Summary {
        direction: Direction::from_slope(average_slope),
        average_slope,
        slopes,
        significant_changes,
    })
}
