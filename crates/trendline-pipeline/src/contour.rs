//! Contour tracing: extract closed point sequences from a binary edge map.
//!
//! Borders are found with Suzuki-Abe border following
//! ([`imageproc::contours::find_contours`]), which reports both outer
//! borders and hole borders together with their parent links. Each
//! border is then compressed so that straight runs collapse to their
//! endpoints.

use image::GrayImage;
use imageproc::contours::BorderType;

use crate::types::Point;

/// Whether a contour bounds a region from outside or a hole inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderKind {
    /// Outer border of a foreground region.
    Outer,
    /// Border of a hole inside a foreground region.
    Hole,
}

impl From<BorderType> for BorderKind {
    fn from(border: BorderType) -> Self {
        match border {
            BorderType::Outer => Self::Outer,
            BorderType::Hole => Self::Hole,
        }
    }
}

/// A traced border.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    /// Border points in tracing order, straight runs compressed.
    pub points: Vec<Point>,
    /// Outer or hole border.
    pub kind: BorderKind,
    /// Index of the enclosing contour in the list returned by [`trace`],
    /// if any. [`select`] does not renumber it.
    pub parent: Option<usize>,
}

/// Trace every border in `edges` (non-zero pixels are foreground).
///
/// Contours come back in the tracer's hierarchy order: a parent always
/// precedes its children.
#[must_use]
pub fn trace(edges: &GrayImage) -> Vec<Contour> {
    imageproc::contours::find_contours::<i32>(edges)
        .into_iter()
        .map(|c| {
            let points: Vec<Point> = c.points.iter().map(|p| Point::new(p.x, p.y)).collect();
            Contour {
                points: compress_collinear(&points),
                kind: c.border_type.into(),
                parent: c.parent,
            }
        })
        .collect()
}

/// Nesting depth of each traced contour: 0 for top-level borders, one
/// more than the parent otherwise.
///
/// Expects the order produced by [`trace`], where parents come first. A
/// parent link that does not point backwards is treated as top-level.
#[must_use]
pub fn nesting_depths(contours: &[Contour]) -> Vec<usize> {
    let mut depths: Vec<usize> = Vec::with_capacity(contours.len());
    for (i, contour) in contours.iter().enumerate() {
        let depth = contour
            .parent
            .filter(|&p| p < i)
            .map_or(0, |p| depths[p] + 1);
        depths.push(depth);
    }
    depths
}

/// Drop every point whose incoming and outgoing steps are identical.
///
/// The contour is treated as closed, so the first and last points are
/// checked against each other. Only the points where the chain changes
/// direction survive. Contours shorter than 3 points are returned as-is.
#[must_use]
pub fn compress_collinear(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |from: Point, to: Point| (to.x - from.x, to.y - from.y);
    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        vec![points[0]]
    } else {
        kept
    }
}

/// Evenly subsample `points` down to at most `max_points` entries.
///
/// Keeps the first point and spaces the rest uniformly by index.
/// `max_points == 0` is treated as 1.
#[must_use]
pub fn limit_points(points: Vec<Point>, max_points: usize) -> Vec<Point> {
    let max_points = max_points.max(1);
    let n = points.len();
    if n <= max_points {
        return points;
    }
    (0..max_points).map(|i| points[i * n / max_points]).collect()
}

/// Apply the graph-construction options to traced contours.
///
/// Drops hole borders unless `include_holes`, then bounds each contour
/// to `max_points` when set.
#[must_use]
pub fn select(contours: Vec<Contour>, include_holes: bool, max_points: Option<usize>) -> Vec<Contour> {
    contours
        .into_iter()
        .filter(|c| include_holes || c.kind == BorderKind::Outer)
        .map(|c| match max_points {
            Some(max) => Contour {
                points: limit_points(c.points, max),
                ..c
            },
            None => c,
        })
        .collect()
}
