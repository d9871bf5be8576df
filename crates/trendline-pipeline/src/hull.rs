//! Trend extraction: the convex hull of the point graph, read left to right.
//!
//! The hull is computed by [`geo::ConvexHull`] (QuickHull). Its vertices,
//! sorted by x, form the piecewise-linear trend line that
//! [`summary`](crate::summary) describes.

use geo::{ConvexHull, Coord, MultiPoint};

use crate::graph::PointGraph;
use crate::types::{PipelineError, Point};

/// Minimum number of distinct points needed to form a hull.
pub const MIN_HULL_POINTS: usize = 3;

/// Hull vertices of the graph's points, sorted ascending by x.
///
/// Vertices sharing an x coordinate keep their hull traversal order.
/// Collinear input yields the two extreme endpoints.
///
/// # Errors
///
/// Returns [`PipelineError::InsufficientPoints`] if the graph has fewer
/// than [`MIN_HULL_POINTS`] nodes.
pub fn extract(graph: &PointGraph) -> Result<Vec<Point>, PipelineError> {
    let points: Vec<Point> = graph.points().collect();
    trend_line(&points)
}

/// [`extract`] over a plain slice of distinct points.
///
/// # Errors
///
/// Returns [`PipelineError::InsufficientPoints`] if `points` has fewer
/// than [`MIN_HULL_POINTS`] entries.
pub fn trend_line(points: &[Point]) -> Result<Vec<Point>, PipelineError> {
    if points.len() < MIN_HULL_POINTS {
        return Err(PipelineError::InsufficientPoints {
            found: points.len(),
        });
    }

    let mut vertices = hull_vertices(points);
    vertices.sort_by_key(|p| p.x);
    Ok(vertices)
}

/// Hull vertices in traversal order, without the ring's closing point.
fn hull_vertices(points: &[Point]) -> Vec<Point> {
    let multi: MultiPoint<f64> = points
        .iter()
        .map(|p| geo::Point::new(f64::from(p.x), f64::from(p.y)))
        .collect();
    let hull = multi.convex_hull();

    let mut ring: Vec<Point> = hull.exterior().coords().map(|&c| to_point(c)).collect();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    strict_vertices(ring)
}

/// Remove ring points that lie on a hull edge rather than at a corner.
///
/// A fully collinear ring reduces to its two extreme points.
fn strict_vertices(mut ring: Vec<Point>) -> Vec<Point> {
    ring.dedup();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return ring;
    }

    let n = ring.len();
    let turns = |i: usize| cross(ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]) != 0;
    if !(0..n).any(turns) {
        let (Some(&lo), Some(&hi)) = (ring.iter().min(), ring.iter().max()) else {
            return ring;
        };
        return ring.into_iter().filter(|&p| p == lo || p == hi).collect();
    }

    // Dropping a point can make its former neighbors straight, so repeat
    // until every remaining point turns.
    loop {
        let n = ring.len();
        let Some(straight) = (0..n).find(|&i| {
            cross(ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]) == 0
        }) else {
            return ring;
        };
        ring.remove(straight);
    }
}

/// Twice the signed area of triangle `abc`.
fn cross(a: Point, b: Point, c: Point) -> i64 {
    let (ax, ay) = (i64::from(a.x), i64::from(a.y));
    let (bx, by) = (i64::from(b.x), i64::from(b.y));
    let (cx, cy) = (i64::from(c.x), i64::from(c.y));
    (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
}

/// Hull coordinates are copies of integer inputs, so the cast is exact.
#[allow(clippy::cast_possible_truncation)]
fn to_point(c: Coord<f64>) -> Point {
    Point::new(c.x as i32, c.y as i32)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::contour::{BorderKind, Contour};

    fn pts(raw: &[(i32, i32)]) -> Vec<Point> {
        raw.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn fewer_than_three_points_is_rejected() {
        let result = trend_line(&pts(&[(0, 0), (1, 1)]));
        assert!(matches!(
            result,
            Err(PipelineError::InsufficientPoints { found: 2 })
        ));
    }

    #[test]
    fn empty_graph_is_rejected() {
        let result = extract(&PointGraph::new());
        assert!(matches!(
            result,
            Err(PipelineError::InsufficientPoints { found: 0 })
        ));
    }

    #[test]
    fn interior_points_are_excluded() {
        let input = pts(&[(0, 0), (10, 0), (10, 10), (0, 10), (5, 5), (3, 7), (8, 2)]);
        let trend = trend_line(&input).unwrap();
        let got: HashSet<Point> = trend.iter().copied().collect();
        let expected: HashSet<Point> = pts(&[(0, 0), (10, 0), (10, 10), (0, 10)])
            .into_iter()
            .collect();
        assert_eq!(got, expected);
        assert_eq!(trend.len(), 4);
    }

    #[test]
    fn output_is_sorted_by_x() {
        let input = pts(&[(7, 1), (2, 9), (0, 4), (9, 8), (4, 0), (5, 5), (3, 3)]);
        let trend = trend_line(&input).unwrap();
        assert!(trend.windows(2).all(|w| w[0].x <= w[1].x));
    }

    #[test]
    fn every_output_point_is_on_the_hull() {
        let input = pts(&[
            (1, 1),
            (6, 2),
            (9, 7),
            (4, 9),
            (0, 5),
            (4, 4),
            (5, 6),
            (3, 2),
        ]);
        let trend = trend_line(&input).unwrap();

        // No input point lies strictly outside any hull edge, and no
        // returned vertex lies strictly inside: for a convex polygon in
        // angular order, each vertex has all inputs on one side of the
        // line through it and its neighbor.
        let center = trend.iter().fold((0.0, 0.0), |acc, p| {
            (acc.0 + f64::from(p.x), acc.1 + f64::from(p.y))
        });
        #[allow(clippy::cast_precision_loss)]
        let n = trend.len() as f64;
        let (cx, cy) = (center.0 / n, center.1 / n);
        let mut ring = trend.clone();
        ring.sort_by(|a, b| {
            let ta = (f64::from(a.y) - cy).atan2(f64::from(a.x) - cx);
            let tb = (f64::from(b.y) - cy).atan2(f64::from(b.x) - cx);
            ta.total_cmp(&tb)
        });
        for i in 0..ring.len() {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            assert!(
                input.iter().all(|&p| cross(a, b, p) >= 0),
                "edge {a:?} -> {b:?} has input points on both sides"
            );
        }
    }

    #[test]
    fn collinear_points_yield_endpoints() {
        let input = pts(&[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]);
        let trend = trend_line(&input).unwrap();
        assert_eq!(trend, pts(&[(0, 0), (4, 4)]));
    }

    #[test]
    fn vertical_collinear_points_yield_endpoints() {
        let input = pts(&[(5, 0), (5, 3), (5, 9)]);
        let trend = trend_line(&input).unwrap();
        let got: HashSet<Point> = trend.iter().copied().collect();
        assert_eq!(got, pts(&[(5, 0), (5, 9)]).into_iter().collect());
    }

    #[test]
    fn points_on_hull_edges_are_dropped() {
        let ring = pts(&[(0, 0), (5, 0), (10, 0), (10, 10), (0, 10), (0, 5)]);
        assert_eq!(
            strict_vertices(ring),
            pts(&[(0, 0), (10, 0), (10, 10), (0, 10)])
        );
    }

    #[test]
    fn straight_ring_reduces_to_extremes() {
        let ring = pts(&[(0, 0), (2, 2), (4, 4), (2, 2)]);
        assert_eq!(strict_vertices(ring), pts(&[(0, 0), (4, 4)]));
    }

    #[test]
    fn extract_reads_graph_nodes() {
        let graph = PointGraph::build(&[Contour {
            points: pts(&[(0, 0), (4, 0), (2, 3), (2, 1)]),
            kind: BorderKind::Outer,
            parent: None,
        }]);
        let trend = extract(&graph).unwrap();
        assert_eq!(trend, pts(&[(0, 0), (2, 3), (4, 0)]));
    }
}
