//! Point graph: the distinct contour points and their co-occurrence.
//!
//! Every point of every contour becomes a node, and every pair of
//! distinct points within one contour is joined by an undirected edge.
//! Each contour is therefore a complete subgraph. Downstream stages only
//! read the node set; the edges record which points were traced
//! together.
//!
//! Nodes are keyed by coordinate and edges by their unordered endpoint
//! pair, so repeated points and repeated pairs collapse. Building is
//! O(k²) in the length k of each contour.

use petgraph::graphmap::UnGraphMap;

use crate::contour::Contour;
use crate::types::Point;

/// Undirected graph over distinct contour points.
#[derive(Debug, Clone, Default)]
pub struct PointGraph {
    graph: UnGraphMap<Point, ()>,
}

impl PointGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from traced contours.
    #[must_use]
    pub fn build(contours: &[Contour]) -> Self {
        let mut graph = Self::new();
        for contour in contours {
            graph.add_contour(&contour.points);
        }
        graph
    }

    /// Add one contour: its points as nodes, all distinct pairs as edges.
    ///
    /// A single-point contour adds a node and no edges. Pairs of equal
    /// points are skipped, so the graph never has self-loops.
    pub fn add_contour(&mut self, points: &[Point]) {
        for &p in points {
            self.graph.add_node(p);
        }
        for (i, &a) in points.iter().enumerate() {
            for &b in &points[i + 1..] {
                if a != b {
                    self.graph.add_edge(a, b, ());
                }
            }
        }
    }

    /// Number of distinct points.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct unordered point pairs.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns `true` if no point has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// Distinct points in first-insertion order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.graph.nodes()
    }

    /// Whether `a` and `b` were traced in a common contour.
    #[must_use]
    pub fn contains_edge(&self, a: Point, b: Point) -> bool {
        self.graph.contains_edge(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::BorderKind;

    fn contour(points: &[(i32, i32)]) -> Contour {
        Contour {
            points: points.iter().copied().map(Point::from).collect(),
            kind: BorderKind::Outer,
            parent: None,
        }
    }

    #[test]
    fn no_contours_yields_empty_graph() {
        let graph = PointGraph::build(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn single_point_contour_adds_node_without_edges() {
        let graph = PointGraph::build(&[contour(&[(3, 4)])]);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn contour_becomes_complete_subgraph() {
        let graph = PointGraph::build(&[contour(&[(0, 0), (1, 0), (1, 1), (0, 1)])]);
        assert_eq!(graph.node_count(), 4);
        // 4 choose 2.
        assert_eq!(graph.edge_count(), 6);
        assert!(graph.contains_edge(Point::new(0, 0), Point::new(1, 1)));
        assert!(graph.contains_edge(Point::new(1, 1), Point::new(0, 0)));
    }

    #[test]
    fn contours_are_not_connected_to_each_other() {
        let graph = PointGraph::build(&[contour(&[(0, 0), (1, 0)]), contour(&[(5, 5), (6, 5)])]);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 2);
        assert!(!graph.contains_edge(Point::new(0, 0), Point::new(5, 5)));
    }

    #[test]
    fn repeated_points_are_deduplicated_without_self_loops() {
        let graph = PointGraph::build(&[contour(&[(0, 0), (1, 0), (0, 0), (1, 0)])]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.contains_edge(Point::new(0, 0), Point::new(0, 0)));
    }

    #[test]
    fn shared_points_across_contours_merge() {
        let graph = PointGraph::build(&[
            contour(&[(0, 0), (2, 0), (1, 1)]),
            contour(&[(2, 0), (1, 1), (3, 3)]),
        ]);
        assert_eq!(graph.node_count(), 4);
        // Triangle (3) + triangle (3) sharing the (2,0)-(1,1) edge.
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn points_iterate_in_insertion_order() {
        let graph = PointGraph::build(&[contour(&[(9, 9), (0, 0), (5, 1)])]);
        let points: Vec<Point> = graph.points().collect();
        assert_eq!(
            points,
            vec![Point::new(9, 9), Point::new(0, 0), Point::new(5, 1)]
        );
    }
}
