//! Constrained Delaunay triangulation.
//!
//! # Algorithm
//!
//! 1. Deduplicate the input points (exactly, or by snapping to the first
//!    point within tolerance)
//! 2. Enclose them in a super-triangle
//! 3. Insert each point incrementally: locate it by walking the mesh, split
//!    the face or edge it lands on, then restore the Delaunay condition with
//!    edge flips
//! 4. Enforce each constraint segment by flipping away the edges crossing it
//!
//! All geometric decisions go through the exact predicates, so the result does
//! not depend on rounding in the input.
//!
//! # Example
//!
//! ```
//! use makevalid::triangulation::triangulate;
//! use makevalid::{Point2, Segment2};
//!
//! let square = [
//!     Point2::new(0.0_f64, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! let segments: Vec<_> = (0..4)
//!     .map(|i| Segment2::new(square[i], square[(i + 1) % 4]))
//!     .collect();
//!
//! let mesh = triangulate(&[], &segments).unwrap();
//! assert_eq!(mesh.triangles(false).len(), 2);
//! assert!(mesh.is_constrained(square[0], square[1]));
//! ```

use super::mesh::Mesh;
use crate::cancel::{CancelSignal, NeverCancel};
use crate::error::TriangulationError;
use crate::predicates::{orientation, Orientation};
use crate::primitives::{Point2, Segment2};
use crate::snap::Snapper;
use num_traits::Float;
use std::time::Instant;

/// Builder for constrained Delaunay triangulations.
///
/// `tolerance` controls point deduplication only: with zero (the default),
/// points merge when bit-identical; otherwise a point within `tolerance` of an
/// earlier point is replaced by it. Predicates are always exact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstrainedDelaunay<F> {
    tolerance: F,
}

impl<F: Float> Default for ConstrainedDelaunay<F> {
    fn default() -> Self {
        Self {
            tolerance: F::zero(),
        }
    }
}

impl<F: Float> ConstrainedDelaunay<F> {
    /// Creates a triangulator with the given snapping tolerance.
    ///
    /// Negative or non-finite tolerances are treated as zero.
    pub fn new(tolerance: F) -> Self {
        let tolerance = if tolerance.is_finite() && tolerance > F::zero() {
            tolerance
        } else {
            F::zero()
        };
        Self { tolerance }
    }

    /// The snapping tolerance in use.
    pub fn tolerance(&self) -> F {
        self.tolerance
    }

    /// Triangulates `points` together with the endpoints of `segments`, then
    /// makes every segment a chain of constrained mesh edges.
    ///
    /// Explicit points are inserted first, then segment endpoints in segment
    /// order. Non-finite coordinates are skipped, as are segments that
    /// collapse to a single point after deduplication.
    ///
    /// # Errors
    ///
    /// - [`TriangulationError::DegenerateInput`] when fewer than three
    ///   distinct points remain or all of them are collinear
    /// - [`TriangulationError::ConstraintConflict`] when two segments cross
    ///   at a point that is not a vertex of both
    /// - [`TriangulationError::ConstraintNotRecovered`] when a segment could
    ///   not be made into mesh edges
    /// - [`TriangulationError::Cancelled`] when `cancel` fires; it is polled
    ///   before every vertex insertion and constraint enforcement
    pub fn triangulate<C: CancelSignal + ?Sized>(
        &self,
        points: &[Point2<F>],
        segments: &[Segment2<F>],
        cancel: &C,
    ) -> Result<Mesh<F>, TriangulationError> {
        let started = Instant::now();
        let mut snapper = Snapper::new(self.tolerance);

        for &p in points {
            if snapper.resolve(p).is_none() {
                tracing::warn!(point = ?p.to_f64(), "skipping non-finite point");
            }
        }

        let mut constraints = Vec::with_capacity(segments.len());
        for (source, segment) in segments.iter().enumerate() {
            match (snapper.resolve(segment.start), snapper.resolve(segment.end)) {
                (Some(a), Some(b)) if a != b => constraints.push((a, b, source)),
                (Some(_), Some(_)) => {
                    tracing::debug!(source, "segment collapses to a point, skipped");
                }
                _ => tracing::warn!(source, "skipping segment with non-finite endpoint"),
            }
        }

        let distinct = snapper.into_points();
        if !spans_triangle(&distinct) {
            return Err(TriangulationError::DegenerateInput {
                distinct_points: distinct.len(),
            });
        }

        let total = distinct.len() + constraints.len();
        let mut mesh = Mesh::with_super_triangle(super_triangle(&distinct));
        let mut vertex = Vec::with_capacity(distinct.len());

        for (completed, &p) in distinct.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(TriangulationError::Cancelled { completed, total });
            }
            vertex.push(mesh.insert_point(p));
        }
        tracing::debug!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "points inserted"
        );

        for (k, &(a, b, source)) in constraints.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(TriangulationError::Cancelled {
                    completed: distinct.len() + k,
                    total,
                });
            }
            match (vertex[a], vertex[b]) {
                (Some(a), Some(b)) => mesh.insert_constraint(a, b, source)?,
                _ => tracing::warn!(source, "constraint endpoint missing from mesh"),
            }
        }

        tracing::debug!(
            vertices = mesh.vertex_count(),
            constraints = constraints.len(),
            constrained_edges = mesh.constrained_edge_count(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "constrained triangulation built"
        );

        Ok(mesh)
    }
}

/// Triangulates with exact deduplication and no cancellation.
///
/// Shorthand for `ConstrainedDelaunay::default().triangulate(points, segments, &NeverCancel)`.
pub fn triangulate<F: Float>(
    points: &[Point2<F>],
    segments: &[Segment2<F>],
) -> Result<Mesh<F>, TriangulationError> {
    ConstrainedDelaunay::default().triangulate(points, segments, &NeverCancel)
}

/// Returns `true` if some three of the points are not collinear.
fn spans_triangle<F: Float>(points: &[Point2<F>]) -> bool {
    let [a, b, rest @ ..] = points else {
        return false;
    };
    rest.iter()
        .any(|&c| orientation(*a, *b, c) != Orientation::Collinear)
}

/// Counter-clockwise triangle comfortably enclosing every point.
fn super_triangle<F: Float>(points: &[Point2<F>]) -> [Point2<F>; 3] {
    let mut min_x = points[0].x;
    let mut min_y = points[0].y;
    let mut max_x = min_x;
    let mut max_y = min_y;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let two = F::one() + F::one();
    let mid_x = (min_x + max_x) / two;
    let mid_y = (min_y + max_y) / two;
    let delta = (max_x - min_x).max(max_y - min_y);
    let delta = if delta > F::zero() { delta } else { F::one() };

    let margin = F::from(20.0).unwrap_or_else(F::one);
    [
        Point2::new(mid_x - margin * delta, mid_y - delta),
        Point2::new(mid_x + margin * delta, mid_y - delta),
        Point2::new(mid_x, mid_y + margin * delta),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulation::Triangle;
    use std::cell::Cell;

    fn ring(points: &[Point2<f64>]) -> Vec<Segment2<f64>> {
        (0..points.len())
            .map(|i| Segment2::new(points[i], points[(i + 1) % points.len()]))
            .collect()
    }

    fn total_area(triangles: &[Triangle<f64>]) -> f64 {
        triangles.iter().map(|t| t.area()).sum()
    }

    struct CountDown(Cell<usize>);

    impl CancelSignal for CountDown {
        fn is_cancelled(&self) -> bool {
            let left = self.0.get();
            if left == 0 {
                return true;
            }
            self.0.set(left - 1);
            false
        }
    }

    #[test]
    fn test_too_few_points() {
        let result = triangulate(&[Point2::new(0.0_f64, 0.0), Point2::new(1.0, 0.0)], &[]);
        assert_eq!(
            result.unwrap_err(),
            TriangulationError::DegenerateInput { distinct_points: 2 }
        );
    }

    #[test]
    fn test_collinear_points() {
        let points: Vec<Point2<f64>> = (0..5).map(|i| Point2::new(i as f64, 2.0 * i as f64)).collect();
        assert_eq!(
            triangulate(&points, &[]).unwrap_err(),
            TriangulationError::DegenerateInput { distinct_points: 5 }
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        let points = [
            Point2::new(0.0_f64, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(-0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        let mesh = triangulate(&points, &[]).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangles(false).len(), 1);
    }

    #[test]
    fn test_tolerance_snaps_to_first_point() {
        let points = [
            Point2::new(0.0_f64, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0 + 1e-9, 1e-9),
        ];
        let mesh = ConstrainedDelaunay::new(1e-6)
            .triangulate(&points, &[], &NeverCancel)
            .unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.vertices()[1], Point2::new(1.0, 0.0));
    }

    #[test]
    fn test_non_finite_points_skipped() {
        let points = [
            Point2::new(0.0_f64, 0.0),
            Point2::new(f64::NAN, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, f64::INFINITY),
            Point2::new(0.0, 1.0),
        ];
        let mesh = triangulate(&points, &[]).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_square_is_covered() {
        let square = [
            Point2::new(0.0_f64, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        let mesh = triangulate(&[], &ring(&square)).unwrap();
        let triangles = mesh.triangles(false);
        assert_eq!(triangles.len(), 2);
        assert!((total_area(&triangles) - 16.0).abs() < 1e-12);
        assert!(triangles
            .iter()
            .all(|t| t.orientation() == Orientation::CounterClockwise));
    }

    #[test]
    fn test_constraint_forces_non_delaunay_edge() {
        // The Delaunay diagonal of this thin quad is the short vertical one.
        let points = [
            Point2::new(0.0_f64, 0.0),
            Point2::new(5.0, -1.0),
            Point2::new(10.0, 0.0),
            Point2::new(5.0, 1.0),
        ];
        let free = triangulate(&points, &[]).unwrap();
        assert!(free.contains_edge(points[1], points[3]));
        assert!(!free.contains_edge(points[0], points[2]));

        let forced = Segment2::new(points[0], points[2]);
        let mesh = triangulate(&points, &[forced]).unwrap();
        assert!(mesh.contains_edge(points[0], points[2]));
        assert!(mesh.is_constrained(points[0], points[2]));
        assert_eq!(mesh.constraint_source(points[2], points[0]), Some(0));
        assert!(mesh.is_locally_delaunay());
    }

    #[test]
    fn test_constraint_through_vertex_is_split() {
        let points = [
            Point2::new(0.0_f64, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(2.0, 3.0),
            Point2::new(2.0, -3.0),
        ];
        let segment = Segment2::new(points[0], points[2]);
        let mesh = triangulate(&points, &[segment]).unwrap();
        assert!(mesh.is_constrained(points[0], points[1]));
        assert!(mesh.is_constrained(points[1], points[2]));
        assert!(!mesh.contains_edge(points[0], points[2]));
        assert_eq!(mesh.constrained_edge_count(), 2);
    }

    #[test]
    fn test_crossing_constraints_conflict() {
        let a = Point2::new(0.0_f64, 0.0);
        let b = Point2::new(2.0, 2.0);
        let c = Point2::new(0.0, 2.0);
        let d = Point2::new(2.0, 0.0);
        let segments = [Segment2::new(a, b), Segment2::new(c, d)];
        assert_eq!(
            triangulate(&[], &segments).unwrap_err(),
            TriangulationError::ConstraintConflict { first: 0, second: 1 }
        );
    }

    #[test]
    fn test_shared_endpoints_do_not_conflict() {
        let o = Point2::new(0.0_f64, 0.0);
        let segments = [
            Segment2::new(o, Point2::new(3.0, 0.0)),
            Segment2::new(o, Point2::new(0.0, 3.0)),
            Segment2::new(o, Point2::new(-2.0, -2.0)),
        ];
        let mesh = triangulate(&[], &segments).unwrap();
        assert_eq!(mesh.constrained_edge_count(), 3);
    }

    #[test]
    fn test_long_constraint_across_grid() {
        let mut points = Vec::new();
        for i in 0..6 {
            for j in 0..6 {
                points.push(Point2::new(i as f64, j as f64 + 0.1 * i as f64));
            }
        }
        let segment = Segment2::new(Point2::new(-0.5, 2.6), Point2::new(5.5, 3.1));
        let mesh = triangulate(&points, &[segment]).unwrap();
        assert!(mesh.is_constrained(segment.start, segment.end));
        assert!(mesh.is_locally_delaunay());
        assert_eq!(mesh.vertex_count(), points.len() + 2);
        assert_eq!(mesh.constrained_edge_count(), 1);
    }

    #[test]
    fn test_delaunay_without_constraints() {
        let mut state = 0x2545_f491_4f6c_dd1d_u64;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 10_000) as f64 / 100.0
        };
        let points: Vec<Point2<f64>> = (0..200).map(|_| Point2::new(next(), next())).collect();
        let mesh = triangulate(&points, &[]).unwrap();
        assert!(mesh.is_locally_delaunay());
        // Euler: every inserted vertex adds two faces
        assert_eq!(mesh.face_count(), 1 + 2 * mesh.vertex_count());
    }

    #[test]
    fn test_cancel_reports_progress() {
        let square = [
            Point2::new(0.0_f64, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let signal = CountDown(Cell::new(2));
        let result = ConstrainedDelaunay::default().triangulate(&[], &ring(&square), &signal);
        assert_eq!(
            result.unwrap_err(),
            TriangulationError::Cancelled {
                completed: 2,
                total: 8
            }
        );
    }

    #[test]
    fn test_f32_input() {
        let points = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 1.0),
            Point2::new(0.5, 0.3),
        ];
        let mesh = triangulate(&points, &[]).unwrap();
        assert_eq!(mesh.triangles(false).len(), 3);
    }
}
