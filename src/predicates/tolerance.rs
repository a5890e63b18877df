//! Geometric predicates with explicit tolerance.
//!
//! These are used while preparing raw input (noding rings into segments),
//! where nearly-touching edges should be treated as touching. The
//! triangulator never uses them.

use super::exact::Orientation;
use crate::primitives::{Point2, Segment2};
use num_traits::Float;

/// Computes the orientation of three points with tolerance.
///
/// `eps` is compared against the absolute value of the cross product (twice
/// the signed area of `a`, `b`, `c`).
#[inline]
pub fn orient2d<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>, eps: F) -> Orientation {
    let cross = (b - a).cross(c - a);

    if cross > eps {
        Orientation::CounterClockwise
    } else if cross < -eps {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Returns `true` if `p` is within distance `eps` of the segment.
#[inline]
pub fn point_on_segment<F: Float>(p: Point2<F>, segment: Segment2<F>, eps: F) -> bool {
    segment.distance_squared_to_point(p) <= eps * eps
}

/// Result of a segment intersection test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection<F> {
    /// Segments do not intersect.
    None,
    /// Segments intersect at a single point.
    Point {
        /// The intersection point.
        point: Point2<F>,
        /// Parameter along first segment (0 = start, 1 = end).
        t1: F,
        /// Parameter along second segment (0 = start, 1 = end).
        t2: F,
    },
    /// Segments are collinear and share a stretch of positive length.
    Overlapping {
        /// Start of the overlap, on the first segment.
        start: Point2<F>,
        /// End of the overlap, on the first segment.
        end: Point2<F>,
        /// Parameter of `start` along the first segment.
        t_start: F,
        /// Parameter of `end` along the first segment.
        t_end: F,
    },
}

/// Tests if two line segments intersect, with tolerance.
///
/// `eps` is used both as the parallelism threshold on the cross product of
/// the directions and as the distance tolerance for collinearity.
pub fn segments_intersect<F: Float>(
    s1: Segment2<F>,
    s2: Segment2<F>,
    eps: F,
) -> SegmentIntersection<F> {
    let d1 = s1.direction();
    let d2 = s2.direction();
    let cross = d1.cross(d2);
    let d = s2.start - s1.start;
    let eps_sq = eps * eps;

    if cross.abs() <= eps {
        let len_sq = d1.magnitude_squared();
        if len_sq <= eps_sq {
            if point_on_segment(s1.start, s2, eps) {
                return SegmentIntersection::Point {
                    point: s1.start,
                    t1: F::zero(),
                    t2: s2.closest_point(s1.start).1,
                };
            }
            return SegmentIntersection::None;
        }

        // Distance from s2.start to s1's supporting line
        let offset = d1.cross(d);
        if offset * offset > eps_sq * len_sq {
            return SegmentIntersection::None;
        }

        // Project s2 onto s1's line
        let t_a = (s2.start - s1.start).dot(d1) / len_sq;
        let t_b = (s2.end - s1.start).dot(d1) / len_sq;
        let (t_min, t_max) = if t_a <= t_b { (t_a, t_b) } else { (t_b, t_a) };

        let overlap_start = t_min.max(F::zero());
        let overlap_end = t_max.min(F::one());

        if overlap_start > overlap_end + eps {
            return SegmentIntersection::None;
        }

        if (overlap_end - overlap_start).abs() <= eps {
            let point = s1.point_at(overlap_start);
            return SegmentIntersection::Point {
                point,
                t1: overlap_start,
                t2: s2.closest_point(point).1,
            };
        }

        return SegmentIntersection::Overlapping {
            start: s1.point_at(overlap_start),
            end: s1.point_at(overlap_end),
            t_start: overlap_start,
            t_end: overlap_end,
        };
    }

    // Cramer's rule on s1.start + t1 * d1 = s2.start + t2 * d2
    let t1 = d.cross(d2) / cross;
    let t2 = d.cross(d1) / cross;

    let lo = -eps;
    let hi = F::one() + eps;
    if t1 >= lo && t1 <= hi && t2 >= lo && t2 <= hi {
        let t1 = t1.max(F::zero()).min(F::one());
        SegmentIntersection::Point {
            point: s1.point_at(t1),
            t1,
            t2: t2.max(F::zero()).min(F::one()),
        }
    } else {
        SegmentIntersection::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_orient2d_with_tolerance() {
        let a: Point2<f64> = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert_eq!(orient2d(a, b, Point2::new(0.5, 1.0), 1e-10), Orientation::CounterClockwise);
        assert_eq!(orient2d(a, b, Point2::new(0.5, -1.0), 1e-10), Orientation::Clockwise);
        assert_eq!(orient2d(a, b, Point2::new(0.5, 1e-12), 1e-10), Orientation::Collinear);
    }

    #[test]
    fn test_point_on_segment_near() {
        let seg: Segment2<f64> = Segment2::from_coords(0.0, 0.0, 10.0, 0.0);
        let p = Point2::new(5.0, 0.5);
        assert!(point_on_segment(p, seg, 1.0));
        assert!(!point_on_segment(p, seg, 0.1));
        assert!(!point_on_segment(Point2::new(15.0, 0.0), seg, 1e-10));
    }

    #[test]
    fn test_crossing_segments() {
        let s1: Segment2<f64> = Segment2::from_coords(0.0, 0.0, 10.0, 10.0);
        let s2 = Segment2::from_coords(0.0, 10.0, 10.0, 0.0);

        match segments_intersect(s1, s2, 1e-10) {
            SegmentIntersection::Point { point, t1, t2 } => {
                assert_relative_eq!(point.x, 5.0, epsilon = 1e-10);
                assert_relative_eq!(point.y, 5.0, epsilon = 1e-10);
                assert_relative_eq!(t1, 0.5, epsilon = 1e-10);
                assert_relative_eq!(t2, 0.5, epsilon = 1e-10);
            }
            other => panic!("expected point intersection, got {:?}", other),
        }
    }

    #[test]
    fn test_shared_endpoint() {
        let s1: Segment2<f64> = Segment2::from_coords(0.0, 0.0, 5.0, 5.0);
        let s2 = Segment2::from_coords(5.0, 5.0, 10.0, 0.0);

        match segments_intersect(s1, s2, 1e-10) {
            SegmentIntersection::Point { t1, t2, .. } => {
                assert_relative_eq!(t1, 1.0, epsilon = 1e-10);
                assert_relative_eq!(t2, 0.0, epsilon = 1e-10);
            }
            other => panic!("expected point intersection, got {:?}", other),
        }
    }

    #[test]
    fn test_parallel_and_disjoint() {
        let s1: Segment2<f64> = Segment2::from_coords(0.0, 0.0, 10.0, 0.0);
        let parallel = Segment2::from_coords(0.0, 1.0, 10.0, 1.0);
        let beyond = Segment2::from_coords(12.0, 0.0, 15.0, 0.0);
        let skew = Segment2::from_coords(6.0, 4.0, 10.0, 1.0);
        assert_eq!(segments_intersect(s1, parallel, 1e-10), SegmentIntersection::None);
        assert_eq!(segments_intersect(s1, beyond, 1e-10), SegmentIntersection::None);
        assert_eq!(segments_intersect(s1, skew, 1e-10), SegmentIntersection::None);
    }

    #[test]
    fn test_collinear_overlap_reports_parameters() {
        let s1: Segment2<f64> = Segment2::from_coords(0.0, 0.0, 10.0, 0.0);
        let s2 = Segment2::from_coords(15.0, 0.0, 5.0, 0.0);

        match segments_intersect(s1, s2, 1e-10) {
            SegmentIntersection::Overlapping {
                start,
                end,
                t_start,
                t_end,
            } => {
                assert_relative_eq!(start.x, 5.0, epsilon = 1e-10);
                assert_relative_eq!(end.x, 10.0, epsilon = 1e-10);
                assert_relative_eq!(t_start, 0.5, epsilon = 1e-10);
                assert_relative_eq!(t_end, 1.0, epsilon = 1e-10);
            }
            other => panic!("expected overlap, got {:?}", other),
        }
    }

    #[test]
    fn test_collinear_touching() {
        let s1: Segment2<f64> = Segment2::from_coords(0.0, 0.0, 5.0, 0.0);
        let s2 = Segment2::from_coords(5.0, 0.0, 10.0, 0.0);

        match segments_intersect(s1, s2, 1e-10) {
            SegmentIntersection::Point { point, .. } => assert_relative_eq!(point.x, 5.0),
            other => panic!("expected touching point, got {:?}", other),
        }
    }
}
