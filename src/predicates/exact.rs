//! Sign-exact predicates.
//!
//! Orientation and in-circle tests are evaluated with Shewchuk's adaptive
//! precision arithmetic (`robust` crate): a fast floating-point filter, with
//! exact expansion arithmetic only when the filter cannot certify the sign.
//! Coordinates are widened to `f64` first, which is exact for `f32` input.
//!
//! # Example
//!
//! ```
//! use makevalid::predicates::{orientation, Orientation};
//! use makevalid::Point2;
//!
//! let a = Point2::new(12.0_f64, 12.0);
//! let b = Point2::new(24.0, 24.0);
//! // One ulp above the line y = x; naive evaluation rounds this to zero.
//! let c = Point2::new(0.5, f64::from_bits(0.5_f64.to_bits() + 1));
//!
//! assert_eq!(orientation(a, b, c), Orientation::CounterClockwise);
//! ```

use crate::primitives::{Point2, Segment2};
use num_traits::Float;
use robust::Coord;

/// Result of an orientation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Points are counter-clockwise (positive area).
    CounterClockwise,
    /// Points are clockwise (negative area).
    Clockwise,
    /// Points are collinear (or coincident).
    Collinear,
}

impl Orientation {
    /// Returns the orientation seen from the other side.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Orientation::CounterClockwise => Orientation::Clockwise,
            Orientation::Clockwise => Orientation::CounterClockwise,
            Orientation::Collinear => Orientation::Collinear,
        }
    }

    #[inline]
    fn from_sign(det: f64) -> Self {
        if det > 0.0 {
            Orientation::CounterClockwise
        } else if det < 0.0 {
            Orientation::Clockwise
        } else {
            Orientation::Collinear
        }
    }
}

#[inline]
fn coord<F: Float>(p: Point2<F>) -> Coord<f64> {
    let (x, y) = p.to_f64();
    Coord { x, y }
}

/// Exact orientation of the triangle `a`, `b`, `c`.
///
/// `CounterClockwise` if `c` lies strictly left of the directed line `a -> b`,
/// `Clockwise` if strictly right, `Collinear` otherwise (including coincident
/// points).
#[inline]
pub fn orientation<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>) -> Orientation {
    Orientation::from_sign(robust::orient2d(coord(a), coord(b), coord(c)))
}

/// Returns `true` iff `p` lies strictly inside the circle through `a`, `b`, `c`.
///
/// The winding of `a`, `b`, `c` does not matter. Points on the circle and
/// degenerate (collinear) triangles give `false`.
///
/// # Example
///
/// ```
/// use makevalid::predicates::in_circumcircle;
/// use makevalid::Point2;
///
/// let a = Point2::new(0.0_f64, 0.0);
/// let b = Point2::new(1.0, 0.0);
/// let c = Point2::new(0.0, 1.0);
///
/// assert!(in_circumcircle(a, b, c, Point2::new(0.5, 0.5)));
/// // Opposite corner of the square is exactly on the circle.
/// assert!(!in_circumcircle(a, b, c, Point2::new(1.0, 1.0)));
/// ```
pub fn in_circumcircle<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>, p: Point2<F>) -> bool {
    let det = robust::incircle(coord(a), coord(b), coord(c), coord(p));
    match orientation(a, b, c) {
        Orientation::CounterClockwise => det > 0.0,
        Orientation::Clockwise => det < 0.0,
        Orientation::Collinear => false,
    }
}

/// Returns `true` iff `p` is collinear with `a` and `b` and strictly between them.
pub fn point_on_segment_exact<F: Float>(p: Point2<F>, a: Point2<F>, b: Point2<F>) -> bool {
    if p == a || p == b || a == b {
        return false;
    }
    if orientation(a, b, p) != Orientation::Collinear {
        return false;
    }
    if a.x != b.x {
        a.x.min(b.x) < p.x && p.x < a.x.max(b.x)
    } else {
        a.y.min(b.y) < p.y && p.y < a.y.max(b.y)
    }
}

/// Returns `true` iff the two segments properly cross at a single point
/// interior to both.
///
/// Sharing an endpoint, touching (one endpoint on the other segment) and
/// collinear overlap are not crossings.
pub fn segments_cross<F: Float>(s1: Segment2<F>, s2: Segment2<F>) -> bool {
    let o1 = orientation(s1.start, s1.end, s2.start);
    let o2 = orientation(s1.start, s1.end, s2.end);
    if o1 == Orientation::Collinear || o2 == Orientation::Collinear || o1 == o2 {
        return false;
    }
    let o3 = orientation(s2.start, s2.end, s1.start);
    let o4 = orientation(s2.start, s2.end, s1.end);
    o3 != Orientation::Collinear && o4 != Orientation::Collinear && o3 != o4
}

#[cfg(test)]
mod tests {
    use super::*;

    fn above_half() -> f64 {
        f64::from_bits(0.5_f64.to_bits() + 1)
    }

    #[test]
    fn test_orientation_basic() {
        let a: Point2<f64> = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert_eq!(orientation(a, b, Point2::new(0.5, 1.0)), Orientation::CounterClockwise);
        assert_eq!(orientation(a, b, Point2::new(0.5, -1.0)), Orientation::Clockwise);
        assert_eq!(orientation(a, b, Point2::new(7.0, 0.0)), Orientation::Collinear);
    }

    #[test]
    fn test_orientation_coincident_points_are_collinear() {
        let a: Point2<f64> = Point2::new(3.0, 4.0);
        assert_eq!(orientation(a, a, a), Orientation::Collinear);
        assert_eq!(orientation(a, a, Point2::new(0.0, 1.0)), Orientation::Collinear);
    }

    #[test]
    fn test_orientation_near_collinear_is_sign_exact() {
        let a: Point2<f64> = Point2::new(12.0, 12.0);
        let b = Point2::new(24.0, 24.0);
        let up = Point2::new(0.5, above_half());
        let down = Point2::new(above_half(), 0.5);

        // Plain evaluation cancels to zero here.
        assert_eq!((b - a).cross(up - a), 0.0);

        assert_eq!(orientation(a, b, up), Orientation::CounterClockwise);
        assert_eq!(orientation(a, b, down), Orientation::Clockwise);
        assert_eq!(orientation(b, a, up), Orientation::Clockwise);
    }

    #[test]
    fn test_orientation_f32() {
        let a: Point2<f32> = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 1.0);
        assert_eq!(orientation(a, b, Point2::new(0.0, 1.0)), Orientation::CounterClockwise);
    }

    #[test]
    fn test_reversed_orientation() {
        assert_eq!(Orientation::Clockwise.reversed(), Orientation::CounterClockwise);
        assert_eq!(Orientation::Collinear.reversed(), Orientation::Collinear);
    }

    #[test]
    fn test_in_circumcircle_either_winding() {
        let a: Point2<f64> = Point2::new(0.0, 0.0);
        let b = Point2::new(4.0, 0.0);
        let c = Point2::new(0.0, 4.0);
        let inside = Point2::new(1.0, 1.0);
        let outside = Point2::new(5.0, 5.0);

        assert!(in_circumcircle(a, b, c, inside));
        assert!(in_circumcircle(a, c, b, inside));
        assert!(!in_circumcircle(a, b, c, outside));
        assert!(!in_circumcircle(a, c, b, outside));
    }

    #[test]
    fn test_in_circumcircle_cocircular_is_not_inside() {
        // All four corners of a square lie on one circle.
        let a: Point2<f64> = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(1.0, 1.0);
        assert!(!in_circumcircle(a, b, c, Point2::new(0.0, 1.0)));
    }

    #[test]
    fn test_in_circumcircle_degenerate_triangle() {
        let a: Point2<f64> = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(2.0, 0.0);
        assert!(!in_circumcircle(a, b, c, Point2::new(1.0, 0.1)));
        assert!(!in_circumcircle(a, a, a, a));
    }

    #[test]
    fn test_point_on_segment_exact() {
        let a: Point2<f64> = Point2::new(0.0, 0.0);
        let b = Point2::new(4.0, 2.0);
        assert!(point_on_segment_exact(Point2::new(2.0, 1.0), a, b));
        assert!(!point_on_segment_exact(a, a, b));
        assert!(!point_on_segment_exact(Point2::new(6.0, 3.0), a, b));
        assert!(!point_on_segment_exact(Point2::new(2.0, 1.5), a, b));

        let v = Point2::new(0.0, 5.0);
        assert!(point_on_segment_exact(Point2::new(0.0, 1.0), a, v));
        assert!(!point_on_segment_exact(Point2::new(0.0, -1.0), a, v));
    }

    #[test]
    fn test_segments_cross() {
        let s1: Segment2<f64> = Segment2::from_coords(0.0, 0.0, 2.0, 2.0);
        let s2 = Segment2::from_coords(0.0, 2.0, 2.0, 0.0);
        assert!(segments_cross(s1, s2));
        assert!(segments_cross(s2, s1));
    }

    #[test]
    fn test_segments_sharing_endpoint_do_not_cross() {
        let s1: Segment2<f64> = Segment2::from_coords(0.0, 0.0, 2.0, 2.0);
        let s2 = Segment2::from_coords(2.0, 2.0, 4.0, 0.0);
        assert!(!segments_cross(s1, s2));
    }

    #[test]
    fn test_touching_and_overlapping_segments_do_not_cross() {
        let s1: Segment2<f64> = Segment2::from_coords(0.0, 0.0, 4.0, 0.0);
        let t_junction = Segment2::from_coords(2.0, 0.0, 2.0, 3.0);
        let overlap = Segment2::from_coords(1.0, 0.0, 6.0, 0.0);
        let apart = Segment2::from_coords(0.0, 1.0, 4.0, 1.0);
        assert!(!segments_cross(s1, t_junction));
        assert!(!segments_cross(s1, overlap));
        assert!(!segments_cross(s1, apart));
    }
}
