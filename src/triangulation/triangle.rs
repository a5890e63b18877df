//! Output triangle type.

use crate::predicates::{orientation, Orientation};
use crate::primitives::Point2;
use num_traits::Float;

/// A triangle given by its three corner points, in counter-clockwise order.
///
/// This is what the triangulator hands to the classifier and the
/// reconstructor; it carries no mesh topology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle<F> {
    /// First vertex.
    pub a: Point2<F>,
    /// Second vertex.
    pub b: Point2<F>,
    /// Third vertex.
    pub c: Point2<F>,
}

impl<F: Float> Triangle<F> {
    /// Creates a triangle from three points.
    #[inline]
    pub fn new(a: Point2<F>, b: Point2<F>, c: Point2<F>) -> Self {
        Self { a, b, c }
    }

    /// Returns the three vertices in order.
    #[inline]
    pub fn vertices(&self) -> [Point2<F>; 3] {
        [self.a, self.b, self.c]
    }

    /// Arithmetic mean of the three vertices.
    ///
    /// For a non-degenerate triangle this lies strictly inside it.
    #[inline]
    pub fn centroid(&self) -> Point2<F> {
        let three = F::one() + F::one() + F::one();
        Point2::new(
            (self.a.x + self.b.x + self.c.x) / three,
            (self.a.y + self.b.y + self.c.y) / three,
        )
    }

    /// Signed area, positive for counter-clockwise triangles.
    #[inline]
    pub fn signed_area(&self) -> F {
        let two = F::one() + F::one();
        (self.b - self.a).cross(self.c - self.a) / two
    }

    /// Absolute area.
    #[inline]
    pub fn area(&self) -> F {
        self.signed_area().abs()
    }

    /// Exact orientation of the corners.
    #[inline]
    pub fn orientation(&self) -> Orientation {
        orientation(self.a, self.b, self.c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> Triangle<f64> {
        Triangle::new(
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(0.0, 3.0),
        )
    }

    #[test]
    fn test_centroid_and_area() {
        let tri = sample();
        assert_eq!(tri.centroid(), Point2::new(1.0, 1.0));
        assert_relative_eq!(tri.signed_area(), 4.5);
        assert_eq!(tri.orientation(), Orientation::CounterClockwise);
        assert_eq!(tri.vertices(), [tri.a, tri.b, tri.c]);
    }

    #[test]
    fn test_clockwise_area_is_negative() {
        let tri = sample();
        let cw = Triangle::new(tri.a, tri.c, tri.b);
        assert!(cw.signed_area() < 0.0);
        assert_relative_eq!(cw.area(), 4.5);
    }
}
