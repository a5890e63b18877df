//! 2D point type.

use super::Vec2;
use num_traits::Float;
use std::ops::{Add, Sub};

/// A 2D point with x and y coordinates.
///
/// Generic over floating-point types (`f32` or `f64`). Equality is exact
/// coordinate equality; no epsilon is involved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2<F> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Point2<F> {
    /// Creates a new point.
    #[inline]
    pub fn new(x: F, y: F) -> Self {
        Self { x, y }
    }

    /// Creates a point at the origin (0, 0).
    #[inline]
    pub fn origin() -> Self {
        Self {
            x: F::zero(),
            y: F::zero(),
        }
    }

    /// Computes the squared distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> F {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Computes the Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> F {
        self.distance_squared(other).sqrt()
    }

    /// Linearly interpolates between `self` and `other`.
    #[inline]
    pub fn lerp(self, other: Self, t: F) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Returns the midpoint between `self` and `other`.
    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        let two = F::one() + F::one();
        Self {
            x: (self.x + other.x) / two,
            y: (self.y + other.y) / two,
        }
    }

    /// Returns `true` if both coordinates are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Converts this point to a vector from the origin.
    #[inline]
    pub fn to_vec(self) -> Vec2<F> {
        Vec2::new(self.x, self.y)
    }

    /// Returns the coordinates widened to `f64`.
    ///
    /// Widening `f32` to `f64` is exact, so predicates evaluated on the
    /// result see the same point.
    #[inline]
    pub fn to_f64(self) -> (f64, f64) {
        (
            self.x.to_f64().unwrap_or(f64::NAN),
            self.y.to_f64().unwrap_or(f64::NAN),
        )
    }

    /// Hashable key for exact coordinate identity.
    #[inline]
    pub(crate) fn key(self) -> PointKey {
        let (x, y) = self.to_f64();
        // -0.0 and 0.0 compare equal, so they must hash equal too
        PointKey((x + 0.0).to_bits(), (y + 0.0).to_bits())
    }
}

/// Bit pattern of a point's coordinates, usable as a hash map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct PointKey(u64, u64);

// Point - Point = Vec2
impl<F: Float> Sub for Point2<F> {
    type Output = Vec2<F>;

    #[inline]
    fn sub(self, other: Self) -> Vec2<F> {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

// Point + Vec2 = Point
impl<F: Float> Add<Vec2<F>> for Point2<F> {
    type Output = Self;

    #[inline]
    fn add(self, v: Vec2<F>) -> Self {
        Self {
            x: self.x + v.x,
            y: self.y + v.y,
        }
    }
}

impl<F: Float> Default for Point2<F> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<F: Float> From<(F, F)> for Point2<F> {
    fn from((x, y): (F, F)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance() {
        let a: Point2<f64> = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(a.distance_squared(b), 25.0);
        assert_relative_eq!(a.distance(b), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_midpoint_and_lerp() {
        let a: Point2<f64> = Point2::new(0.0, 2.0);
        let b = Point2::new(4.0, 6.0);
        assert_eq!(a.midpoint(b), Point2::new(2.0, 4.0));
        assert_eq!(a.lerp(b, 0.25), Point2::new(1.0, 3.0));
    }

    #[test]
    fn test_point_vector_arithmetic() {
        let a: Point2<f64> = Point2::new(1.0, 1.0);
        let b = Point2::new(4.0, 5.0);
        let v = b - a;
        assert_eq!(v, Vec2::new(3.0, 4.0));
        assert_eq!(a + v, b);
    }

    #[test]
    fn test_key_treats_signed_zero_as_equal() {
        let a: Point2<f64> = Point2::new(0.0, -0.0);
        let b: Point2<f64> = Point2::new(-0.0, 0.0);
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), Point2::new(0.0, 1e-300).key());
    }

    #[test]
    fn test_f32_widening_is_exact() {
        let p: Point2<f32> = Point2::new(0.1, 0.2);
        let (x, y) = p.to_f64();
        assert_eq!(x as f32, 0.1);
        assert_eq!(y as f32, 0.2);
        assert!(p.is_finite());
        assert!(!Point2::new(f32::NAN, 0.0).is_finite());
    }
}
