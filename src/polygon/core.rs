//! Polygon and multipolygon types produced by the reconstructor.

use super::ring::{Containment, Ring};
use crate::primitives::Point2;
use num_traits::Float;

/// A shell ring with zero or more hole rings inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonWithHoles<F> {
    /// Outer boundary.
    pub shell: Ring<F>,
    /// Inner boundaries, each nested inside `shell`.
    pub holes: Vec<Ring<F>>,
}

impl<F: Float> PolygonWithHoles<F> {
    /// Creates a polygon from a shell and holes.
    #[inline]
    pub fn new(shell: Ring<F>, holes: Vec<Ring<F>>) -> Self {
        Self { shell, holes }
    }

    /// Shell area minus hole areas.
    pub fn area(&self) -> F {
        self.holes
            .iter()
            .fold(self.shell.area(), |acc, hole| acc - hole.area())
    }

    /// Locates a point: inside the shell and outside every hole counts as
    /// inside.
    pub fn contains(&self, p: Point2<F>) -> Containment {
        match self.shell.contains(p) {
            Containment::Inside => {}
            other => return other,
        }
        for hole in &self.holes {
            match hole.contains(p) {
                Containment::Outside => {}
                Containment::Inside => return Containment::Outside,
                Containment::OnBoundary => return Containment::OnBoundary,
            }
        }
        Containment::Inside
    }
}

/// An ordered list of polygons. An empty multipolygon means no area was kept.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPolygon<F> {
    /// The polygons, in reconstruction order.
    pub polygons: Vec<PolygonWithHoles<F>>,
}

impl<F> Default for MultiPolygon<F> {
    fn default() -> Self {
        Self {
            polygons: Vec::new(),
        }
    }
}

impl<F: Float> MultiPolygon<F> {
    /// Creates a multipolygon from its parts.
    #[inline]
    pub fn new(polygons: Vec<PolygonWithHoles<F>>) -> Self {
        Self { polygons }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PolygonWithHoles<F>> {
        self.polygons.iter()
    }

    /// Total area over all polygons.
    pub fn area(&self) -> F {
        self.polygons.iter().fold(F::zero(), |acc, p| acc + p.area())
    }

    /// Number of rings, shells and holes together.
    pub fn ring_count(&self) -> usize {
        self.polygons.iter().map(|p| 1 + p.holes.len()).sum()
    }

    /// Locates a point against the union of the polygons.
    pub fn contains(&self, p: Point2<F>) -> Containment {
        let mut result = Containment::Outside;
        for polygon in &self.polygons {
            match polygon.contains(p) {
                Containment::Inside => return Containment::Inside,
                Containment::OnBoundary => result = Containment::OnBoundary,
                Containment::Outside => {}
            }
        }
        result
    }
}

impl<'a, F> IntoIterator for &'a MultiPolygon<F> {
    type Item = &'a PolygonWithHoles<F>;
    type IntoIter = std::slice::Iter<'a, PolygonWithHoles<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.polygons.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::RingRole;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64, size: f64, role: RingRole) -> Ring<f64> {
        let mut ring = Ring::new(
            vec![
                Point2::new(x, y),
                Point2::new(x + size, y),
                Point2::new(x + size, y + size),
                Point2::new(x, y + size),
            ],
            role,
        );
        if role == RingRole::Hole {
            ring.reverse();
        }
        ring
    }

    #[test]
    fn test_area_subtracts_holes() {
        let polygon = PolygonWithHoles::new(
            square(0.0, 0.0, 10.0, RingRole::Shell),
            vec![square(2.0, 2.0, 3.0, RingRole::Hole)],
        );
        assert_relative_eq!(polygon.area(), 91.0);
    }

    #[test]
    fn test_contains_respects_holes() {
        let polygon = PolygonWithHoles::new(
            square(0.0, 0.0, 10.0, RingRole::Shell),
            vec![square(2.0, 2.0, 3.0, RingRole::Hole)],
        );
        assert_eq!(polygon.contains(Point2::new(1.0, 1.0)), Containment::Inside);
        assert_eq!(polygon.contains(Point2::new(3.0, 3.0)), Containment::Outside);
        assert_eq!(polygon.contains(Point2::new(2.0, 3.0)), Containment::OnBoundary);
        assert_eq!(polygon.contains(Point2::new(11.0, 3.0)), Containment::Outside);
    }

    #[test]
    fn test_multipolygon_union() {
        let multi = MultiPolygon::new(vec![
            PolygonWithHoles::new(square(0.0, 0.0, 1.0, RingRole::Shell), Vec::new()),
            PolygonWithHoles::new(square(5.0, 0.0, 2.0, RingRole::Shell), Vec::new()),
        ]);
        assert_eq!(multi.len(), 2);
        assert_eq!(multi.ring_count(), 2);
        assert_relative_eq!(multi.area(), 5.0);
        assert_eq!(multi.contains(Point2::new(6.0, 1.0)), Containment::Inside);
        assert_eq!(multi.contains(Point2::new(3.0, 1.0)), Containment::Outside);
        assert!(MultiPolygon::<f64>::default().is_empty());
    }
}
