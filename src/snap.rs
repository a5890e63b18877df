//! Vertex snapping shared by noding and triangulation.
//!
//! Each incoming point is replaced by the earliest registered point within
//! the tolerance, found through a hash grid with cells as wide as the
//! tolerance. Registered points are therefore always more than the tolerance
//! apart. A zero tolerance merges only identical points (`-0.0 == 0.0`).

use crate::primitives::{Point2, PointKey};
use num_traits::Float;
use std::collections::HashMap;

/// Assigns each incoming point the index of its representative.
#[derive(Debug, Clone)]
pub(crate) struct Snapper<F> {
    tolerance: F,
    points: Vec<Point2<F>>,
    exact: HashMap<PointKey, usize>,
    grid: HashMap<(i64, i64), Vec<usize>>,
}

impl<F: Float> Snapper<F> {
    /// Negative or non-finite tolerances act as zero.
    pub(crate) fn new(tolerance: F) -> Self {
        let tolerance = if tolerance.is_finite() && tolerance > F::zero() {
            tolerance
        } else {
            F::zero()
        };
        Self {
            tolerance,
            points: Vec::new(),
            exact: HashMap::new(),
            grid: HashMap::new(),
        }
    }

    pub(crate) fn tolerance(&self) -> F {
        self.tolerance
    }

    /// Registered points, in registration order.
    pub(crate) fn points(&self) -> &[Point2<F>] {
        &self.points
    }

    pub(crate) fn into_points(self) -> Vec<Point2<F>> {
        self.points
    }

    /// Index of the representative of `p`, registering `p` if none is near.
    /// Non-finite points give `None`.
    pub(crate) fn resolve(&mut self, p: Point2<F>) -> Option<usize> {
        if !p.is_finite() {
            return None;
        }
        if let Some(&index) = self.exact.get(&p.key()) {
            return Some(index);
        }

        let cell = self.cell(p);
        if let Some((cx, cy)) = cell {
            let tol_sq = self.tolerance * self.tolerance;
            let near = (-1..=1)
                .flat_map(|dx| {
                    (-1..=1).map(move |dy| (cx.saturating_add(dx), cy.saturating_add(dy)))
                })
                .filter_map(|key| self.grid.get(&key))
                .flatten()
                .copied()
                .filter(|&i| self.points[i].distance_squared(p) <= tol_sq)
                .min();
            if let Some(index) = near {
                self.exact.insert(p.key(), index);
                return Some(index);
            }
        }

        let index = self.points.len();
        self.points.push(p);
        self.exact.insert(p.key(), index);
        if let Some(cell) = cell {
            self.grid.entry(cell).or_default().push(index);
        }
        Some(index)
    }

    /// The representative of `p` itself.
    pub(crate) fn snap(&mut self, p: Point2<F>) -> Option<Point2<F>> {
        self.resolve(p).map(|i| self.points[i])
    }

    fn cell(&self, p: Point2<F>) -> Option<(i64, i64)> {
        if self.tolerance <= F::zero() {
            return None;
        }
        let x = (p.x / self.tolerance).floor().to_i64()?;
        let y = (p.y / self.tolerance).floor().to_i64()?;
        Some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_merges_signed_zero_only() {
        let mut snapper = Snapper::new(0.0);
        assert_eq!(snapper.resolve(Point2::new(0.0_f64, 1.0)), Some(0));
        assert_eq!(snapper.resolve(Point2::new(-0.0, 1.0)), Some(0));
        assert_eq!(snapper.resolve(Point2::new(1e-300, 1.0)), Some(1));
        assert_eq!(snapper.resolve(Point2::new(f64::NAN, 1.0)), None);
    }

    #[test]
    fn test_earliest_point_within_tolerance_wins() {
        let mut snapper = Snapper::new(0.5);
        let first = Point2::new(1.0_f64, 1.0);
        snapper.resolve(first);
        snapper.resolve(Point2::new(1.45, 1.0));
        // Within reach of both, the earlier one is kept.
        assert_eq!(snapper.snap(Point2::new(1.2, 1.0)), Some(first));
        assert_eq!(snapper.points().len(), 1);
        // Across a cell border.
        assert_eq!(snapper.snap(Point2::new(0.9, 0.6)), Some(first));
        assert_eq!(snapper.into_points(), vec![first]);
    }
}
