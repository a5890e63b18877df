//! A membership oracle over the original, possibly invalid, rings.
//!
//! Points on any ring edge are [`Label::Boundary`]. Elsewhere the fill rule
//! decides: even-odd counts edge crossings of a ray, non-zero sums signed
//! crossings. Both tests use the exact orientation predicate.
//!
//! # Example
//!
//! ```
//! use makevalid::classify::{Label, MembershipOracle};
//! use makevalid::oracle::{FillRule, RingOracle};
//! use makevalid::Point2;
//!
//! // A ring traversed twice: even-odd sees two crossings, non-zero a winding of 2.
//! let square = vec![
//!     Point2::new(0.0_f64, 0.0),
//!     Point2::new(2.0, 0.0),
//!     Point2::new(2.0, 2.0),
//!     Point2::new(0.0, 2.0),
//! ];
//! let rings = [square.clone(), square];
//! let centre = Point2::new(1.0, 1.0);
//!
//! let even_odd = RingOracle::new(&rings, FillRule::EvenOdd);
//! let non_zero = RingOracle::new(&rings, FillRule::NonZero);
//! assert_eq!(even_odd.membership_of(centre).unwrap(), Label::Outside);
//! assert_eq!(non_zero.membership_of(centre).unwrap(), Label::Inside);
//! ```

use crate::classify::{Label, MembershipOracle};
use crate::error::OracleError;
use crate::predicates::{orientation, point_on_segment_exact, Orientation};
use crate::primitives::Point2;
use num_traits::Float;

/// How overlapping or self-intersecting rings decide what is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillRule {
    /// Filled where a ray crosses the rings an odd number of times.
    #[default]
    EvenOdd,
    /// Filled where the winding number is non-zero.
    NonZero,
}

/// Point-in-rings test used as the default oracle by [`crate::make_valid`].
#[derive(Debug, Clone, PartialEq)]
pub struct RingOracle<F> {
    rings: Vec<Vec<Point2<F>>>,
    fill_rule: FillRule,
}

impl<F: Float> RingOracle<F> {
    /// Creates an oracle over `rings`. Rings may be open or closed; rings with
    /// fewer than three points are ignored.
    pub fn new<R: AsRef<[Point2<F>]>>(rings: &[R], fill_rule: FillRule) -> Self {
        let rings = rings
            .iter()
            .filter(|ring| ring.as_ref().len() >= 3)
            .map(|ring| {
                let mut points = ring.as_ref().to_vec();
                if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
                    if first != last {
                        points.push(first);
                    }
                }
                points
            })
            .collect();
        Self { rings, fill_rule }
    }

    /// The fill rule in use.
    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    /// Labels a point.
    pub fn label(&self, p: Point2<F>) -> Label {
        let mut crossings = 0usize;
        let mut winding = 0i64;

        for ring in &self.rings {
            for w in ring.windows(2) {
                let (a, b) = (w[0], w[1]);
                if a == p || point_on_segment_exact(p, a, b) {
                    return Label::Boundary;
                }
                if a.y <= p.y {
                    if b.y > p.y && orientation(a, b, p) == Orientation::CounterClockwise {
                        crossings += 1;
                        winding += 1;
                    }
                } else if b.y <= p.y && orientation(a, b, p) == Orientation::Clockwise {
                    crossings += 1;
                    winding -= 1;
                }
            }
        }

        let filled = match self.fill_rule {
            FillRule::EvenOdd => crossings % 2 == 1,
            FillRule::NonZero => winding != 0,
        };
        if filled {
            Label::Inside
        } else {
            Label::Outside
        }
    }
}

impl<F: Float> MembershipOracle<F> for RingOracle<F> {
    #[inline]
    fn membership_of(&self, point: Point2<F>) -> Result<Label, OracleError> {
        Ok(self.label(point))
    }
}
