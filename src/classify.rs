//! Labelling triangles as inside or outside the original geometry.
//!
//! Each triangle is sampled at its centroid, which lies strictly inside any
//! non-degenerate triangle, and the answer comes from a caller-supplied
//! [`MembershipOracle`].
//!
//! # Example
//!
//! ```
//! use makevalid::classify::{classify, oracle_fn, Label};
//! use makevalid::triangulation::Triangle;
//! use makevalid::Point2;
//!
//! let right_half = oracle_fn(|p: Point2<f64>| if p.x > 0.0 { Label::Inside } else { Label::Outside });
//! let t = Triangle::new(Point2::new(0.0, 0.0), Point2::new(3.0, 0.0), Point2::new(0.0, 3.0));
//!
//! assert_eq!(classify(&t, &right_half).unwrap(), Label::Inside);
//! ```

use crate::cancel::CancelSignal;
use crate::error::{ClassifyError, OracleError};
use crate::primitives::Point2;
use crate::triangulation::Triangle;
use num_traits::Float;
use std::fmt;

/// Where a sample point lies relative to the original geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Strictly inside.
    Inside,
    /// Strictly outside.
    Outside,
    /// The oracle could not decide, typically because the point lies on the
    /// original boundary.
    Boundary,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Label::Inside => "inside",
            Label::Outside => "outside",
            Label::Boundary => "boundary",
        })
    }
}

/// What to do with triangles labelled [`Label::Boundary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundaryPolicy {
    /// Treat them as outside.
    #[default]
    Discard,
    /// Treat them as inside.
    Retain,
}

impl BoundaryPolicy {
    /// Returns `true` if a triangle with this label is kept.
    #[inline]
    pub fn retains(self, label: Label) -> bool {
        match label {
            Label::Inside => true,
            Label::Outside => false,
            Label::Boundary => self == BoundaryPolicy::Retain,
        }
    }
}

/// Decides whether a point lies inside the geometry being repaired.
///
/// Implementations must be free of side effects. A failure aborts the
/// classification stage and is passed to the caller unchanged.
pub trait MembershipOracle<F> {
    /// Labels a single point.
    fn membership_of(&self, point: Point2<F>) -> Result<Label, OracleError>;
}

impl<F, T: MembershipOracle<F> + ?Sized> MembershipOracle<F> for &T {
    #[inline]
    fn membership_of(&self, point: Point2<F>) -> Result<Label, OracleError> {
        (**self).membership_of(point)
    }
}

impl<F, T: MembershipOracle<F> + ?Sized> MembershipOracle<F> for Box<T> {
    #[inline]
    fn membership_of(&self, point: Point2<F>) -> Result<Label, OracleError> {
        (**self).membership_of(point)
    }
}

/// An infallible oracle backed by a closure. Built with [`oracle_fn`].
#[derive(Clone, Copy)]
pub struct OracleFn<G>(G);

impl<G> fmt::Debug for OracleFn<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleFn").finish_non_exhaustive()
    }
}

impl<F, G: Fn(Point2<F>) -> Label> MembershipOracle<F> for OracleFn<G> {
    #[inline]
    fn membership_of(&self, point: Point2<F>) -> Result<Label, OracleError> {
        Ok((self.0)(point))
    }
}

/// Wraps a closure as a [`MembershipOracle`].
pub fn oracle_fn<F, G: Fn(Point2<F>) -> Label>(f: G) -> OracleFn<G> {
    OracleFn(f)
}

/// Labels a triangle by querying the oracle at its centroid.
pub fn classify<F: Float, O: MembershipOracle<F> + ?Sized>(
    triangle: &Triangle<F>,
    oracle: &O,
) -> Result<Label, OracleError> {
    oracle.membership_of(triangle.centroid())
}

/// Classifies every triangle and returns those the policy retains, in input
/// order.
///
/// The cancel signal is polled before each triangle. The first oracle
/// failure stops the stage; no partial result is returned.
pub fn classify_triangles<F, O, C>(
    triangles: &[Triangle<F>],
    oracle: &O,
    policy: BoundaryPolicy,
    cancel: &C,
) -> Result<Vec<Triangle<F>>, ClassifyError>
where
    F: Float,
    O: MembershipOracle<F> + ?Sized,
    C: CancelSignal + ?Sized,
{
    let total = triangles.len();
    let mut retained = Vec::with_capacity(total);

    for (index, triangle) in triangles.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(ClassifyError::Cancelled {
                classified: index,
                total,
            });
        }
        let label = classify(triangle, oracle).map_err(|source| ClassifyError::Oracle {
            triangle: index,
            source,
        })?;
        tracing::trace!(triangle = index, %label, "classified");
        if policy.retains(label) {
            retained.push(*triangle);
        }
    }

    Ok(retained)
}
