//! Geometric predicates.
//!
//! Two families live here:
//!
//! - [`exact`]: sign-exact orientation, in-circle and crossing tests built on
//!   adaptive-precision arithmetic. The triangulator, the reconstructor and the
//!   reference oracle only use these.
//! - [`tolerance`]: epsilon-aware predicates with explicit tolerance
//!   parameters, used when noding raw input segments.

pub mod exact;
pub mod tolerance;

pub use exact::{
    in_circumcircle, orientation, point_on_segment_exact, segments_cross, Orientation,
};
pub use tolerance::{orient2d, point_on_segment, segments_intersect, SegmentIntersection};
