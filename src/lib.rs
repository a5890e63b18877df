//! makevalid - Polygon repair by constrained Delaunay triangulation
//!
//! Invalid polygons (self-intersecting rings, overlapping holes, duplicated
//! vertices) are rebuilt in three stages. The boundary segments are
//! triangulated with a constrained Delaunay triangulation. Every triangle is
//! labelled through a membership oracle. The retained triangles are merged
//! back into a valid multipolygon.
//!
//! Orientation and in-circle decisions use exact predicates, so the result
//! does not depend on floating-point rounding of those tests.
//!
//! # Example
//!
//! ```
//! use makevalid::{make_valid, Point2, RepairOptions};
//!
//! // A valid ring comes back unchanged.
//! let ring = vec![
//!     Point2::new(0.0_f64, 0.0),
//!     Point2::new(4.0, 0.0),
//!     Point2::new(4.0, 4.0),
//!     Point2::new(0.0, 4.0),
//! ];
//! let repaired = make_valid(&[ring], &RepairOptions::default()).unwrap();
//! assert_eq!(repaired.len(), 1);
//! assert_eq!(repaired.polygons[0].shell.len(), 4);
//! ```

pub mod cancel;
pub mod classify;
pub mod error;
pub mod ingest;
pub mod oracle;
pub mod pipeline;
pub mod polygon;
pub mod predicates;
pub mod primitives;
mod snap;
pub mod triangulation;

pub use cancel::{CancelSignal, NeverCancel};
pub use classify::{oracle_fn, BoundaryPolicy, Label, MembershipOracle};
pub use error::{ClassifyError, OracleError, RepairError, Stage, TriangulationError};
pub use oracle::{FillRule, RingOracle};
pub use pipeline::{make_valid, RepairOptions, Repairer};
pub use polygon::{MultiPolygon, PolygonWithHoles, Ring, Winding};
pub use predicates::{in_circumcircle, orientation, Orientation};
pub use primitives::{Point2, Segment2, Vec2};
pub use triangulation::{ConstrainedDelaunay, Mesh, Triangle};
