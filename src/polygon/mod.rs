//! Output geometry and reconstruction from triangles.
//!
//! A [`MultiPolygon`] is a list of [`PolygonWithHoles`], each a shell
//! [`Ring`] with its hole rings. [`reconstruct`] builds one from the
//! triangles kept by the classifier.
//!
//! # Example
//!
//! ```
//! use makevalid::polygon::{Containment, Ring, RingRole};
//! use makevalid::Point2;
//!
//! let ring = Ring::new(
//!     vec![
//!         Point2::new(0.0_f64, 0.0),
//!         Point2::new(2.0, 0.0),
//!         Point2::new(2.0, 2.0),
//!         Point2::new(0.0, 2.0),
//!     ],
//!     RingRole::Shell,
//! );
//!
//! assert_eq!(ring.vertices().len(), 5); // stored closed
//! assert_eq!(ring.signed_area(), 4.0);
//! assert_eq!(ring.contains(Point2::new(1.0, 1.0)), Containment::Inside);
//! ```

mod core;
mod reconstruct;
mod ring;

pub use self::core::{MultiPolygon, PolygonWithHoles};
pub use reconstruct::{reconstruct, Reconstructor};
pub use ring::{Containment, Ring, RingRole, Winding};
