//! Floating-point planar primitives.

mod point2;
mod segment2;
mod vec2;

pub use point2::Point2;
pub(crate) use point2::PointKey;
pub use segment2::Segment2;
pub use vec2::Vec2;
