//! Constrained Delaunay triangulation of points and segments.
//!
//! The mesh is built incrementally inside a synthetic super-triangle using
//! exact predicates, then constraint segments are enforced by edge flipping.
//! See [`ConstrainedDelaunay`] for the entry point.

mod cdt;
mod constraint;
mod mesh;
mod triangle;

pub use cdt::{triangulate, ConstrainedDelaunay};
pub use mesh::Mesh;
pub use triangle::Triangle;
