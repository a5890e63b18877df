//! Error types for the repair pipeline.
//!
//! Each stage has its own error enum; [`RepairError`] wraps them with the
//! stage name and the counts needed to reproduce a failure. Cancellation is
//! a distinct variant at every level so callers can tell a requested stop
//! from invalid input.

use std::fmt;
use thiserror::Error;

/// Error returned by a [`crate::classify::MembershipOracle`].
pub type OracleError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pipeline stage, used to label errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Constrained Delaunay triangulation of the input segments.
    Triangulation,
    /// Labelling triangles through the membership oracle.
    Classification,
    /// Merging retained triangles into rings.
    Reconstruction,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Triangulation => "triangulation",
            Stage::Classification => "classification",
            Stage::Reconstruction => "reconstruction",
        })
    }
}

/// Errors raised by the constrained Delaunay triangulator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriangulationError {
    /// Fewer than three distinct, non-collinear points after deduplication.
    #[error("degenerate input: {distinct_points} distinct points, none spanning a triangle")]
    DegenerateInput {
        /// Number of distinct points left after deduplication.
        distinct_points: usize,
    },

    /// Two constraint segments properly cross.
    #[error("constraint segments #{first} and #{second} cross")]
    ConstraintConflict {
        /// Index of the segment already present in the mesh.
        first: usize,
        /// Index of the segment being inserted.
        second: usize,
    },

    /// Enforcement finished without the segment becoming a chain of mesh
    /// edges. The mesh topology is inconsistent when this happens.
    #[error("constraint segment #{segment} could not be recovered in the mesh")]
    ConstraintNotRecovered {
        /// Index of the segment being inserted.
        segment: usize,
    },

    /// The cancel signal fired.
    #[error("cancelled after {completed} of {total} steps")]
    Cancelled {
        /// Vertices inserted plus constraints enforced before stopping.
        completed: usize,
        /// Total steps the triangulation would have taken.
        total: usize,
    },
}

/// Errors raised while classifying triangles.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The membership oracle failed; its error is passed through unchanged.
    #[error("membership oracle failed on triangle #{triangle}")]
    Oracle {
        /// Index of the triangle whose centroid was being classified.
        triangle: usize,
        /// The oracle's own error.
        #[source]
        source: OracleError,
    },

    /// The cancel signal fired.
    #[error("cancelled after classifying {classified} of {total} triangles")]
    Cancelled {
        /// Triangles classified before stopping.
        classified: usize,
        /// Triangles in the input.
        total: usize,
    },
}

/// Errors surfaced by the repair pipeline.
///
/// No partial geometry accompanies an error: a run either yields a complete
/// multipolygon or one of these.
#[derive(Debug, Error)]
pub enum RepairError {
    /// Not enough distinct, non-collinear points to triangulate.
    #[error(
        "triangulation stage: degenerate input ({points} points, {segments} segments, \
         {distinct_points} distinct)"
    )]
    DegenerateInput {
        /// Explicit points supplied by the caller.
        points: usize,
        /// Constraint segments supplied by the caller.
        segments: usize,
        /// Distinct points left after deduplication.
        distinct_points: usize,
    },

    /// Two input constraint segments cross; the input must be noded first.
    #[error("triangulation stage: constraint segments #{first} and #{second} of {segments} cross")]
    ConstraintConflict {
        /// Constraint segments supplied by the caller.
        segments: usize,
        /// Index of the first offending segment.
        first: usize,
        /// Index of the second offending segment.
        second: usize,
    },

    /// A segment could not be enforced as mesh edges.
    #[error("triangulation stage: constraint segment #{segment} of {segments} not recovered")]
    ConstraintNotRecovered {
        /// Constraint segments supplied by the caller.
        segments: usize,
        /// Index of the segment that failed.
        segment: usize,
    },

    /// The membership oracle failed.
    #[error("classification stage: oracle failed on triangle #{triangle} of {triangles}")]
    Oracle {
        /// Index of the failing triangle.
        triangle: usize,
        /// Triangles being classified.
        triangles: usize,
        /// The oracle's own error.
        #[source]
        source: OracleError,
    },

    /// The run was cancelled on request.
    #[error("{stage} stage cancelled after {completed} of {total} steps")]
    Cancelled {
        /// Stage that observed the signal.
        stage: Stage,
        /// Work items completed in that stage.
        completed: usize,
        /// Work items the stage would have processed.
        total: usize,
    },
}

impl RepairError {
    /// Stage in which the error occurred.
    pub fn stage(&self) -> Stage {
        match self {
            RepairError::DegenerateInput { .. }
            | RepairError::ConstraintConflict { .. }
            | RepairError::ConstraintNotRecovered { .. } => Stage::Triangulation,
            RepairError::Oracle { .. } => Stage::Classification,
            RepairError::Cancelled { stage, .. } => *stage,
        }
    }

    /// Returns `true` if the run stopped because cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RepairError::Cancelled { .. })
    }
}
