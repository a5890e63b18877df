//! The repair pipeline: triangulate, classify, reconstruct.
//!
//! [`Repairer`] runs the three stages in order on caller-supplied segments and
//! oracle. The cancel signal is checked before every stage and inside the
//! triangulation and classification loops. Stage errors are wrapped into
//! [`RepairError`] with the stage and input sizes; nothing is retried and no
//! partial geometry is returned.
//!
//! [`make_valid`] is the all-in-one entry for plain rings.
//!
//! # Example
//!
//! ```
//! use makevalid::{make_valid, RepairOptions, Point2};
//!
//! // A self-intersecting "bowtie" ring.
//! let bowtie = vec![
//!     Point2::new(0.0_f64, 0.0),
//!     Point2::new(2.0, 2.0),
//!     Point2::new(2.0, 0.0),
//!     Point2::new(0.0, 2.0),
//! ];
//!
//! let repaired = make_valid(&[bowtie], &RepairOptions::default()).unwrap();
//! assert_eq!(repaired.len(), 2);
//! assert!((repaired.area() - 2.0).abs() < 1e-12);
//! ```

use crate::cancel::{CancelSignal, NeverCancel};
use crate::classify::{classify_triangles, BoundaryPolicy, MembershipOracle};
use crate::error::{ClassifyError, RepairError, Stage, TriangulationError};
use crate::ingest::{node_segments, ring_segments};
use crate::oracle::{FillRule, RingOracle};
use crate::polygon::{MultiPolygon, Reconstructor, Winding};
use crate::primitives::{Point2, Segment2};
use crate::triangulation::{ConstrainedDelaunay, Triangle};
use num_traits::Float;
use std::time::Instant;

/// Options for a repair run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepairOptions<F> {
    /// Vertex snapping distance. Zero merges only identical points.
    ///
    /// [`Repairer`] applies it when deduplicating triangulation vertices.
    /// [`make_valid`] applies it once, while noding, and then triangulates
    /// the snapped segments without further snapping.
    pub tolerance: F,
    /// Whether triangles the oracle labels as boundary are kept.
    pub boundary_policy: BoundaryPolicy,
    /// Output ring orientation.
    pub winding: Winding,
    /// Rings with an area at or below this are dropped.
    pub min_ring_area: F,
    /// Fill rule of the reference oracle built by [`make_valid`].
    pub fill_rule: FillRule,
}

impl<F: Float> Default for RepairOptions<F> {
    fn default() -> Self {
        Self {
            tolerance: F::zero(),
            boundary_policy: BoundaryPolicy::Discard,
            winding: Winding::CounterClockwise,
            min_ring_area: F::zero(),
            fill_rule: FillRule::EvenOdd,
        }
    }
}

impl<F: Float> RepairOptions<F> {
    /// Creates options with the given snapping tolerance.
    pub fn with_tolerance(tolerance: F) -> Self {
        Self {
            tolerance,
            ..Default::default()
        }
    }

    /// Sets the boundary policy.
    pub fn boundary_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.boundary_policy = policy;
        self
    }

    /// Sets the output winding.
    pub fn winding(mut self, winding: Winding) -> Self {
        self.winding = winding;
        self
    }

    /// Sets the minimum ring area.
    pub fn min_ring_area(mut self, area: F) -> Self {
        self.min_ring_area = area;
        self
    }

    /// Sets the fill rule used by [`make_valid`].
    pub fn fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }
}

/// Runs the repair pipeline with fixed options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Repairer<F> {
    options: RepairOptions<F>,
}

impl<F: Float> Default for Repairer<F> {
    fn default() -> Self {
        Self::new(RepairOptions::default())
    }
}

impl<F: Float> Repairer<F> {
    /// Creates a repairer running with `options`.
    pub fn new(options: RepairOptions<F>) -> Self {
        Self { options }
    }

    /// The options this repairer runs with.
    pub fn options(&self) -> &RepairOptions<F> {
        &self.options
    }

    /// Repairs the geometry bounded by `segments`.
    ///
    /// Segments must not cross each other except at shared endpoints; see
    /// [`crate::ingest::node_segments`].
    pub fn repair<O, C>(
        &self,
        segments: &[Segment2<F>],
        oracle: &O,
        cancel: &C,
    ) -> Result<MultiPolygon<F>, RepairError>
    where
        O: MembershipOracle<F> + ?Sized,
        C: CancelSignal + ?Sized,
    {
        self.repair_with_points(&[], segments, oracle, cancel)
    }

    /// Like [`Repairer::repair`], with extra points inserted into the
    /// triangulation before the segment endpoints.
    pub fn repair_with_points<O, C>(
        &self,
        points: &[Point2<F>],
        segments: &[Segment2<F>],
        oracle: &O,
        cancel: &C,
    ) -> Result<MultiPolygon<F>, RepairError>
    where
        O: MembershipOracle<F> + ?Sized,
        C: CancelSignal + ?Sized,
    {
        let span = tracing::debug_span!(
            "make_valid",
            points = points.len(),
            segments = segments.len()
        );
        let _guard = span.enter();

        let retained = self.inside_triangles(points, segments, oracle, cancel)?;

        if cancel.is_cancelled() {
            return Err(RepairError::Cancelled {
                stage: Stage::Reconstruction,
                completed: 0,
                total: retained.len(),
            });
        }
        let started = Instant::now();
        let result = Reconstructor::new()
            .with_winding(self.options.winding)
            .with_min_ring_area(self.options.min_ring_area)
            .reconstruct(&retained);
        tracing::debug!(
            stage = %Stage::Reconstruction,
            polygons = result.len(),
            rings = result.ring_count(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "stage finished"
        );

        Ok(result)
    }

    /// Runs triangulation and classification only, returning the triangles
    /// the boundary policy keeps.
    pub fn inside_triangles<O, C>(
        &self,
        points: &[Point2<F>],
        segments: &[Segment2<F>],
        oracle: &O,
        cancel: &C,
    ) -> Result<Vec<Triangle<F>>, RepairError>
    where
        O: MembershipOracle<F> + ?Sized,
        C: CancelSignal + ?Sized,
    {
        if cancel.is_cancelled() {
            return Err(RepairError::Cancelled {
                stage: Stage::Triangulation,
                completed: 0,
                total: points.len() + segments.len(),
            });
        }
        let started = Instant::now();
        let mesh = ConstrainedDelaunay::new(self.options.tolerance)
            .triangulate(points, segments, cancel)
            .map_err(|err| triangulation_failed(err, points.len(), segments.len()))?;
        let triangles = mesh.triangles(false);
        tracing::debug!(
            stage = %Stage::Triangulation,
            vertices = mesh.vertex_count(),
            triangles = triangles.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "stage finished"
        );

        if cancel.is_cancelled() {
            return Err(RepairError::Cancelled {
                stage: Stage::Classification,
                completed: 0,
                total: triangles.len(),
            });
        }
        let started = Instant::now();
        let retained =
            classify_triangles(&triangles, oracle, self.options.boundary_policy, cancel)
                .map_err(|err| classification_failed(err, triangles.len()))?;
        tracing::debug!(
            stage = %Stage::Classification,
            triangles = triangles.len(),
            retained = retained.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "stage finished"
        );

        Ok(retained)
    }
}

fn triangulation_failed(err: TriangulationError, points: usize, segments: usize) -> RepairError {
    match err {
        TriangulationError::DegenerateInput { distinct_points } => RepairError::DegenerateInput {
            points,
            segments,
            distinct_points,
        },
        TriangulationError::ConstraintConflict { first, second } => {
            RepairError::ConstraintConflict {
                segments,
                first,
                second,
            }
        }
        TriangulationError::ConstraintNotRecovered { segment } => {
            RepairError::ConstraintNotRecovered { segments, segment }
        }
        TriangulationError::Cancelled { completed, total } => RepairError::Cancelled {
            stage: Stage::Triangulation,
            completed,
            total,
        },
    }
}

fn classification_failed(err: ClassifyError, triangles: usize) -> RepairError {
    match err {
        ClassifyError::Oracle { triangle, source } => RepairError::Oracle {
            triangle,
            triangles,
            source,
        },
        ClassifyError::Cancelled { classified, total } => RepairError::Cancelled {
            stage: Stage::Classification,
            completed: classified,
            total,
        },
    }
}

/// Repairs plain rings: extracts and nodes their edges, then runs the
/// pipeline with a [`RingOracle`] over the same rings.
///
/// Rings may be open or closed, self-intersecting and overlapping; the fill
/// rule in `options` decides which parts count as inside.
///
/// Vertices are snapped by `options.tolerance` during noding only. Snapping
/// again in the triangulator could move a vertex across a segment it was
/// just split against.
pub fn make_valid<F: Float, R: AsRef<[Point2<F>]>>(
    rings: &[R],
    options: &RepairOptions<F>,
) -> Result<MultiPolygon<F>, RepairError> {
    let segments = node_segments(&ring_segments(rings), options.tolerance);
    let oracle = RingOracle::new(rings, options.fill_rule);
    let options = RepairOptions {
        tolerance: F::zero(),
        ..*options
    };
    Repairer::new(options).repair(&segments, &oracle, &NeverCancel)
}
