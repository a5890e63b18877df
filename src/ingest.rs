//! Turning raw rings into constraint segments.
//!
//! The triangulator rejects crossing constraints, so self-intersecting input
//! has to be noded first: [`ring_segments`] extracts the edges and
//! [`node_segments`] splits them wherever they meet.
//!
//! # Example
//!
//! ```
//! use makevalid::ingest::{node_segments, ring_segments};
//! use makevalid::Point2;
//!
//! let bowtie = vec![
//!     Point2::new(0.0_f64, 0.0),
//!     Point2::new(2.0, 2.0),
//!     Point2::new(2.0, 0.0),
//!     Point2::new(0.0, 2.0),
//! ];
//! let edges = ring_segments(&[bowtie]);
//! assert_eq!(edges.len(), 4);
//!
//! // The two diagonals are split at (1, 1).
//! let noded = node_segments(&edges, 0.0);
//! assert_eq!(noded.len(), 6);
//! ```

use crate::predicates::{
    orientation, point_on_segment, segments_cross, segments_intersect, Orientation,
    SegmentIntersection,
};
use crate::primitives::{Point2, PointKey, Segment2};
use crate::snap::Snapper;
use num_traits::Float;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Extracts one segment per ring edge.
///
/// Rings may be open or closed. Zero-length edges and edges repeating an
/// earlier one (in either direction) are skipped.
pub fn ring_segments<F: Float, R: AsRef<[Point2<F>]>>(rings: &[R]) -> Vec<Segment2<F>> {
    let mut seen = HashSet::new();
    let mut segments = Vec::new();

    for ring in rings {
        let mut points = ring.as_ref();
        if let [first, .., last] = points {
            if first == last {
                points = &points[..points.len() - 1];
            }
        }
        let n = points.len();
        let edges = match n {
            0 | 1 => 0,
            2 => 1,
            _ => n,
        };
        for i in 0..edges {
            push_unique(&mut segments, &mut seen, points[i], points[(i + 1) % n]);
        }
    }

    segments
}

/// Rounds of splitting after which any remaining crossing is reported.
const MAX_ROUNDS: usize = 16;

/// Splits segments at every point where they touch, cross or overlap, so that
/// no two output segments cross.
///
/// Endpoints are snapped first: a point within `eps` of an earlier endpoint
/// is replaced by it. An endpoint within `eps` of another segment's interior
/// splits that segment there.
///
/// Crossing points are snapped to any vertex or earlier crossing point within
/// a few units in the last place of the largest coordinate, so one
/// intersection shared by several segments becomes a single vertex. Rounding
/// can still make the split pieces cross again, so splitting repeats until a
/// round finds nothing left to split.
///
/// The output keeps input order, with each segment's pieces from its start to
/// its end; duplicates and collapsed segments are dropped.
pub fn node_segments<F: Float>(segments: &[Segment2<F>], eps: F) -> Vec<Segment2<F>> {
    let eps = if eps.is_finite() && eps > F::zero() { eps } else { F::zero() };
    let floor = rounding_floor(segments);
    let mut vertices = Snapper::new(eps.max(floor));

    let mut seen = HashSet::new();
    let mut noded = Vec::with_capacity(segments.len());
    for (source, segment) in segments.iter().enumerate() {
        match (vertices.snap(segment.start), vertices.snap(segment.end)) {
            (Some(a), Some(b)) => push_unique(&mut noded, &mut seen, a, b),
            _ => tracing::warn!(source, "skipping segment with non-finite endpoint"),
        }
    }

    // Cut points only merge with points a rounding error away.
    let mut snapper = Snapper::new(floor);
    for &p in vertices.points() {
        snapper.resolve(p);
    }

    let mut rounds = 0;
    loop {
        let cuts = split_round(&mut noded, eps, &mut snapper);
        rounds += 1;
        if cuts == 0 {
            break;
        }
        if rounds == MAX_ROUNDS {
            let crossings = count_crossings(&noded);
            if crossings > 0 {
                tracing::warn!(rounds, crossings, "noding stopped with crossings left");
            }
            break;
        }
    }

    tracing::debug!(
        input = segments.len(),
        output = noded.len(),
        rounds,
        "segments noded"
    );
    noded
}

/// Splits every segment at the points where it meets another one. Returns the
/// number of cuts made; the segments are left untouched when it is zero.
fn split_round<F: Float>(
    segments: &mut Vec<Segment2<F>>,
    eps: F,
    snapper: &mut Snapper<F>,
) -> usize {
    // A touch counts when the meeting point is this close to both segments.
    let reach = eps.max(snapper.tolerance());
    let mut splits: Vec<Vec<Point2<F>>> = vec![Vec::new(); segments.len()];

    for (i, j) in candidate_pairs(segments, eps) {
        let (s1, s2) = (segments[i], segments[j]);
        if meet_only_at_shared_endpoint(s1, s2) {
            continue;
        }
        if segments_cross(s1, s2) {
            if let Some(point) = snapper.snap(crossing_point(s1, s2)) {
                add_split(&mut splits[i], s1, point);
                add_split(&mut splits[j], s2, point);
            }
            continue;
        }
        match segments_intersect(s1, s2, eps) {
            SegmentIntersection::None => {}
            SegmentIntersection::Point { point, t1, t2 } => {
                let point = endpoint_at(s1, t1)
                    .or_else(|| endpoint_at(s2, t2))
                    .or_else(|| snapper.snap(point))
                    .filter(|&p| {
                        point_on_segment(p, s1, reach) && point_on_segment(p, s2, reach)
                    });
                if let Some(point) = point {
                    add_split(&mut splits[i], s1, point);
                    add_split(&mut splits[j], s2, point);
                }
            }
            SegmentIntersection::Overlapping { .. } => {
                for p in [s2.start, s2.end] {
                    add_split(&mut splits[i], s1, p);
                }
                for p in [s1.start, s1.end] {
                    add_split(&mut splits[j], s2, p);
                }
            }
        }
    }

    let cuts: usize = splits.iter().map(Vec::len).sum();
    if cuts == 0 {
        return 0;
    }

    let mut seen = HashSet::new();
    let mut noded = Vec::with_capacity(segments.len() + cuts);
    for (segment, mut points) in segments.iter().zip(splits) {
        points.sort_by(|a, b| {
            segment
                .closest_point(*a)
                .1
                .partial_cmp(&segment.closest_point(*b).1)
                .unwrap_or(Ordering::Equal)
        });
        let mut previous = segment.start;
        for p in points.into_iter().chain(std::iter::once(segment.end)) {
            push_unique(&mut noded, &mut seen, previous, p);
            previous = p;
        }
    }
    *segments = noded;
    cuts
}

/// Index pairs whose x-ranges come within `eps` of each other.
fn candidate_pairs<F: Float>(segments: &[Segment2<F>], eps: F) -> Vec<(usize, usize)> {
    let mut order: Vec<usize> = (0..segments.len()).collect();
    order.sort_by(|&i, &j| {
        min_x(segments[i])
            .partial_cmp(&min_x(segments[j]))
            .unwrap_or(Ordering::Equal)
    });

    let mut pairs = Vec::new();
    for (k, &i) in order.iter().enumerate() {
        let reach = max_x(segments[i]) + eps;
        for &j in &order[k + 1..] {
            if min_x(segments[j]) > reach {
                break;
            }
            pairs.push((i, j));
        }
    }
    pairs
}

fn count_crossings<F: Float>(segments: &[Segment2<F>]) -> usize {
    candidate_pairs(segments, F::zero())
        .into_iter()
        .filter(|&(i, j)| segments_cross(segments[i], segments[j]))
        .count()
}

/// Intersection of two segments known to cross, clamped onto the first.
fn crossing_point<F: Float>(s1: Segment2<F>, s2: Segment2<F>) -> Point2<F> {
    let d1 = s1.direction();
    let d2 = s2.direction();
    let cross = d1.cross(d2);
    if cross == F::zero() {
        return s1.closest_point(s2.start).0;
    }
    let t = (s2.start - s1.start).cross(d2) / cross;
    s1.point_at(t.max(F::zero()).min(F::one()))
}

/// Snapping floor: a few units in the last place of the largest coordinate.
fn rounding_floor<F: Float>(segments: &[Segment2<F>]) -> F {
    let extent = segments
        .iter()
        .flat_map(|s| [s.start, s.end])
        .filter(|p| p.is_finite())
        .fold(F::zero(), |m, p| m.max(p.x.abs()).max(p.y.abs()));
    let ulps = F::from(64.0).unwrap_or_else(F::one);
    extent * F::epsilon() * ulps
}

fn push_unique<F: Float>(
    segments: &mut Vec<Segment2<F>>,
    seen: &mut HashSet<(PointKey, PointKey)>,
    a: Point2<F>,
    b: Point2<F>,
) {
    let segment = Segment2::new(a, b);
    if segment.is_zero_length() {
        return;
    }
    let (ka, kb) = (a.key(), b.key());
    let key = if ka <= kb { (ka, kb) } else { (kb, ka) };
    if seen.insert(key) {
        segments.push(segment);
    }
}

/// Records `p` as a cut of `segment` unless it is one of its endpoints.
fn add_split<F: Float>(cuts: &mut Vec<Point2<F>>, segment: Segment2<F>, p: Point2<F>) {
    if p == segment.start || p == segment.end {
        return;
    }
    let t = segment.closest_point(p).1;
    if t <= F::zero() || t >= F::one() {
        return;
    }
    if !cuts.contains(&p) {
        cuts.push(p);
    }
}

/// Non-collinear segments sharing an endpoint cannot meet anywhere else.
fn meet_only_at_shared_endpoint<F: Float>(s1: Segment2<F>, s2: Segment2<F>) -> bool {
    let shared = s1.start == s2.start
        || s1.start == s2.end
        || s1.end == s2.start
        || s1.end == s2.end;
    shared
        && (orientation(s1.start, s1.end, s2.start) != Orientation::Collinear
            || orientation(s1.start, s1.end, s2.end) != Orientation::Collinear)
}

fn endpoint_at<F: Float>(segment: Segment2<F>, t: F) -> Option<Point2<F>> {
    if t <= F::zero() {
        Some(segment.start)
    } else if t >= F::one() {
        Some(segment.end)
    } else {
        None
    }
}

fn min_x<F: Float>(s: Segment2<F>) -> F {
    s.start.x.min(s.end.x)
}

fn max_x<F: Float>(s: Segment2<F>) -> F {
    s.start.x.max(s.end.x)
}
