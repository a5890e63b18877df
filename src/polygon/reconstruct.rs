//! Merging a triangle set into polygon rings.
//!
//! Every triangle contributes its three edges in counter-clockwise order. An
//! edge whose reverse is also contributed lies between two triangles and is
//! dropped; the rest form the boundary, with the covered region on their
//! left. Boundary edges are chained into rings, rings winding
//! counter-clockwise become shells and clockwise ones holes, and each hole is
//! attached to the smallest shell around it.
//!
//! # Example
//!
//! ```
//! use makevalid::polygon::{reconstruct, Winding};
//! use makevalid::triangulation::Triangle;
//! use makevalid::Point2;
//!
//! let (a, b, c, d) = (
//!     Point2::new(0.0_f64, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! );
//! let square = reconstruct(&[Triangle::new(a, b, c), Triangle::new(a, c, d)], Winding::CounterClockwise);
//!
//! assert_eq!(square.len(), 1);
//! assert_eq!(square.polygons[0].shell.len(), 4);
//! ```

use super::core::{MultiPolygon, PolygonWithHoles};
use super::ring::{Containment, Ring, RingRole, Winding};
use crate::predicates::{orientation, Orientation};
use crate::primitives::{Point2, PointKey};
use crate::triangulation::Triangle;
use num_traits::Float;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;
use std::time::Instant;

/// Options for [`Reconstructor::reconstruct`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconstructor<F> {
    winding: Winding,
    min_ring_area: F,
}

impl<F: Float> Default for Reconstructor<F> {
    fn default() -> Self {
        Self {
            winding: Winding::default(),
            min_ring_area: F::zero(),
        }
    }
}

impl<F: Float> Reconstructor<F> {
    /// Counter-clockwise shells, only zero-area rings dropped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output winding.
    pub fn with_winding(mut self, winding: Winding) -> Self {
        self.winding = winding;
        self
    }

    /// Rings with an area at or below this are dropped. Negative values are
    /// treated as zero.
    pub fn with_min_ring_area(mut self, area: F) -> Self {
        self.min_ring_area = if area > F::zero() { area } else { F::zero() };
        self
    }

    /// The winding given to output shells; holes get the opposite one.
    pub fn winding(&self) -> Winding {
        self.winding
    }

    /// The area at or below which rings are dropped.
    pub fn min_ring_area(&self) -> F {
        self.min_ring_area
    }

    /// Builds the multipolygon covered by `triangles`.
    ///
    /// Triangles may be given in either orientation; degenerate ones are
    /// ignored. The result depends only on the input order, so the same
    /// triangles always give the same rings.
    pub fn reconstruct(&self, triangles: &[Triangle<F>]) -> MultiPolygon<F> {
        let started = Instant::now();
        let graph = BoundaryGraph::build(triangles);
        let walked = graph.walk_rings();
        let walked_count = walked.len();

        let mut shells = Vec::new();
        let mut holes = Vec::new();
        for points in walked {
            let points = remove_collinear(points);
            if points.len() < 3 {
                continue;
            }
            let ring = Ring::new(points, RingRole::Shell);
            let area = ring.signed_area();
            if area.abs() <= self.min_ring_area || area == F::zero() {
                continue;
            }
            if area > F::zero() {
                shells.push(ring);
            } else {
                holes.push(ring.with_role(RingRole::Hole));
            }
        }

        let shell_count = shells.len();
        let mut polygons: Vec<PolygonWithHoles<F>> = shells
            .into_iter()
            .map(|shell| PolygonWithHoles::new(shell, Vec::new()))
            .collect();

        let mut orphans = 0;
        for hole in holes {
            match container_of(&hole, &polygons) {
                Some(i) => polygons[i].holes.push(hole),
                None => {
                    orphans += 1;
                    tracing::warn!(
                        vertices = hole.len(),
                        area = hole.area().to_f64().unwrap_or(f64::NAN),
                        "dropping hole with no enclosing shell"
                    );
                }
            }
        }

        for polygon in &mut polygons {
            polygon.shell.orient(self.winding);
            for hole in &mut polygon.holes {
                hole.orient(self.winding);
            }
        }

        let result = MultiPolygon::new(polygons);
        tracing::debug!(
            triangles = triangles.len(),
            boundary_edges = graph.edges.len(),
            rings_walked = walked_count,
            shells = shell_count,
            holes = result.ring_count() - shell_count,
            orphans,
            elapsed_us = started.elapsed().as_micros() as u64,
            "rings reconstructed"
        );
        result
    }
}

/// Reconstructs with default options except for the winding.
pub fn reconstruct<F: Float>(triangles: &[Triangle<F>], winding: Winding) -> MultiPolygon<F> {
    Reconstructor::new().with_winding(winding).reconstruct(triangles)
}

/// Directed boundary edges between interned vertices.
struct BoundaryGraph<F> {
    points: Vec<Point2<F>>,
    edges: Vec<(usize, usize)>,
    outgoing: HashMap<usize, Vec<usize>>,
}

impl<F: Float> BoundaryGraph<F> {
    fn build(triangles: &[Triangle<F>]) -> Self {
        let mut index: HashMap<PointKey, usize> = HashMap::new();
        let mut points = Vec::new();
        let mut directed = Vec::new();
        let mut seen = HashSet::new();

        for t in triangles {
            let [a, b, c] = t.vertices();
            let corners = match t.orientation() {
                Orientation::CounterClockwise => [a, b, c],
                Orientation::Clockwise => [a, c, b],
                Orientation::Collinear => continue,
            };
            let mut ids = [0; 3];
            for (id, p) in ids.iter_mut().zip(corners) {
                *id = *index.entry(p.key()).or_insert_with(|| {
                    points.push(p);
                    points.len() - 1
                });
            }
            for k in 0..3 {
                let edge = (ids[k], ids[(k + 1) % 3]);
                if seen.insert(edge) {
                    directed.push(edge);
                }
            }
        }

        let edges: Vec<(usize, usize)> = directed
            .into_iter()
            .filter(|&(u, v)| !seen.contains(&(v, u)))
            .collect();

        let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
        for (id, &(u, _)) in edges.iter().enumerate() {
            outgoing.entry(u).or_default().push(id);
        }

        Self {
            points,
            edges,
            outgoing,
        }
    }

    /// Chains boundary edges into closed vertex loops, in edge discovery
    /// order.
    ///
    /// A walk that comes back to a vertex it already passed has gone around
    /// a loop touching the rest of the boundary at that vertex, such as a
    /// hole pinched against its shell. That loop is cut off as a ring of its
    /// own, so no ring visits a vertex twice.
    fn walk_rings(&self) -> Vec<Vec<Point2<F>>> {
        let mut used = vec![false; self.edges.len()];
        let mut loops = Vec::new();

        for start in 0..self.edges.len() {
            if used[start] {
                continue;
            }
            let origin = self.edges[start].0;
            let mut ring = vec![origin];
            let mut position = HashMap::from([(origin, 0)]);
            let mut current = start;
            let closed = loop {
                used[current] = true;
                let (u, v) = self.edges[current];
                if v == origin {
                    break true;
                }
                if let Some(&at) = position.get(&v) {
                    let side = ring.split_off(at);
                    for w in &side {
                        position.remove(w);
                    }
                    loops.push(side);
                }
                position.insert(v, ring.len());
                ring.push(v);
                match self.next_edge(u, v, &used) {
                    Some(e) => current = e,
                    None => break false,
                }
            };
            if closed {
                loops.push(ring);
            } else {
                tracing::debug!(start, vertices = ring.len(), "open boundary chain dropped");
            }
        }

        loops
            .into_iter()
            .map(|ring| ring.into_iter().map(|i| self.points[i]).collect::<Vec<_>>())
            .collect()
    }

    /// Picks the unused edge leaving `v` that makes the smallest clockwise
    /// turn from the direction back to `u`.
    fn next_edge(&self, u: usize, v: usize, used: &[bool]) -> Option<usize> {
        let candidates = self.outgoing.get(&v)?;
        let mut open = candidates.iter().copied().filter(|&e| !used[e]);
        let first = open.next()?;
        let Some(second) = open.next() else {
            return Some(first);
        };

        let back = (self.points[u] - self.points[v]).angle();
        let tau = F::from(TAU)?;
        let turn = |e: usize| {
            let out = (self.points[self.edges[e].1] - self.points[v]).angle();
            let mut angle = back - out;
            while angle <= F::zero() {
                angle = angle + tau;
            }
            while angle > tau {
                angle = angle - tau;
            }
            angle
        };

        [first, second]
            .into_iter()
            .chain(open)
            .map(|e| (e, turn(e)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(e, _)| e)
    }
}

/// Drops vertices lying exactly on the line through their neighbours,
/// including the wrap-around at the start of the ring.
fn remove_collinear<F: Float>(points: Vec<Point2<F>>) -> Vec<Point2<F>> {
    let mut out: Vec<Point2<F>> = Vec::with_capacity(points.len());
    for p in points {
        while let [.., a, b] = out.as_slice() {
            if orientation(*a, *b, p) != Orientation::Collinear {
                break;
            }
            out.pop();
        }
        out.push(p);
    }

    while out.len() >= 3 {
        let n = out.len();
        if orientation(out[n - 2], out[n - 1], out[0]) == Orientation::Collinear {
            out.pop();
        } else if orientation(out[n - 1], out[0], out[1]) == Orientation::Collinear {
            out.remove(0);
        } else {
            break;
        }
    }
    out
}

/// Index of the smallest shell strictly enclosing the hole.
fn container_of<F: Float>(hole: &Ring<F>, polygons: &[PolygonWithHoles<F>]) -> Option<usize> {
    polygons
        .iter()
        .enumerate()
        .filter(|(_, polygon)| encloses(&polygon.shell, hole))
        .min_by(|(_, a), (_, b)| {
            a.shell
                .area()
                .partial_cmp(&b.shell.area())
                .unwrap_or(Ordering::Equal)
        })
        .map(|(i, _)| i)
}

/// A hole may touch its shell at vertices, so the first sample point that is
/// not on the shell boundary decides.
fn encloses<F: Float>(shell: &Ring<F>, hole: &Ring<F>) -> bool {
    let vertices = hole.distinct_vertices().iter().copied();
    let midpoints = hole.vertices().windows(2).map(|w| w[0].midpoint(w[1]));
    vertices
        .chain(midpoints)
        .map(|p| shell.contains(p))
        .find(|&c| c != Containment::OnBoundary)
        == Some(Containment::Inside)
}
