//! Constraint enforcement by edge flipping.
//!
//! For each constraint the edges crossing it are collected by walking from
//! one endpoint to the other, flipped out of the way, and the Delaunay
//! condition is then restored on the newly created edges. Vertices lying on a
//! constraint split it into a chain of collinear sub-edges.

use super::mesh::{Edge, Mesh};
use crate::error::TriangulationError;
use crate::predicates::{in_circumcircle, orientation, point_on_segment_exact, segments_cross};
use crate::predicates::Orientation;
use crate::primitives::Segment2;
use num_traits::Float;
use std::collections::VecDeque;

enum Trace {
    /// The constraint passes through this vertex.
    Through(usize),
    /// Edges crossed by the constraint, in order from its start.
    Crossing(Vec<(usize, usize)>),
}

impl<F: Float> Mesh<F> {
    /// Makes `a`-`b` an edge (or collinear chain of edges) of the mesh and
    /// marks it as constrained, owned by input segment `source`.
    pub(crate) fn insert_constraint(
        &mut self,
        a: usize,
        b: usize,
        source: usize,
    ) -> Result<(), TriangulationError> {
        let mut pending = vec![(a, b)];

        while let Some((a, b)) = pending.pop() {
            if a == b {
                continue;
            }
            if self.find_edge(a, b).is_some() {
                self.mark_constrained(a, b, source)?;
                continue;
            }
            match self.trace_constraint(a, b, source)? {
                Trace::Through(v) => {
                    pending.push((v, b));
                    pending.push((a, v));
                }
                Trace::Crossing(crossings) => {
                    let created = self.flip_out(a, b, source, crossings)?;
                    self.restore_delaunay(a, b, created);
                    self.mark_constrained(a, b, source)?;
                }
            }
        }

        Ok(())
    }

    fn mark_constrained(
        &mut self,
        a: usize,
        b: usize,
        source: usize,
    ) -> Result<(), TriangulationError> {
        let Some((f, i)) = self.find_edge(a, b) else {
            tracing::warn!(a, b, source, "constraint edge missing after enforcement");
            return Err(TriangulationError::ConstraintNotRecovered { segment: source });
        };
        self.faces[f].fixed[i] = true;
        if let Some(u) = self.faces[f].n[i] {
            if let Some(j) = self.faces[u].edge_slot(a, b) {
                self.faces[u].fixed[j] = true;
            }
        }
        self.constraints.entry(Edge::new(a, b)).or_insert(source);
        Ok(())
    }

    /// Walks from `a` towards `b`, collecting the edges the segment crosses.
    fn trace_constraint(
        &self,
        a: usize,
        b: usize,
        source: usize,
    ) -> Result<Trace, TriangulationError> {
        let pa = self.points[a];
        let pb = self.points[b];

        let mut start = None;
        for f in self.faces_around(a) {
            let face = &self.faces[f];
            let Some(k) = face.slot_of(a) else {
                continue;
            };
            let x = face.v[(k + 1) % 3];
            let y = face.v[(k + 2) % 3];
            for v in [x, y] {
                if point_on_segment_exact(self.points[v], pa, pb) {
                    return Ok(Trace::Through(v));
                }
            }
            if orientation(pa, self.points[x], pb) == Orientation::CounterClockwise
                && orientation(pa, self.points[y], pb) == Orientation::Clockwise
            {
                start = Some((f, (x, y)));
                break;
            }
        }

        let Some((mut f, mut edge)) = start else {
            tracing::warn!(a, b, source, "no face around constraint start faces its end");
            return Err(TriangulationError::ConstraintNotRecovered { segment: source });
        };

        let mut crossings = Vec::new();
        loop {
            let (x, y) = edge;
            let Some(slot) = self.faces[f].edge_slot(x, y) else {
                break;
            };
            if self.faces[f].fixed[slot] {
                let first = self
                    .constraints
                    .get(&Edge::new(x, y))
                    .copied()
                    .unwrap_or(source);
                return Err(TriangulationError::ConstraintConflict {
                    first,
                    second: source,
                });
            }
            crossings.push(edge);

            let Some(z) = self.opposite_across(f, slot) else {
                break;
            };
            let Some(g) = self.faces[f].n[slot] else {
                break;
            };
            if z == b {
                break;
            }
            if point_on_segment_exact(self.points[z], pa, pb) {
                return Ok(Trace::Through(z));
            }

            let side_z = orientation(pa, pb, self.points[z]);
            let side_x = orientation(pa, pb, self.points[x]);
            edge = if side_z == side_x { (z, y) } else { (x, z) };
            f = g;
        }

        Ok(Trace::Crossing(crossings))
    }

    /// Flips every edge crossing `a`-`b` until none is left. Returns the
    /// edges created along the way that do not cross the constraint.
    fn flip_out(
        &mut self,
        a: usize,
        b: usize,
        source: usize,
        crossings: Vec<(usize, usize)>,
    ) -> Result<Vec<(usize, usize)>, TriangulationError> {
        let constraint = Segment2::new(self.points[a], self.points[b]);
        let mut queue: VecDeque<(usize, usize)> = crossings.into();
        let mut created = Vec::new();
        let mut stalled = 0;

        while let Some((x, y)) = queue.pop_front() {
            let Some((f, i)) = self.find_edge(x, y) else {
                continue;
            };
            if !self.is_flippable(f, i) {
                queue.push_back((x, y));
                stalled += 1;
                if stalled > queue.len() {
                    tracing::warn!(a, b, remaining = queue.len(), "crossing edges cannot be flipped");
                    return Err(TriangulationError::ConstraintNotRecovered { segment: source });
                }
                continue;
            }
            stalled = 0;

            let p = self.faces[f].v[i];
            let Some(d) = self.opposite_across(f, i) else {
                continue;
            };
            if self.flip(f, i).is_none() {
                continue;
            }
            let diagonal = Segment2::new(self.points[p], self.points[d]);
            if segments_cross(constraint, diagonal) {
                queue.push_back((p, d));
            } else {
                created.push((p, d));
            }
        }

        Ok(created)
    }

    /// Flips the created edges until each satisfies the Delaunay condition,
    /// leaving the constraint itself alone.
    fn restore_delaunay(&mut self, a: usize, b: usize, mut edges: Vec<(usize, usize)>) {
        let constraint = Edge::new(a, b);
        loop {
            let mut swapped = false;
            for edge in edges.iter_mut() {
                let (x, y) = *edge;
                if Edge::new(x, y) == constraint {
                    continue;
                }
                let Some((f, i)) = self.find_edge(x, y) else {
                    continue;
                };
                if self.faces[f].fixed[i] {
                    continue;
                }
                let Some(d) = self.opposite_across(f, i) else {
                    continue;
                };
                let [p0, p1, p2] = self.faces[f].v.map(|v| self.points[v]);
                if in_circumcircle(p0, p1, p2, self.points[d]) && self.is_flippable(f, i) {
                    let p = self.faces[f].v[i];
                    if self.flip(f, i).is_some() {
                        *edge = (p, d);
                        swapped = true;
                    }
                }
            }
            if !swapped {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Point2;

    /// Rhombus whose long diagonal `a`-`b` is not a Delaunay edge.
    fn rhombus() -> (Mesh<f64>, usize, usize) {
        let mut mesh = Mesh::with_super_triangle([
            Point2::new(-100.0, -100.0),
            Point2::new(100.0, -100.0),
            Point2::new(0.0, 100.0),
        ]);
        let a = mesh.insert_point(Point2::new(-5.0, 0.0)).unwrap();
        let b = mesh.insert_point(Point2::new(5.0, 0.0)).unwrap();
        mesh.insert_point(Point2::new(0.0, 2.0)).unwrap();
        mesh.insert_point(Point2::new(0.0, -2.0)).unwrap();
        assert!(mesh.find_edge(a, b).is_none());
        (mesh, a, b)
    }

    #[test]
    fn test_crossing_edges_are_flipped_out() {
        let (mut mesh, a, b) = rhombus();
        mesh.insert_constraint(a, b, 7).unwrap();
        assert!(mesh.find_edge(a, b).is_some());
        assert_eq!(mesh.constraints.get(&Edge::new(a, b)), Some(&7));
    }

    #[test]
    fn test_unrecoverable_constraint_is_an_error() {
        let (mut mesh, a, b) = rhombus();
        // Point the start vertex at a face it is not part of, so no walk can
        // leave it.
        let foreign = (0..mesh.faces.len())
            .find(|&f| mesh.faces[f].slot_of(a).is_none())
            .unwrap();
        mesh.vertex_face[a] = foreign;
        assert_eq!(
            mesh.insert_constraint(a, b, 3),
            Err(TriangulationError::ConstraintNotRecovered { segment: 3 })
        );
        assert!(mesh.constraints.is_empty());
    }
}
