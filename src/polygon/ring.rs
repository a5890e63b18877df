//! Closed rings of points.

use crate::predicates::{orientation, point_on_segment_exact, Orientation};
use crate::primitives::Point2;
use num_traits::Float;

/// Whether a ring bounds a polygon from the outside or cuts a hole into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingRole {
    /// Outer boundary.
    Shell,
    /// Inner boundary.
    Hole,
}

/// Vertex order used for shells; holes always use the opposite order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Winding {
    /// Shells counter-clockwise, holes clockwise.
    #[default]
    CounterClockwise,
    /// Shells clockwise, holes counter-clockwise.
    Clockwise,
}

impl Winding {
    /// Orientation a ring with the given role must have.
    pub fn orientation_for(self, role: RingRole) -> Orientation {
        let shell = match self {
            Winding::CounterClockwise => Orientation::CounterClockwise,
            Winding::Clockwise => Orientation::Clockwise,
        };
        match role {
            RingRole::Shell => shell,
            RingRole::Hole => shell.reversed(),
        }
    }
}

/// Position of a point relative to a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Containment {
    /// Strictly inside.
    Inside,
    /// On a vertex or an edge.
    OnBoundary,
    /// Strictly outside.
    Outside,
}

/// A closed sequence of points.
///
/// The vertex list is stored closed: the first point is repeated at the end
/// and no other point repeats.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring<F> {
    vertices: Vec<Point2<F>>,
    role: RingRole,
}

impl<F: Float> Ring<F> {
    /// Creates a ring, appending the first point if the input is open.
    pub fn new(mut vertices: Vec<Point2<F>>, role: RingRole) -> Self {
        if let (Some(&first), Some(&last)) = (vertices.first(), vertices.last()) {
            if first != last || vertices.len() == 1 {
                vertices.push(first);
            }
        }
        Self { vertices, role }
    }

    /// Closed vertex list (first point repeated at the end).
    #[inline]
    pub fn vertices(&self) -> &[Point2<F>] {
        &self.vertices
    }

    /// Vertices without the closing repeat.
    #[inline]
    pub fn distinct_vertices(&self) -> &[Point2<F>] {
        &self.vertices[..self.len()]
    }

    /// Number of distinct vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Returns `true` if the ring has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn role(&self) -> RingRole {
        self.role
    }

    /// Returns the same ring tagged with another role.
    #[inline]
    pub fn with_role(self, role: RingRole) -> Self {
        Self { role, ..self }
    }

    /// Signed area by the shoelace formula, positive for counter-clockwise
    /// rings. Coordinates are taken relative to the first vertex.
    pub fn signed_area(&self) -> F {
        let Some(&origin) = self.vertices.first() else {
            return F::zero();
        };
        let twice = self
            .vertices
            .windows(2)
            .fold(F::zero(), |acc, w| acc + (w[0] - origin).cross(w[1] - origin));
        twice / (F::one() + F::one())
    }

    #[inline]
    pub fn area(&self) -> F {
        self.signed_area().abs()
    }

    /// Orientation of the ring from the sign of its area.
    pub fn orientation(&self) -> Orientation {
        let area = self.signed_area();
        if area > F::zero() {
            Orientation::CounterClockwise
        } else if area < F::zero() {
            Orientation::Clockwise
        } else {
            Orientation::Collinear
        }
    }

    /// Returns `true` if every turn has the same exact orientation.
    /// Collinear turns are ignored.
    pub fn is_convex(&self) -> bool {
        let points = self.distinct_vertices();
        let n = points.len();
        if n < 3 {
            return false;
        }
        let mut turn = None;
        for i in 0..n {
            let o = orientation(points[i], points[(i + 1) % n], points[(i + 2) % n]);
            if o == Orientation::Collinear {
                continue;
            }
            match turn {
                None => turn = Some(o),
                Some(t) if t != o => return false,
                _ => {}
            }
        }
        true
    }

    /// Locates a point against the ring with an exact winding-number test.
    pub fn contains(&self, p: Point2<F>) -> Containment {
        let mut winding = 0i32;
        for w in self.vertices.windows(2) {
            let (a, b) = (w[0], w[1]);
            if a == p || point_on_segment_exact(p, a, b) {
                return Containment::OnBoundary;
            }
            if a.y <= p.y {
                if b.y > p.y && orientation(a, b, p) == Orientation::CounterClockwise {
                    winding += 1;
                }
            } else if b.y <= p.y && orientation(a, b, p) == Orientation::Clockwise {
                winding -= 1;
            }
        }
        if winding != 0 {
            Containment::Inside
        } else {
            Containment::Outside
        }
    }

    /// Reverses the vertex order, keeping the starting point.
    pub fn reverse(&mut self) {
        self.vertices.reverse();
    }

    /// Reorders the vertices so the ring winds as `winding` requires for its
    /// role.
    pub fn orient(&mut self, winding: Winding) {
        let wanted = winding.orientation_for(self.role);
        let actual = self.orientation();
        if actual != Orientation::Collinear && actual != wanted {
            self.reverse();
        }
    }
}
