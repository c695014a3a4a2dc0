//! Arena-held vertices of the CSG graph.

use crate::float_types::Real;
use nalgebra::Point3;

/// Stable index of a [`CsgVertex`] inside its [`CsgContext`](super::CsgContext).
///
/// Ids are handed out in creation order and never reused for the lifetime of
/// the context, so two polygons holding the same id share the same vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub usize);

/// Position of a vertex relative to the other operand's solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexStatus {
    #[default]
    Unknown,
    Inside,
    Outside,
    Boundary,
}

/// A vertex of the CSG graph.
///
/// The position is fixed at creation; only the classification status and the
/// neighbor list change while an operation runs.
#[derive(Debug, Clone, PartialEq)]
pub struct CsgVertex {
    pos: Point3<Real>,
    pub status: VertexStatus,
    /// Vertices joined to this one by a polygon edge of the object currently
    /// being classified.
    pub neighbors: Vec<VertexId>,
}

impl CsgVertex {
    pub const fn new(pos: Point3<Real>) -> Self {
        CsgVertex {
            pos,
            status: VertexStatus::Unknown,
            neighbors: Vec::new(),
        }
    }

    #[inline]
    pub const fn pos(&self) -> &Point3<Real> {
        &self.pos
    }

    /// Record `other` as a neighbor unless it already is one.
    pub fn link(&mut self, other: VertexId) {
        if !self.neighbors.contains(&other) {
            self.neighbors.push(other);
        }
    }
}
