//! Vertex records of the persistent mesh.

use crate::float_types::Real;
use nalgebra::Point3;

/// A mesh vertex: a stable id plus its position in the mesh's local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: usize,
    pub pos: Point3<Real>,
}

impl Vertex {
    pub const fn new(id: usize, pos: Point3<Real>) -> Self {
        Vertex { id, pos }
    }

    /// True when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.pos.iter().all(|c| c.is_finite())
    }
}
