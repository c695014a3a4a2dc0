//! Validation and batch-operation errors

use crate::float_types::Real;
use nalgebra::Point3;

/// All the validity issues a persistent [`Mesh`](crate::mesh::Mesh) may have.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// (EmptyMesh) The mesh has no faces at all
    #[error("(EmptyMesh) The mesh has no faces")]
    EmptyMesh,
    /// (TooFewVertices) A face has fewer than three vertices
    #[error("(TooFewVertices) Face {face} has only {count} vertices")]
    TooFewVertices { face: usize, count: usize },
    /// (MissingVertex) A face references a vertex id the mesh does not hold
    #[error("(MissingVertex) Face {face} references unknown vertex {vertex}")]
    MissingVertex { face: usize, vertex: usize },
    /// (RepeatedVertex) A face visits the same vertex twice
    #[error("(RepeatedVertex) Face {face} visits vertex {vertex} more than once")]
    RepeatedVertex { face: usize, vertex: usize },
    /// (InvalidCoordinate) The coordinate has a NaN or infinite
    #[error("(InvalidCoordinate) The coordinate ({0}) has a NaN or infinite")]
    InvalidCoordinate(Point3<Real>),
    /// (DegenerateFace) A face's vertices do not span a plane
    #[error("(DegenerateFace) Face {0} has collinear or coincident vertices")]
    DegenerateFace(usize),
}

/// Errors raised by the batch subtract-from-model driver.
///
/// The core [`subtract`](crate::bridge::subtract) never fails; degeneracy is
/// absorbed there. These errors only describe results the model refuses to
/// commit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CsgError {
    /// A subtraction produced a mesh that breaks the model's validity rules
    #[error("subtraction result for mesh {mesh_id} is invalid: {source}")]
    Validation {
        mesh_id: usize,
        #[source]
        source: ValidationError,
    },
    /// The spatial index named a mesh the model does not hold
    #[error("mesh {0} is not part of the model")]
    UnknownMesh(usize),
    /// An edit adds a mesh under an id already in use
    #[error("mesh id {0} is already taken")]
    DuplicateMesh(usize),
}
