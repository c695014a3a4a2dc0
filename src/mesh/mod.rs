//! The persistent polyhedral `Mesh` the CSG core reads and produces.

use crate::errors::ValidationError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::geometry::Plane;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::sync::OnceLock;

pub mod face;
pub mod manifold;
pub mod shapes;
pub mod vertex;

pub use face::Face;
pub use vertex::Vertex;

/// A closed polyhedron placed in a model.
///
/// Vertex positions are stored in the mesh's local frame; the model frame
/// position of a vertex is `rotation * pos + offset`.
#[derive(Clone, Debug)]
pub struct Mesh<S: Clone + Send + Sync + Debug> {
    /// Unique id of the mesh within its model
    pub id: usize,

    /// Vertices by id
    pub vertices: BTreeMap<usize, Vertex>,

    /// Faces by id, each an ordered list of vertex ids
    pub faces: BTreeMap<usize, Face<S>>,

    /// Translation of the local frame within the model
    pub offset: Vector3<Real>,

    /// Orientation of the local frame within the model
    pub rotation: UnitQuaternion<Real>,

    /// Opaque provenance tags
    pub remix_ids: Option<BTreeSet<String>>,

    /// Lazily calculated model frame AABB that spans `vertices`.
    pub bounding_box: OnceLock<Aabb>,
}

impl<S: Clone + Send + Sync + Debug> Mesh<S> {
    /// An empty mesh at the model origin.
    pub fn new(id: usize) -> Self {
        Mesh {
            id,
            vertices: BTreeMap::new(),
            faces: BTreeMap::new(),
            offset: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            remix_ids: None,
            bounding_box: OnceLock::new(),
        }
    }

    /// Build a mesh from a position list and faces indexing into it.
    ///
    /// Vertex and face ids are the positions in the given sequences.
    pub fn from_indexed(
        id: usize,
        positions: impl IntoIterator<Item = Point3<Real>>,
        faces: impl IntoIterator<Item = (Vec<usize>, S)>,
    ) -> Self {
        let mut mesh = Mesh::new(id);
        mesh.vertices = positions
            .into_iter()
            .enumerate()
            .map(|(i, pos)| (i, Vertex::new(i, pos)))
            .collect();
        mesh.faces = faces
            .into_iter()
            .enumerate()
            .map(|(i, (vertex_ids, properties))| (i, Face::new(i, vertex_ids, properties)))
            .collect();
        mesh
    }

    pub fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    /// Move the mesh within the model.
    pub fn with_offset(mut self, offset: Vector3<Real>) -> Self {
        self.offset = offset;
        self.invalidate_bounding_box();
        self
    }

    /// Turn the mesh about its local origin.
    pub fn with_rotation(mut self, rotation: UnitQuaternion<Real>) -> Self {
        self.rotation = rotation;
        self.invalidate_bounding_box();
        self
    }

    pub fn with_remix_ids<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.remix_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Model frame position of vertex `id`.
    pub fn vertex_position_in_model_coords(&self, id: usize) -> Option<Point3<Real>> {
        self.vertices.get(&id).map(|v| self.to_model(&v.pos))
    }

    /// Map a local frame point into the model frame.
    #[inline]
    pub fn to_model(&self, local: &Point3<Real>) -> Point3<Real> {
        self.rotation * local + self.offset
    }

    /// Map a model frame point into the local frame.
    #[inline]
    pub fn to_local(&self, model: &Point3<Real>) -> Point3<Real> {
        self.rotation.inverse() * (model - self.offset)
    }

    /// Local frame corner positions of `face`, skipping ids the mesh lacks.
    pub fn face_positions(&self, face: &Face<S>) -> Vec<Point3<Real>> {
        face.vertex_ids
            .iter()
            .filter_map(|id| self.vertices.get(id).map(|v| v.pos))
            .collect()
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`] indicating the model frame
    /// bounds of all `vertices`.
    ///
    /// [`parry3d::bounding_volume::Aabb`]: crate::float_types::parry3d::bounding_volume::Aabb
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for v in self.vertices.values() {
                let p = self.to_model(&v.pos);
                mins = mins.inf(&p);
                maxs = maxs.sup(&p);
            }

            // no vertices: a trivial box at the origin
            if mins.x > maxs.x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }
            Aabb::new(mins, maxs)
        })
    }

    /// Invalidates the cached bounding box.
    pub fn invalidate_bounding_box(&mut self) {
        self.bounding_box = OnceLock::new();
    }

    /// Check the rules every mesh in a model has to follow.
    ///
    /// The mesh needs at least one face, every face at least three distinct
    /// known vertices spanning a plane, and every coordinate must be finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.faces.is_empty() {
            return Err(ValidationError::EmptyMesh);
        }
        if let Some(v) = self.vertices.values().find(|v| !v.is_finite()) {
            return Err(ValidationError::InvalidCoordinate(v.pos));
        }

        for face in self.faces.values() {
            if face.vertex_ids.len() < 3 {
                return Err(ValidationError::TooFewVertices {
                    face: face.id,
                    count: face.vertex_ids.len(),
                });
            }
            let mut seen = BTreeSet::new();
            for &vertex in &face.vertex_ids {
                if !self.vertices.contains_key(&vertex) {
                    return Err(ValidationError::MissingVertex {
                        face: face.id,
                        vertex,
                    });
                }
                if !seen.insert(vertex) {
                    return Err(ValidationError::RepeatedVertex {
                        face: face.id,
                        vertex,
                    });
                }
            }
            if Plane::from_outline(&self.face_positions(face)).is_none() {
                return Err(ValidationError::DegenerateFace(face.id));
            }
        }

        Ok(())
    }
}
