//! Conversion between persistent [`Mesh`]es and the CSG graph, and the
//! [`subtract`] entry point built on it.
//!
//! # Example
//!
//! ```
//! use csg_subtract::{CsgConfig, Mesh, Subtraction, subtract};
//! use nalgebra::Vector3;
//!
//! let block = Mesh::cube(2.0, "stone");
//! let chisel = Mesh::cube(2.0, "tool").with_offset(Vector3::new(1.0, 1.0, 1.0));
//!
//! match subtract(&block, &chisel, &CsgConfig::deterministic(1)) {
//!     Subtraction::Cut(carved) => assert!(carved.is_manifold()),
//!     other => panic!("expected a cut, got {other:?}"),
//! }
//! ```

use crate::config::CsgConfig;
use crate::csg::{CsgContext, CsgObject, CsgPolygon, CsgStats, VertexId, csg_subtract};
use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use crate::float_types::{EPSILON, Real};
use crate::mesh::{Face, Mesh, Vertex};
use hashbrown::HashMap;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Outcome of [`subtract`].
#[derive(Debug, Clone)]
pub enum Subtraction<S: Clone + Send + Sync + Debug> {
    /// The bounds did not meet; a copy of the minuend
    Untouched(Mesh<S>),
    /// The minuend with the subtrahend carved out
    Cut(Mesh<S>),
    /// Nothing of the minuend is left; delete it and add nothing
    Erased,
}

impl<S: Clone + Send + Sync + Debug> Subtraction<S> {
    /// The resulting mesh, `None` when the minuend was erased.
    pub fn into_mesh(self) -> Option<Mesh<S>> {
        match self {
            Subtraction::Untouched(mesh) | Subtraction::Cut(mesh) => Some(mesh),
            Subtraction::Erased => None,
        }
    }

    pub const fn is_erased(&self) -> bool {
        matches!(self, Subtraction::Erased)
    }

    pub const fn is_untouched(&self) -> bool {
        matches!(self, Subtraction::Untouched(_))
    }
}

/// Translation and uniform scale taking both operands into a frame near the
/// unit cube, where the fixed tolerances are meaningful.
///
/// A model point `p` maps to `(p + offset) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub offset: Vector3<Real>,
    pub scale: Real,
}

impl Normalization {
    /// Leaves points where they are.
    pub fn identity() -> Self {
        Normalization {
            offset: Vector3::zeros(),
            scale: 1.0,
        }
    }

    /// Center on the midpoint of the two box centers and scale by the inverse
    /// of the average box radius. The scale never drops below one, so large
    /// operands keep their size.
    pub fn for_pair(a: &Aabb, b: &Aabb) -> Self {
        let center = (a.center().coords + b.center().coords) * 0.5;
        let radius = (a.half_extents().norm() + b.half_extents().norm()) * 0.5;
        let scale = if radius > EPSILON {
            (1.0 / radius).max(1.0)
        } else {
            1.0
        };
        Normalization {
            offset: -center,
            scale,
        }
    }

    #[inline]
    pub fn apply(&self, model: &Point3<Real>) -> Point3<Real> {
        Point3::from((model.coords + self.offset) * self.scale)
    }

    #[inline]
    pub fn revert(&self, normalized: &Point3<Real>) -> Point3<Real> {
        Point3::from(normalized.coords / self.scale - self.offset)
    }
}

/// Load `mesh` into `ctx` as a CSG operand.
///
/// Every vertex is taken to the model frame, then through `normalization`,
/// and looked up in the context so coincident vertices become one. Each face
/// becomes one polygon; faces left with fewer than three distinct corners
/// after merging are dropped.
pub fn to_csg<S: Clone + Send + Sync + Debug>(
    ctx: &mut CsgContext,
    mesh: &Mesh<S>,
    normalization: &Normalization,
) -> CsgObject<S> {
    let ids: HashMap<usize, VertexId> = mesh
        .vertices
        .values()
        .map(|v| (v.id, ctx.vertex_at(normalization.apply(&mesh.to_model(&v.pos)))))
        .collect();

    let mut polygons = Vec::with_capacity(mesh.faces.len());
    for face in mesh.faces.values() {
        let mut outline: Vec<VertexId> = face
            .vertex_ids
            .iter()
            .filter_map(|id| ids.get(id).copied())
            .collect();
        outline.dedup();
        while outline.len() > 1 && outline.first() == outline.last() {
            outline.pop();
        }

        match CsgPolygon::new(ctx, outline, face.properties.clone()) {
            Some(polygon) => polygons.push(polygon),
            None => trace!(mesh = mesh.id, face = face.id, "dropped degenerate face"),
        }
    }

    CsgObject::new(polygons)
}

/// Build a persistent mesh from CSG polygons.
///
/// Vertices are shared by CSG identity, numbered in order of first use, and
/// mapped back through `normalization` and then into the frame given by
/// `offset` and `rotation`. Faces keep the order of `polygons`.
pub fn from_polys<S: Clone + Send + Sync + Debug>(
    ctx: &CsgContext,
    polygons: &[CsgPolygon<S>],
    id: usize,
    offset: Vector3<Real>,
    rotation: UnitQuaternion<Real>,
    normalization: &Normalization,
    remix_ids: Option<BTreeSet<String>>,
) -> Mesh<S> {
    let mut mesh = Mesh::new(id).with_offset(offset).with_rotation(rotation);
    mesh.remix_ids = remix_ids;

    let mut numbering: HashMap<VertexId, usize> = HashMap::new();
    let mut vertices = BTreeMap::new();
    let mut faces = BTreeMap::new();

    for (face_id, polygon) in polygons.iter().enumerate() {
        let vertex_ids = polygon
            .vertices
            .iter()
            .map(|&csg_id| {
                *numbering.entry(csg_id).or_insert_with(|| {
                    let vertex_id = vertices.len();
                    let model = normalization.revert(&ctx.position(csg_id));
                    vertices.insert(vertex_id, Vertex::new(vertex_id, mesh.to_local(&model)));
                    vertex_id
                })
            })
            .collect();
        faces.insert(face_id, Face::new(face_id, vertex_ids, polygon.metadata.clone()));
    }

    mesh.vertices = vertices;
    mesh.faces = faces;
    mesh.bounding_box = OnceLock::new();
    mesh
}

/// `minuend - subtrahend`.
///
/// Never fails: touching nothing gives [`Subtraction::Untouched`], losing
/// everything gives [`Subtraction::Erased`]. The result keeps the minuend's
/// id, offset and rotation; the operands' remix ids are merged onto it.
pub fn subtract<S: Clone + Send + Sync + Debug>(
    minuend: &Mesh<S>,
    subtrahend: &Mesh<S>,
    config: &CsgConfig,
) -> Subtraction<S> {
    subtract_with_stats(minuend, subtrahend, config).0
}

/// [`subtract`], also returning the counters of the run.
pub fn subtract_with_stats<S: Clone + Send + Sync + Debug>(
    minuend: &Mesh<S>,
    subtrahend: &Mesh<S>,
    config: &CsgConfig,
) -> (Subtraction<S>, CsgStats) {
    let minuend_bounds = minuend.bounding_box();
    let subtrahend_bounds = subtrahend.bounding_box();
    if !minuend_bounds.intersects(&subtrahend_bounds) {
        trace!(minuend = minuend.id, subtrahend = subtrahend.id, "bounds apart");
        return (Subtraction::Untouched(minuend.clone()), CsgStats::default());
    }

    let normalization = Normalization::for_pair(&minuend_bounds, &subtrahend_bounds);
    let mut ctx = CsgContext::new(config.clone());
    let mut left = to_csg(&mut ctx, minuend, &normalization);
    let mut right = to_csg(&mut ctx, subtrahend, &normalization);

    let polygons = csg_subtract(&mut ctx, &mut left, &mut right);
    let stats = ctx.stats;
    debug!(
        minuend = minuend.id,
        subtrahend = subtrahend.id,
        faces = polygons.len(),
        ?stats,
        "subtraction finished"
    );
    if polygons.is_empty() {
        return (Subtraction::Erased, stats);
    }

    let mesh = from_polys(
        &ctx,
        &polygons,
        minuend.id,
        minuend.offset,
        minuend.rotation,
        &normalization,
        merge_remix_ids(minuend, subtrahend),
    );
    (Subtraction::Cut(mesh), stats)
}

fn merge_remix_ids<S: Clone + Send + Sync + Debug>(
    a: &Mesh<S>,
    b: &Mesh<S>,
) -> Option<BTreeSet<String>> {
    match (&a.remix_ids, &b.remix_ids) {
        (None, None) => None,
        (a, b) => Some(a.iter().chain(b.iter()).flatten().cloned().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalization_round_trips_and_never_shrinks() {
        let small = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.1, 0.1, 0.1));
        let big = Aabb::new(Point3::new(100.0, 0.0, 0.0), Point3::new(140.0, 40.0, 40.0));

        let n = Normalization::for_pair(&small, &small);
        assert!(n.scale > 1.0);
        assert_relative_eq!(n.apply(&Point3::new(0.05, 0.05, 0.05)), Point3::origin());

        let n = Normalization::for_pair(&big, &big);
        assert_eq!(n.scale, 1.0);
        let p = Point3::new(123.0, 4.0, 5.0);
        assert_relative_eq!(n.revert(&n.apply(&p)), p, epsilon = 1e-9);
    }

    #[test]
    fn csg_round_trip_keeps_counts_and_properties() {
        let mut mesh = Mesh::cuboid(1.0, 2.0, 3.0, 0u8);
        for (k, face) in mesh.faces.values_mut().enumerate() {
            face.properties = k as u8;
        }

        let mut ctx = CsgContext::new(CsgConfig::deterministic(1));
        let object = to_csg(&mut ctx, &mesh, &Normalization::identity());
        let back = from_polys(
            &ctx,
            &object.polygons,
            mesh.id,
            mesh.offset,
            mesh.rotation,
            &Normalization::identity(),
            None,
        );

        assert_eq!(back.vertices.len(), mesh.vertices.len());
        assert_eq!(back.faces.len(), mesh.faces.len());
        for (before, after) in mesh.faces.values().zip(back.faces.values()) {
            assert_eq!(before.properties, after.properties);
            for (p, q) in mesh.face_positions(before).iter().zip(back.face_positions(after)) {
                assert_relative_eq!(*p, q, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn to_csg_merges_coincident_vertices() {
        // two faces of a cube with their own copies of the shared edge
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let mesh = Mesh::from_indexed(0, positions, [(vec![0, 1, 2], ()), (vec![3, 4, 5], ())]);
        let mut ctx = CsgContext::new(CsgConfig::deterministic(1));
        let object = to_csg(&mut ctx, &mesh, &Normalization::identity());
        assert_eq!(object.vertices.len(), 4);
        assert_eq!(object.polygons[0].vertices[0], object.polygons[1].vertices[1]);
    }

    #[test]
    fn remix_ids_are_merged() {
        let a = Mesh::cube(1.0, ()).with_remix_ids(["a", "shared"]);
        let b = Mesh::cube(1.0, ()).with_remix_ids(["b", "shared"]);
        let plain = Mesh::<()>::cube(1.0, ());

        let merged = merge_remix_ids(&a, &b).expect("both carry ids");
        assert_eq!(merged.into_iter().collect::<Vec<_>>(), vec!["a", "b", "shared"]);
        assert_eq!(merge_remix_ids(&plain, &plain), None);
        assert_eq!(merge_remix_ids(&plain, &b).map(|ids| ids.len()), Some(2));
    }
}
