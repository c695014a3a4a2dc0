//! Polygons of the CSG graph.

use crate::csg::context::CsgContext;
use crate::csg::vertex::VertexId;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::geometry::Plane;
use nalgebra::Point3;

/// Position of a polygon relative to the other operand's solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonStatus {
    #[default]
    Unknown,
    Inside,
    Outside,
    /// Coplanar with a polygon of the other solid, facing the same way
    Same,
    /// Coplanar with a polygon of the other solid, facing the other way
    Opposite,
}

/// A planar, convex polygon whose corners live in a [`CsgContext`].
///
/// - `S` is the face payload (material and the like), carried through every
///   split untouched.
#[derive(Debug, Clone)]
pub struct CsgPolygon<S: Clone> {
    /// Corners in winding order; the winding defines the normal
    pub vertices: Vec<VertexId>,

    /// The plane on which this polygon lies
    pub plane: Plane,

    /// Bounds over `vertices`
    pub bounding_box: Aabb,

    /// Face payload
    pub metadata: S,

    pub status: PolygonStatus,
}

impl<S: Clone> CsgPolygon<S> {
    /// Build a polygon, deriving its plane from the corner positions.
    ///
    /// Returns `None` for fewer than three corners or when the corners do not
    /// span a plane.
    pub fn new(ctx: &CsgContext, vertices: Vec<VertexId>, metadata: S) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let plane = Plane::from_outline(&ctx.positions(&vertices))?;
        Some(Self::with_plane(ctx, vertices, plane, metadata))
    }

    /// Build a polygon on an already known plane, as the splitter does for
    /// pieces of an existing polygon.
    pub fn with_plane(ctx: &CsgContext, vertices: Vec<VertexId>, plane: Plane, metadata: S) -> Self {
        let bounding_box = bounds_of(&ctx.positions(&vertices));
        CsgPolygon {
            vertices,
            plane,
            bounding_box,
            metadata,
            status: PolygonStatus::Unknown,
        }
    }

    /// A copy facing the other way: reversed winding, flipped plane.
    pub fn invert(&self) -> Self {
        let mut inverted = self.clone();
        inverted.vertices.reverse();
        inverted.plane.flip();
        inverted
    }

    /// Directed edges `(start, end)` in winding order.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
            .map(|(&start, &end)| (start, end))
    }
}

/// Axis-aligned bounds of a point set.
pub(crate) fn bounds_of(points: &[Point3<Real>]) -> Aabb {
    let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
    let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
    for p in points {
        mins = mins.inf(p);
        maxs = maxs.sup(p);
    }
    Aabb::new(mins, maxs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CsgConfig;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn invert_reverses_winding_and_normal() {
        let mut ctx = CsgContext::new(CsgConfig::deterministic(1));
        let ids = vec![
            ctx.vertex_at(Point3::new(0.0, 0.0, 0.0)),
            ctx.vertex_at(Point3::new(1.0, 0.0, 0.0)),
            ctx.vertex_at(Point3::new(0.0, 1.0, 0.0)),
        ];
        let poly = CsgPolygon::new(&ctx, ids.clone(), 3u8).expect("triangle spans a plane");
        assert_relative_eq!(poly.plane.normal, Vector3::z());

        let inverted = poly.invert();
        assert_relative_eq!(inverted.plane.normal, -Vector3::z());
        assert_eq!(inverted.vertices, vec![ids[2], ids[1], ids[0]]);
        assert_eq!(inverted.metadata, 3);
    }

    #[test]
    fn degenerate_outline_is_rejected() {
        let mut ctx = CsgContext::new(CsgConfig::deterministic(1));
        let ids = vec![
            ctx.vertex_at(Point3::new(0.0, 0.0, 0.0)),
            ctx.vertex_at(Point3::new(1.0, 0.0, 0.0)),
            ctx.vertex_at(Point3::new(2.0, 0.0, 0.0)),
        ];
        assert!(CsgPolygon::new(&ctx, ids, ()).is_none());
    }

    #[test]
    fn bounds_cover_all_corners() {
        let aabb = bounds_of(&[
            Point3::new(-1.0, 2.0, 0.5),
            Point3::new(3.0, -4.0, 0.0),
            Point3::new(0.0, 0.0, 7.0),
        ]);
        assert_relative_eq!(aabb.mins, Point3::new(-1.0, -4.0, 0.0));
        assert_relative_eq!(aabb.maxs, Point3::new(3.0, 2.0, 7.0));
    }
}
