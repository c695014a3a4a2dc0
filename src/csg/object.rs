//! One operand of a subtraction.

use crate::csg::polygon::CsgPolygon;
use crate::csg::vertex::VertexId;
use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use hashbrown::HashSet;
use nalgebra::Point3;

/// A closed polyhedron as a list of polygons plus every vertex they use.
///
/// Polygons are replaced in place by the splitter and have their status set by
/// the classifier.
#[derive(Debug, Clone)]
pub struct CsgObject<S: Clone> {
    pub polygons: Vec<CsgPolygon<S>>,
    pub vertices: Vec<VertexId>,
}

impl<S: Clone> CsgObject<S> {
    /// Collect the vertex list from `polygons`, first use first.
    pub fn new(polygons: Vec<CsgPolygon<S>>) -> Self {
        let mut seen = HashSet::new();
        let vertices = polygons
            .iter()
            .flat_map(|p| p.vertices.iter().copied())
            .filter(|id| seen.insert(*id))
            .collect();
        CsgObject { polygons, vertices }
    }

    /// Register a vertex introduced after construction.
    pub fn track_vertex(&mut self, id: VertexId) {
        if !self.vertices.contains(&id) {
            self.vertices.push(id);
        }
    }

    /// Bounds over all polygons; a degenerate box at the origin when empty.
    pub fn bounding_box(&self) -> Aabb {
        self.polygons
            .iter()
            .map(|p| p.bounding_box)
            .reduce(|acc, bb| acc.merged(&bb))
            .unwrap_or_else(|| Aabb::new(Point3::origin(), Point3::origin()))
    }
}
