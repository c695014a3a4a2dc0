use crate::float_types::Real;
use crate::geometry::Plane;
use crate::mesh::Mesh;
use hashbrown::HashMap;
use nalgebra::Point3;
use std::fmt::Debug;

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Checks if the Mesh object is a closed, consistently wound surface
    ///
    /// ### Returns
    /// Returns `true` if every directed edge appears exactly once and is
    /// matched by exactly one edge running the other way
    ///
    /// ### Notes:
    /// - Matching is positional, so two distinct vertices at the same spot
    ///   count as one.
    /// - Uses a `QUANTIZATION_FACTOR` for `Real` coordinates
    pub fn is_manifold(&self) -> bool {
        const QUANTIZATION_FACTOR: Real = 1e7;

        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        struct QuantizedPoint(i64, i64, i64);

        fn quantize_point(p: &Point3<Real>) -> QuantizedPoint {
            QuantizedPoint(
                (p.x * QUANTIZATION_FACTOR).round() as i64,
                (p.y * QUANTIZATION_FACTOR).round() as i64,
                (p.z * QUANTIZATION_FACTOR).round() as i64,
            )
        }

        let mut edge_counts: HashMap<(QuantizedPoint, QuantizedPoint), u32> = HashMap::new();
        for face in self.faces.values() {
            let outline: Vec<QuantizedPoint> =
                self.face_positions(face).iter().map(quantize_point).collect();
            if outline.len() != face.vertex_ids.len() {
                return false;
            }
            for (a, b) in outline.iter().zip(outline.iter().cycle().skip(1)) {
                if a == b {
                    return false;
                }
                *edge_counts.entry((*a, *b)).or_insert(0) += 1;
            }
        }

        !edge_counts.is_empty()
            && edge_counts
                .iter()
                .all(|(&(a, b), &count)| count == 1 && edge_counts.get(&(b, a)) == Some(&1))
    }

    /// True when every face's corners lie within `tolerance` of the plane
    /// through the face.
    pub fn is_planar(&self, tolerance: Real) -> bool {
        self.faces.values().all(|face| {
            let outline = self.face_positions(face);
            Plane::from_outline(&outline).is_some_and(|plane| {
                outline
                    .iter()
                    .all(|p| plane.signed_distance(p).abs() <= tolerance)
            })
        })
    }
}
