use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use crate::mesh::Mesh;
use std::fmt::Debug;

/// Finds meshes that may touch a region of the model.
///
/// The batch driver asks the index for candidates and runs one subtraction per
/// id returned; ids whose bounds turn out not to meet the brush are left
/// untouched, so an index may over-report but must not miss.
pub trait SpatialIndex {
    /// Ids of meshes whose bounds intersect `bounds`.
    fn query(&self, bounds: &Aabb) -> Vec<usize>;
}

/// An index that tests every stored box.
#[derive(Debug, Clone, Default)]
pub struct BruteForceIndex {
    entries: Vec<(usize, Aabb)>,
}

impl BruteForceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the current bounds of `meshes`.
    pub fn from_meshes<'a, S, I>(meshes: I) -> Self
    where
        S: Clone + Send + Sync + Debug + 'a,
        I: IntoIterator<Item = &'a Mesh<S>>,
    {
        BruteForceIndex {
            entries: meshes
                .into_iter()
                .map(|mesh| (mesh.id, mesh.bounding_box()))
                .collect(),
        }
    }

    pub fn insert(&mut self, id: usize, bounds: Aabb) {
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.push((id, bounds));
    }

    pub fn remove(&mut self, id: usize) {
        self.entries.retain(|(existing, _)| *existing != id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SpatialIndex for BruteForceIndex {
    fn query(&self, bounds: &Aabb) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|(_, aabb)| aabb.intersects(bounds))
            .map(|(id, _)| *id)
            .collect()
    }
}
