//! Face records of the persistent mesh.

/// A planar, convex face given as vertex ids in winding order.
///
/// `properties` is the face's material payload; the CSG core carries it
/// through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Face<S: Clone> {
    pub id: usize,
    pub vertex_ids: Vec<usize>,
    pub properties: S,
}

impl<S: Clone> Face<S> {
    pub const fn new(id: usize, vertex_ids: Vec<usize>, properties: S) -> Self {
        Face {
            id,
            vertex_ids,
            properties,
        }
    }

    /// Directed edges `(start, end)` between vertex ids, in winding order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.vertex_ids
            .iter()
            .zip(self.vertex_ids.iter().cycle().skip(1))
            .map(|(&start, &end)| (start, end))
    }
}
