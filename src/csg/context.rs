//! Per-operation state: the vertex arena, positional deduplication, the
//! perturbation RNG and run counters.

use crate::config::CsgConfig;
use crate::csg::vertex::{CsgVertex, VertexId};
use crate::float_types::{Real, VERTEX_MERGE_EPSILON};
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use rand::{Rng, rngs::StdRng};

/// Counters describing what one subtraction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CsgStats {
    /// Polygons replaced by the splitter
    pub splits: usize,
    /// Cuts found but thrown away as degenerate or invalid
    pub rejected_splits: usize,
    /// Full passes over polygon lists made while splitting
    pub split_passes: usize,
    /// `split_object` calls that hit the pass cap before settling
    pub truncated_split_loops: usize,
    /// Polygons classified by casting a ray
    pub raycasts: usize,
    /// Extra rays cast after an ambiguous hit
    pub perturbed_raycasts: usize,
    /// Polygons classified from an already known vertex status
    pub propagated_polygons: usize,
}

/// State owned by exactly one subtraction.
///
/// Holds every [`CsgVertex`] both operands reference. Looking a position up
/// through [`vertex_at`](Self::vertex_at) returns the existing vertex within
/// [`VERTEX_MERGE_EPSILON`], so coincident corners coming from different
/// faces, different operands or different splits all become one vertex.
///
/// Not `Sync` by intent of use: parallel callers build one context per
/// subtraction.
#[derive(Debug)]
pub struct CsgContext {
    vertices: Vec<CsgVertex>,
    cells: HashMap<(i64, i64, i64), Vec<VertexId>>,
    cell_size: Real,
    rng: StdRng,
    pub config: CsgConfig,
    pub stats: CsgStats,
}

impl CsgContext {
    pub fn new(config: CsgConfig) -> Self {
        CsgContext {
            vertices: Vec::new(),
            cells: HashMap::new(),
            // duplicates are always in adjacent cells
            cell_size: VERTEX_MERGE_EPSILON * 2.0,
            rng: config.rng(),
            config,
            stats: CsgStats::default(),
        }
    }

    #[inline]
    fn cell_coords(&self, p: &Point3<Real>) -> (i64, i64, i64) {
        let discretize = |v: Real| (v / self.cell_size).floor() as i64;
        (discretize(p.x), discretize(p.y), discretize(p.z))
    }

    /// Existing vertex within [`VERTEX_MERGE_EPSILON`] of `pos`, if any.
    pub fn find_vertex(&self, pos: &Point3<Real>) -> Option<VertexId> {
        let (cx, cy, cz) = self.cell_coords(pos);
        let mut best: Option<(Real, VertexId)> = None;

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(ids) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &id in ids {
                        let distance = (self.vertices[id.0].pos() - pos).norm();
                        if distance < VERTEX_MERGE_EPSILON
                            && best.is_none_or(|(closest, _)| distance < closest)
                        {
                            best = Some((distance, id));
                        }
                    }
                }
            }
        }

        best.map(|(_, id)| id)
    }

    /// Look up the vertex at `pos`, creating it when none is close enough.
    pub fn vertex_at(&mut self, pos: Point3<Real>) -> VertexId {
        if let Some(id) = self.find_vertex(&pos) {
            return id;
        }

        let id = VertexId(self.vertices.len());
        self.vertices.push(CsgVertex::new(pos));
        let cell = self.cell_coords(&pos);
        self.cells.entry(cell).or_default().push(id);
        id
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> &CsgVertex {
        &self.vertices[id.0]
    }

    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut CsgVertex {
        &mut self.vertices[id.0]
    }

    #[inline]
    pub fn position(&self, id: VertexId) -> Point3<Real> {
        *self.vertices[id.0].pos()
    }

    /// Positions of `ids`, in order.
    pub fn positions(&self, ids: &[VertexId]) -> Vec<Point3<Real>> {
        ids.iter().map(|&id| self.position(id)).collect()
    }

    /// Number of vertices created so far.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Random vector with each component in `[-magnitude, magnitude)`.
    pub fn random_offset(&mut self, magnitude: Real) -> Vector3<Real> {
        Vector3::new(
            self.rng.gen_range(-1.0..1.0),
            self.rng.gen_range(-1.0..1.0),
            self.rng.gen_range(-1.0..1.0),
        ) * magnitude
    }
}
