// Re-export parry for the active float size
pub use parry3d_f64 as parry3d;

// Our Real scalar type:
pub type Real = f64;

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Tolerances
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//
// All comparisons happen in the normalized CSG frame (operands are centered
// and scaled so their average bounding radius is at least 1), so these are
// fixed rather than relative.

/// General-purpose tolerance.
///
/// Governs point-vs-plane side tests while splitting, the ray parameter
/// magnitude below which a ray/plane hit collapses onto the ray start, the
/// point-to-line distance in `same_side` and `is_inside`, and the minimum
/// overlap length for a cut to be warranted.
pub const EPSILON: Real = 1e-4;

/// Polygon-vs-polygon coplanarity.
///
/// Used when a raycast lands on a polygon at (near) zero distance: the two
/// polygons count as coplanar when `1 - |n1·n2|` and the difference of their
/// plane offsets are both below this value. One order of magnitude looser
/// than [`EPSILON`] since the two planes come from independent vertex triples.
pub const COPLANAR_EPSILON: Real = 1e-3;

/// Sine of the angle below which two planes, or a ray and a plane, are treated
/// as parallel.
pub const PARALLEL_EPSILON: Real = 1e-4;

/// Radius within which two positions collapse onto one `CsgVertex`.
///
/// Must stay below [`EPSILON`] so a split point can never merge with a vertex
/// that was classified strictly in front of or behind the cutting plane.
pub const VERTEX_MERGE_EPSILON: Real = 1e-5;
