//! The polygon/vertex graph and the split, classify and select pipeline that
//! runs over it.
//!
//! Everything here works on one [`CsgContext`] at a time: vertices live in the
//! context's arena and polygons refer to them by [`VertexId`], so a vertex
//! shared by several polygons (or by both operands) is a single record whose
//! status every polygon sees.

pub mod classify;
pub mod context;
pub mod object;
pub mod operation;
pub mod polygon;
pub mod split;
pub mod vertex;

pub use context::{CsgContext, CsgStats};
pub use object::CsgObject;
pub use operation::csg_subtract;
pub use polygon::{CsgPolygon, PolygonStatus};
pub use split::{is_valid_polygon_split, split_polys};
pub use vertex::{CsgVertex, VertexId, VertexStatus};
