//! **Constructive Solid Geometry subtraction** for closed polyhedral meshes,
//! built around splitting polygons along each other's planes and classifying
//! the pieces by raycasting and adjacency propagation.
//!
//! The pipeline for `A - B`:
//! 1. both meshes are moved into a normalized frame and loaded into a shared
//!    vertex arena ([`bridge::to_csg`]),
//! 2. polygons of each operand are cut where they cross the other
//!    ([`csg::split`]),
//! 3. every piece is classified as inside, outside, or coplanar with the other
//!    solid ([`csg::classify`]),
//! 4. the pieces bounding `A - B` are selected, the ones taken from `B` turned
//!    inside out, and converted back into a [`Mesh`] ([`bridge::from_polys`]).
//!
//! # Features
//! #### Optional
//! - **parallel**: use rayon to run the pairwise subtractions of
//!   [`model::subtract_from_model`] on several threads
//!
//! # Example
//! ```
//! use csg_subtract::{CsgConfig, Mesh, subtract};
//! use nalgebra::Vector3;
//!
//! let wall = Mesh::cuboid(4.0, 1.0, 3.0, "brick");
//! let far_away = Mesh::cube(1.0, "air").with_offset(Vector3::new(10.0, 0.0, 0.0));
//!
//! assert!(subtract(&wall, &far_away, &CsgConfig::default()).is_untouched());
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod bridge;
pub mod config;
pub mod csg;
pub mod errors;
pub mod float_types;
pub mod geometry;
pub mod mesh;
pub mod model;
pub mod traits;

pub use bridge::{Subtraction, subtract, subtract_with_stats};
pub use config::CsgConfig;
pub use csg::CsgStats;
pub use errors::{CsgError, ValidationError};
pub use mesh::Mesh;
pub use model::{Command, CompositeCommand, Model, subtract_from_model};
pub use traits::{BruteForceIndex, SpatialIndex};
