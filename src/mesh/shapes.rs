//! Primitive closed meshes with shared, indexed vertices

use crate::float_types::Real;
use crate::mesh::Mesh;
use nalgebra::Point3;
use std::fmt::Debug;

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Axis-aligned box with one corner at the local origin and the opposite
    /// corner at `(width, length, height)`.
    ///
    /// ```text
    ///     4-------5
    ///    /|      /|
    ///   0-------1 |
    ///   | |     | |
    ///   | 7-----|-6
    ///   |/      |/
    ///   3-------2
    /// ```
    ///
    /// Faces are wound counter-clockwise seen from outside:
    /// - **Bottom**: [0,3,2,1] (z=0, normal -Z)
    /// - **Top**: [4,5,6,7] (z=height, normal +Z)
    /// - **Front**: [0,1,5,4] (y=0, normal -Y)
    /// - **Back**: [3,7,6,2] (y=length, normal +Y)
    /// - **Left**: [0,4,7,3] (x=0, normal -X)
    /// - **Right**: [1,2,6,5] (x=width, normal +X)
    pub fn cuboid(width: Real, length: Real, height: Real, properties: S) -> Mesh<S> {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(width, 0.0, 0.0),
            Point3::new(width, length, 0.0),
            Point3::new(0.0, length, 0.0),
            Point3::new(0.0, 0.0, height),
            Point3::new(width, 0.0, height),
            Point3::new(width, length, height),
            Point3::new(0.0, length, height),
        ];
        let faces = [
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![3, 7, 6, 2],
            vec![0, 4, 7, 3],
            vec![1, 2, 6, 5],
        ];
        Mesh::from_indexed(
            0,
            positions,
            faces.into_iter().map(|ids| (ids, properties.clone())),
        )
    }

    pub fn cube(width: Real, properties: S) -> Mesh<S> {
        Self::cuboid(width, width, width, properties)
    }

    /// Regular octahedron centred on the local origin with its six corners on
    /// the axes at distance `radius`. All eight faces are triangles.
    pub fn octahedron(radius: Real, properties: S) -> Mesh<S> {
        let positions = [
            Point3::new(radius, 0.0, 0.0),
            Point3::new(-radius, 0.0, 0.0),
            Point3::new(0.0, radius, 0.0),
            Point3::new(0.0, -radius, 0.0),
            Point3::new(0.0, 0.0, radius),
            Point3::new(0.0, 0.0, -radius),
        ];
        let faces = [
            vec![0, 2, 4],
            vec![1, 4, 2],
            vec![0, 4, 3],
            vec![1, 3, 4],
            vec![0, 5, 2],
            vec![1, 2, 5],
            vec![0, 3, 5],
            vec![1, 5, 3],
        ];
        Mesh::from_indexed(
            0,
            positions,
            faces.into_iter().map(|ids| (ids, properties.clone())),
        )
    }
}
