//! Test support library
//! Provides helpers shared by the integration tests.

#![allow(dead_code)]

use csg_subtract::{CsgConfig, Mesh, float_types::Real};
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Reproducible configuration so perturbed rays do not vary between runs.
pub fn config() -> CsgConfig {
    CsgConfig::deterministic(0x5eed)
}

/// Axis aligned cube of edge `size` centred on `center`.
pub fn cube_at(size: Real, center: Point3<Real>) -> Mesh<()> {
    let half = size / 2.0;
    Mesh::cube(size, ()).with_offset(center.coords - Vector3::new(half, half, half))
}

/// Enclosed volume of a closed mesh with outward facing faces.
///
/// Sums signed tetrahedra fanned out from each face's first corner, so it is
/// exact for any planar face and independent of the mesh's placement.
pub fn volume<S: Clone + Send + Sync + Debug>(mesh: &Mesh<S>) -> Real {
    mesh.faces
        .values()
        .map(|face| {
            let p = mesh.face_positions(face);
            (1..p.len().saturating_sub(1))
                .map(|i| p[0].coords.dot(&p[i].coords.cross(&p[i + 1].coords)))
                .sum::<Real>()
        })
        .sum::<Real>()
        / 6.0
}

/// Total face area of a mesh.
pub fn surface_area<S: Clone + Send + Sync + Debug>(mesh: &Mesh<S>) -> Real {
    mesh.faces
        .values()
        .map(|face| {
            let p = mesh.face_positions(face);
            (1..p.len().saturating_sub(1))
                .map(|i| (p[i] - p[0]).cross(&(p[i + 1] - p[0])))
                .sum::<Vector3<Real>>()
                .norm()
                / 2.0
        })
        .sum()
}

/// Model frame bounds as `[min_x, min_y, min_z, max_x, max_y, max_z]`.
pub fn bounding_box<S: Clone + Send + Sync + Debug>(mesh: &Mesh<S>) -> [Real; 6] {
    let bb = mesh.bounding_box();
    [
        bb.mins.x, bb.mins.y, bb.mins.z, bb.maxs.x, bb.maxs.y, bb.maxs.z,
    ]
}

/// Panics with a readable message unless `mesh` is a valid closed solid.
pub fn assert_solid<S: Clone + Send + Sync + Debug>(mesh: &Mesh<S>) {
    assert_eq!(mesh.validate(), Ok(()), "mesh {} is not valid", mesh.id);
    assert!(mesh.is_manifold(), "mesh {} has open or repeated edges", mesh.id);
    assert!(mesh.is_planar(1e-6), "mesh {} has warped faces", mesh.id);
}

/// Area of the intersection of two counter-clockwise convex polygons in the
/// plane, by Sutherland-Hodgman clipping.
pub fn convex_overlap_area(subject: &[[Real; 2]], clip: &[[Real; 2]]) -> Real {
    let side = |a: [Real; 2], b: [Real; 2], p: [Real; 2]| {
        (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
    };

    let mut output = subject.to_vec();
    for i in 0..clip.len() {
        let (a, b) = (clip[i], clip[(i + 1) % clip.len()]);
        let input = std::mem::take(&mut output);
        for j in 0..input.len() {
            let (p, q) = (input[j], input[(j + 1) % input.len()]);
            let (sp, sq) = (side(a, b, p), side(a, b, q));
            let crossing = || {
                let t = sp / (sp - sq);
                [p[0] + t * (q[0] - p[0]), p[1] + t * (q[1] - p[1])]
            };
            match (sp >= 0.0, sq >= 0.0) {
                (true, true) => output.push(q),
                (true, false) => output.push(crossing()),
                (false, true) => {
                    output.push(crossing());
                    output.push(q);
                },
                (false, false) => {},
            }
        }
    }

    (0..output.len())
        .map(|i| {
            let (p, q) = (output[i], output[(i + 1) % output.len()]);
            p[0] * q[1] - q[0] * p[1]
        })
        .sum::<Real>()
        / 2.0
}
