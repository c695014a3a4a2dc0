//! Point, plane and polygon primitives shared by the splitter and the
//! classifier.
//!
//! Everything here is a pure function of its arguments; none of it knows
//! about the CSG arena.

use crate::float_types::{COPLANAR_EPSILON, EPSILON, PARALLEL_EPSILON, Real};
use nalgebra::{Point3, Vector3};

pub mod plane;

pub use plane::Plane;

/// Where a point lies relative to a planar polygon it has been projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum PointInPolygon {
    Inside = 1,
    Boundary = 0,
    Outside = -1,
}

/// An arbitrary point lying on `plane`.
#[inline]
pub fn point_on_plane(plane: &Plane) -> Point3<Real> {
    Point3::from(plane.normal * plane.w)
}

/// Signed ray parameter at which `ray_start + t * ray_dir` meets `plane`.
///
/// `None` when the ray runs parallel to the plane. Magnitudes below
/// [`EPSILON`] are snapped to exactly zero.
pub fn ray_plane_distance(
    ray_start: &Point3<Real>,
    ray_dir: &Vector3<Real>,
    plane: &Plane,
) -> Option<Real> {
    let denom = plane.normal.dot(ray_dir);
    if denom.abs() < PARALLEL_EPSILON * ray_dir.norm() {
        return None;
    }
    let t = (point_on_plane(plane) - ray_start).dot(&plane.normal) / denom;
    if t.abs() < EPSILON { Some(0.0) } else { Some(t) }
}

/// Point where the ray through `ray_start` along `ray_dir` meets `plane`.
///
/// When the hit is closer than [`EPSILON`] along the ray the start point
/// itself is returned, so callers never see a numerically unstable hit right
/// on top of the origin. `None` when the ray is parallel to the plane.
pub fn ray_plane_intersection(
    ray_start: &Point3<Real>,
    ray_dir: &Vector3<Real>,
    plane: &Plane,
) -> Option<Point3<Real>> {
    ray_plane_distance(ray_start, ray_dir, plane).map(|t| {
        if t == 0.0 {
            *ray_start
        } else {
            ray_start + ray_dir * t
        }
    })
}

/// Which side of the line `(a, b)` `check` lies on, compared with `reference`.
///
/// Returns `0` when `check` or `reference` lies within [`EPSILON`] of the
/// line, `1` when `check` is on the same side as `reference` and `-1`
/// otherwise. All four points must be coplanar and `a != b`.
///
/// Distances to the line are measured as `|edge × (p - a)| / |edge|`, so the
/// answer does not depend on how long the edge is.
pub fn same_side(
    a: &Point3<Real>,
    b: &Point3<Real>,
    check: &Point3<Real>,
    reference: &Point3<Real>,
) -> i8 {
    let edge = b - a;
    let tolerance = EPSILON * edge.norm();
    let check_normal = edge.cross(&(check - a));
    if check_normal.norm() < tolerance {
        return 0;
    }
    let reference_normal = edge.cross(&(reference - a));
    if reference_normal.norm() < tolerance {
        return 0;
    }

    if check_normal.dot(&reference_normal) > 0.0 { 1 } else { -1 }
}

/// Containment test of `point` against the convex outline `polygon`.
///
/// `point` must already lie in the polygon's plane: no coplanarity check is
/// made, callers project first. An outline whose corners all lie within
/// [`EPSILON`] of one line encloses nothing and reports every point as
/// [`PointInPolygon::Outside`].
pub fn is_inside(polygon: &[Point3<Real>], point: &Point3<Real>) -> PointInPolygon {
    let n = polygon.len();
    let mut on_boundary = false;
    let mut tested = false;

    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        let edge = b - a;
        let length = edge.norm();
        if length < Real::EPSILON {
            continue;
        }

        // The vertex after the edge tells us which side is "in". Skip ahead
        // past vertices that sit on the edge's line.
        let Some(reference) = (2..n)
            .map(|k| &polygon[(i + k) % n])
            .find(|c| edge.cross(&(*c - a)).norm() >= EPSILON * length)
        else {
            continue;
        };

        tested = true;
        match same_side(a, b, point, reference) {
            -1 => return PointInPolygon::Outside,
            0 => on_boundary = true,
            _ => {},
        }
    }

    if !tested {
        PointInPolygon::Outside
    } else if on_boundary {
        PointInPolygon::Boundary
    } else {
        PointInPolygon::Inside
    }
}

/// True when two oriented or opposed planes describe the same geometric plane.
pub fn are_coplanar(a: &Plane, b: &Plane) -> bool {
    let alignment = a.normal.dot(&b.normal);
    if 1.0 - alignment.abs() > COPLANAR_EPSILON {
        return false;
    }
    // opposed normals carry opposed offsets
    (a.w - alignment.signum() * b.w).abs() < COPLANAR_EPSILON
}

/// Unit normal of a planar outline by Newell's method, oriented by its winding.
///
/// `None` when the outline encloses no area.
pub fn newell_normal(points: &[Point3<Real>]) -> Option<Vector3<Real>> {
    let origin = points.first()?;
    let sum = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .fold(Vector3::zeros(), |acc, (curr, next)| {
            acc + (curr - origin).cross(&(next - origin))
        });
    if sum.norm() < Real::EPSILON {
        None
    } else {
        Some(sum.normalize())
    }
}

/// Centroid of the given points.
pub fn barycenter(points: &[Point3<Real>]) -> Point3<Real> {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as Real)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> Vec<Point3<Real>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn is_inside_triangle_points() {
        let tri = triangle();
        assert_eq!(is_inside(&tri, &Point3::new(0.1, 0.1, 0.0)), PointInPolygon::Inside);
        assert_eq!(is_inside(&tri, &Point3::new(0.6, 0.6, 0.0)), PointInPolygon::Outside);
        assert_eq!(is_inside(&tri, &Point3::new(0.5, 0.5, 0.0)), PointInPolygon::Boundary);
    }

    #[test]
    fn is_inside_vertex_counts_as_boundary() {
        let tri = triangle();
        assert_eq!(is_inside(&tri, &Point3::new(0.0, 0.0, 0.0)), PointInPolygon::Boundary);
    }

    #[test]
    fn is_inside_tolerates_collinear_vertices() {
        // square with an extra vertex in the middle of its bottom edge
        let square = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        assert_eq!(is_inside(&square, &Point3::new(1.0, 1.0, 0.0)), PointInPolygon::Inside);
        assert_eq!(is_inside(&square, &Point3::new(3.0, 1.0, 0.0)), PointInPolygon::Outside);
        assert_eq!(is_inside(&square, &Point3::new(1.5, 0.0, 0.0)), PointInPolygon::Boundary);
    }

    #[test]
    fn is_inside_small_triangle_keeps_far_points_out() {
        let sliver = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.003, 0.0, 0.0),
            Point3::new(0.0, 0.003, 0.0),
        ];
        assert_eq!(is_inside(&sliver, &Point3::new(5.0, -7.0, 0.0)), PointInPolygon::Outside);
        assert_eq!(is_inside(&sliver, &Point3::new(0.01, 0.01, 0.0)), PointInPolygon::Outside);
        assert_eq!(is_inside(&sliver, &Point3::new(0.001, 0.001, 0.0)), PointInPolygon::Inside);
    }

    #[test]
    fn is_inside_collapsed_outline_contains_nothing() {
        let flat = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, EPSILON * 0.1, 0.0),
        ];
        assert_eq!(is_inside(&flat, &Point3::new(1.0, 0.0, 0.0)), PointInPolygon::Outside);
        assert_eq!(is_inside(&flat, &Point3::new(3.0, 5.0, 0.0)), PointInPolygon::Outside);
    }

    #[test]
    fn same_side_on_line_is_a_distance() {
        // a short edge must not widen the band around its line
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(0.001, 0.0, 0.0);
        let above = Point3::new(0.5, 0.01, 0.0);
        let below = Point3::new(-3.0, -0.01, 0.0);
        assert_eq!(same_side(&a, &b, &above, &Point3::new(0.0, 1.0, 0.0)), 1);
        assert_eq!(same_side(&a, &b, &below, &Point3::new(0.0, 1.0, 0.0)), -1);
        assert_eq!(
            same_side(&a, &b, &Point3::new(7.0, EPSILON * 0.5, 0.0), &above),
            0
        );
    }

    #[test]
    fn same_side_signs() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let up = Point3::new(0.3, 1.0, 0.0);
        let down = Point3::new(0.3, -1.0, 0.0);
        let on = Point3::new(5.0, 0.0, 0.0);
        assert_eq!(same_side(&a, &b, &up, &Point3::new(0.0, 4.0, 0.0)), 1);
        assert_eq!(same_side(&a, &b, &down, &up), -1);
        assert_eq!(same_side(&a, &b, &on, &up), 0);
    }

    #[test]
    fn same_side_is_scale_independent() {
        for scale in [0.5, 1.0, 1e4] {
            let a = Point3::new(0.0, 0.0, 0.0);
            let b = Point3::new(scale, 0.0, 0.0);
            let check = Point3::new(0.5 * scale, 0.25 * scale, 0.0);
            let reference = Point3::new(0.1 * scale, 2.0 * scale, 0.0);
            assert_eq!(same_side(&a, &b, &check, &reference), 1);
        }
    }

    #[test]
    fn ray_plane_hits_and_snaps() {
        let plane = Plane::from_normal(Vector3::z(), 2.0);
        let start = Point3::new(1.0, 1.0, 0.0);
        let hit = ray_plane_intersection(&start, &Vector3::z(), &plane).expect("ray meets plane");
        assert_relative_eq!(hit, Point3::new(1.0, 1.0, 2.0));

        let near = Point3::new(1.0, 1.0, 2.0 - EPSILON * 0.1);
        let snapped =
            ray_plane_intersection(&near, &Vector3::z(), &plane).expect("ray meets plane");
        assert_eq!(snapped, near);

        assert!(ray_plane_intersection(&start, &Vector3::x(), &plane).is_none());
    }

    #[test]
    fn ray_plane_behind_start_is_negative() {
        let plane = Plane::from_normal(Vector3::z(), -3.0);
        let t = ray_plane_distance(&Point3::origin(), &Vector3::z(), &plane)
            .expect("ray meets plane");
        assert_relative_eq!(t, -3.0);
    }

    #[test]
    fn point_on_plane_satisfies_equation() {
        let plane = Plane::from_normal(Vector3::new(1.0, 2.0, -1.0), 4.0);
        let p = point_on_plane(&plane);
        assert_relative_eq!(plane.signed_distance(&p), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn coplanar_detects_opposed_planes() {
        let a = Plane::from_normal(Vector3::x(), 1.0);
        assert!(are_coplanar(&a, &a.flipped()));
        assert!(!are_coplanar(&a, &Plane::from_normal(Vector3::x(), 1.1)));
        assert!(!are_coplanar(&a, &Plane::from_normal(Vector3::y(), 1.0)));
    }
}
