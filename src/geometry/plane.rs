//! Oriented planes and the side tests the splitter is built on.

use crate::float_types::{EPSILON, PARALLEL_EPSILON, Real};
use nalgebra::{Point3, Vector3};

// Point classification constants, combinable as a bitmask
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// An oriented plane `normal · p = w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal vector of the plane
    pub normal: Vector3<Real>,
    /// Distance from origin along normal
    pub w: Real,
}

impl Plane {
    /// Create a new plane from a normal (normalized here) and offset.
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Self {
        let len = normal.norm();
        Plane {
            normal: normal / len,
            w: w / len,
        }
    }

    /// Create a plane from three points.
    /// The normal direction follows the right-hand rule: (p2-p1) × (p3-p1)
    ///
    /// Returns `None` when the points are collinear or coincident.
    pub fn from_points(p1: &Point3<Real>, p2: &Point3<Real>, p3: &Point3<Real>) -> Option<Self> {
        let normal = (p2 - p1).cross(&(p3 - p1));
        if normal.norm_squared() < Real::EPSILON * Real::EPSILON {
            return None;
        }

        let normal = normal.normalize();
        Some(Plane {
            normal,
            w: normal.dot(&p1.coords),
        })
    }

    /// Plane through a polygon outline.
    ///
    /// The normal comes from Newell's method, which weighs every edge and so
    /// stays accurate when neighbouring corners are nearly collinear, as they
    /// are after points were inserted along an edge. The plane passes through
    /// the outline's barycenter.
    pub fn from_outline(points: &[Point3<Real>]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let normal = super::newell_normal(points)?;
        Some(Plane {
            normal,
            w: normal.dot(&super::barycenter(points).coords),
        })
    }

    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    pub const fn offset(&self) -> Real {
        self.w
    }

    /// Flip the plane (reverse normal and distance)
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Return a flipped copy of this plane
    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Signed distance of `point` from the plane, positive on the normal side.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.w
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] within [`EPSILON`].
    #[inline]
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        let distance = self.signed_distance(point);
        if distance > EPSILON {
            FRONT
        } else if distance < -EPSILON {
            BACK
        } else {
            COPLANAR
        }
    }

    /// Direction of the line where this plane meets `other`, or `None` when
    /// the planes are parallel.
    pub fn intersection_direction(&self, other: &Plane) -> Option<Vector3<Real>> {
        let direction = self.normal.cross(&other.normal);
        if direction.norm() < PARALLEL_EPSILON {
            None
        } else {
            Some(direction.normalize())
        }
    }
}
