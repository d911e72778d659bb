//! Ray representation for 3D ray casting.
//!
//! A ray is defined as r(t) = origin + t * direction, a parametric line in 3D
//! space used for intersection testing.

use crate::vec3::{Point3, Vec3};

/// Ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Starting point of the ray in world coordinates.
    pub origin: Point3,

    /// Direction vector of the ray.
    ///
    /// Not required to be normalized. Camera rays keep the full
    /// camera-to-pixel offset and intersection code accounts for its length.
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with origin and direction.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Compute a point at parameter t along the ray.
    ///
    /// Any real t is accepted, including negative values behind the origin.
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction
    }
}
