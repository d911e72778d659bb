//! Ray-surface intersection contract.
//!
//! Defines the [`Hittable`] trait implemented by every surface type and the
//! [`HitRecord`] it produces. A miss is `None`, never an error.

use crate::interval::Interval;
use crate::ray::Ray;
use crate::vec3::{Point3, Vec3};

/// Ray-surface intersection information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Point where the ray intersects the surface
    pub p: Point3,
    /// Outward surface normal at `p`.
    ///
    /// Unit length only if the surface guarantees it (spheres do).
    pub normal: Vec3,
    /// Ray parameter of the intersection
    pub t: f64,
}

/// Trait for surfaces that can be intersected by rays.
///
/// Must be thread-safe (Sync + Send) so a scene can be shared by the
/// parallel renderer.
pub trait Hittable: Sync + Send {
    /// Find the nearest intersection with `ray_t.min < t < ray_t.max`.
    ///
    /// Returns `None` when the ray misses or every root lies outside the
    /// open interval. Implementations must not mutate the ray or surface.
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord>;
}

impl<H: Hittable + ?Sized> Hittable for &H {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        (**self).hit(r, ray_t)
    }
}

impl<H: Hittable + ?Sized> Hittable for Box<H> {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        (**self).hit(r, ray_t)
    }
}

// An absent surface never hits
impl<H: Hittable> Hittable for Option<H> {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.as_ref().and_then(|surface| surface.hit(r, ray_t))
    }
}
