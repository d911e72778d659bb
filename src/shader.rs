//! Ray shading.
//!
//! Maps a camera ray to a color: surface hits are colored by their normal,
//! misses fall through to a vertical white-to-blue sky gradient.

use crate::hittable::Hittable;
use crate::interval::Interval;
use crate::ray::Ray;
use crate::vec3::{Color, Vec3};

/// Sky color at the bottom of the gradient (unit direction y = -1).
pub const SKY_WHITE: Color = Color::new(1.0, 1.0, 1.0);
/// Sky color at the top of the gradient (unit direction y = +1).
pub const SKY_BLUE: Color = Color::new(0.5, 0.7, 1.0);

/// Color seen along `r` in a scene consisting of `world`.
///
/// Only hits in front of the ray origin, (0, +inf), are shaded.
pub fn ray_color(r: &Ray, world: &dyn Hittable) -> Color {
    match world.hit(r, Interval::FORWARD) {
        Some(rec) => normal_color(rec.normal),
        None => sky_color(r),
    }
}

/// Visualize a normal by mapping each component from [-1, 1] to [0, 1].
pub fn normal_color(normal: Vec3) -> Color {
    0.5 * (normal + Color::ONE)
}

/// Blend weight toward [`SKY_BLUE`] for a ray direction.
///
/// The y component of the unit direction is mapped from [-1, 1] to [0, 1].
pub fn sky_blend(r: &Ray) -> f64 {
    let unit_direction = r.direction.unit_vector();
    0.5 * (unit_direction.y + 1.0)
}

/// Background gradient for rays that hit nothing.
pub fn sky_color(r: &Ray) -> Color {
    let a = sky_blend(r);
    (1.0 - a) * SKY_WHITE + a * SKY_BLUE
}
