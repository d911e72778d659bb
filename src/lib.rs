//! Normalcast ray caster
//!
//! Casts one ray per pixel from a pinhole camera into a single-sphere scene.
//! Hits are shaded by their surface normal, misses by a sky gradient. Frames
//! are written as plain PPM or PNG.

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod camera;
pub mod config;
pub mod error;
pub mod hittable;
pub mod interval;
pub mod output;
pub mod ray;
pub mod shader;
pub mod sphere;
pub mod vec3;
