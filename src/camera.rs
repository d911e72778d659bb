//! Camera for ray generation and frame rendering

use image::ImageBuffer;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;

use crate::hittable::Hittable;
use crate::output::{color_to_rgb, Frame};
use crate::ray::Ray;
use crate::shader::ray_color;
use crate::vec3::{Color, Point3, Vec3};

/// Derived viewport geometry for a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Image height in pixels, derived from width and aspect ratio
    pub image_height: u32,
    /// Vector across the full viewport width (+x)
    pub viewport_u: Vec3,
    /// Vector down the full viewport height (-y)
    pub viewport_v: Vec3,
    /// Offset from pixel to pixel horizontally
    pub pixel_delta_u: Vec3,
    /// Offset from pixel to pixel vertically
    pub pixel_delta_v: Vec3,
    /// World position of the viewport's top-left corner
    pub viewport_upper_left: Point3,
    /// World position of the center of pixel (0, 0)
    pub pixel00_loc: Point3,
    /// Camera position all rays start from
    pub center: Point3,
}

impl Viewport {
    /// Ray from the camera center through the center of pixel (i, j).
    ///
    /// The direction is left unnormalized.
    pub fn get_ray(&self, i: u32, j: u32) -> Ray {
        let pixel_center = self.pixel00_loc
            + (i as f64 * self.pixel_delta_u)
            + (j as f64 * self.pixel_delta_v);
        Ray::new(self.center, pixel_center - self.center)
    }
}

/// Axis-aligned pinhole camera looking down -z.
///
/// One ray per pixel center, no sampling.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Target ratio of image width over height
    pub aspect_ratio: f64,
    /// Rendered image width in pixel count
    pub image_width: u32,
    /// Distance from the camera center to the viewport plane
    pub focal_length: f64,
    /// Height of the viewport in world units
    pub viewport_height: f64,
    /// Camera position in world space
    pub center: Point3,

    /// Derived geometry, computed by `initialize`
    viewport: Viewport,
    /// Flag to track whether camera parameters have been calculated
    initialized: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Creates a new camera with default settings.
    ///
    /// Default: 400 pixels wide at 16:9, focal length 1, viewport height 2,
    /// centered at the origin.
    pub fn new() -> Self {
        Self {
            aspect_ratio: 16.0 / 9.0,
            image_width: 400,
            focal_length: 1.0,
            viewport_height: 2.0,
            center: Point3::ZERO,
            viewport: Viewport {
                image_height: 1,
                viewport_u: Vec3::ZERO,
                viewport_v: Vec3::ZERO,
                pixel_delta_u: Vec3::ZERO,
                pixel_delta_v: Vec3::ZERO,
                viewport_upper_left: Point3::ZERO,
                pixel00_loc: Point3::ZERO,
                center: Point3::ZERO,
            },
            initialized: false,
        }
    }

    /// Compute the viewport geometry if needed and return it.
    pub fn ensure_initialized(&mut self) -> Viewport {
        self.initialize();
        self.viewport
    }

    /// Image height in pixels.
    pub fn image_height(&mut self) -> u32 {
        self.ensure_initialized().image_height
    }

    /// Renders the scene into a frame, one rayon task per row.
    ///
    /// Each task writes only its own row of the buffer so the result is
    /// identical to [`Camera::render_with`].
    pub fn render(&mut self, world: &dyn Hittable) -> Frame {
        self.initialize();
        let width = self.image_width;
        let height = self.viewport.image_height;

        let mut frame: Frame = ImageBuffer::new(width, height);

        info!("Generating {}x{} image using {} CPU cores...", width, height, rayon::current_num_threads());
        let generation_start = std::time::Instant::now();
        let pb = row_progress(height);

        let viewport = self.viewport;
        // Each chunk is one row of interleaved RGB samples
        frame
            .par_chunks_mut((3 * width as usize).max(3))
            .enumerate()
            .for_each(|(j, row)| {
                for (i, pixel) in row.chunks_exact_mut(3).enumerate() {
                    let r = viewport.get_ray(i as u32, j as u32);
                    pixel.copy_from_slice(&color_to_rgb(ray_color(&r, world)).0);
                }
                pb.inc(1);
            });

        pb.finish();
        info!("Image generated in {:.2?}", generation_start.elapsed());

        frame
    }

    /// Renders the scene sequentially, handing each color to `emit`.
    ///
    /// Pixels are produced row by row, top to bottom, left to right.
    pub fn render_with<F>(&mut self, world: &dyn Hittable, mut emit: F)
    where
        F: FnMut(Color),
    {
        self.initialize();
        let height = self.viewport.image_height;

        let generation_start = std::time::Instant::now();
        let pb = row_progress(height);

        for j in 0..height {
            debug!("Scanlines remaining: {}", height - j);
            for i in 0..self.image_width {
                let r = self.viewport.get_ray(i, j);
                emit(ray_color(&r, world));
            }
            pb.inc(1);
        }

        pb.finish();
        info!("Image generated in {:.2?}", generation_start.elapsed());
    }

    /// Initialize viewport geometry from the current settings.
    ///
    /// Automatically called by the render methods. Changing settings after
    /// initialization has no effect.
    fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        let image_height = ((self.image_width as f64 / self.aspect_ratio) as u32).max(1);

        // Viewport width follows the real pixel ratio, not the nominal one
        let viewport_width = self.viewport_height * (self.image_width as f64 / image_height as f64);

        let viewport_u = Vec3::new(viewport_width, 0.0, 0.0);
        let viewport_v = Vec3::new(0.0, -self.viewport_height, 0.0);

        let pixel_delta_u = viewport_u / self.image_width as f64;
        let pixel_delta_v = viewport_v / image_height as f64;

        let viewport_upper_left =
            self.center - Vec3::new(0.0, 0.0, self.focal_length) - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        self.viewport = Viewport {
            image_height,
            viewport_u,
            viewport_v,
            pixel_delta_u,
            pixel_delta_v,
            viewport_upper_left,
            pixel00_loc,
            center: self.center,
        };
        self.initialized = true;
    }
}

fn row_progress(rows: u32) -> ProgressBar {
    let pb = ProgressBar::new(rows as u64);
    let style = ProgressStyle::default_bar()
        .template("{bar:40} {pos}/{len} rows ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::rgb_to_color;
    use crate::shader::{sky_blend, sky_color, SKY_BLUE, SKY_WHITE};
    use crate::sphere::Sphere;
    use more_asserts::{assert_ge, assert_gt, assert_le, assert_lt};

    fn sample_camera(image_width: u32) -> Camera {
        let mut camera = Camera::new();
        camera.image_width = image_width;
        camera
    }

    fn sample_sphere() -> Sphere {
        Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5)
    }

    #[test]
    fn it_derives_image_height_from_aspect_ratio() {
        assert_eq!(sample_camera(400).image_height(), 225);
        assert_eq!(sample_camera(2).image_height(), 1);
        // Never fewer than one row
        let mut wide = sample_camera(10);
        wide.aspect_ratio = 100.0;
        assert_eq!(wide.image_height(), 1);
    }

    #[test]
    fn it_sizes_the_viewport_from_the_real_pixel_ratio() {
        let mut camera = sample_camera(400);
        let vp = camera.ensure_initialized();
        assert_eq!(vp.viewport_v, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(vp.viewport_u, Vec3::new(2.0 * (400.0 / 225.0), 0.0, 0.0));
        assert_lt!((vp.pixel_delta_u.x * 400.0 - vp.viewport_u.x).abs(), 1e-12);
        assert_lt!((vp.pixel_delta_v.y * 225.0 + 2.0).abs(), 1e-12);
    }

    #[test]
    fn it_places_the_top_left_pixel() {
        let mut camera = sample_camera(4);
        camera.aspect_ratio = 2.0;
        let vp = camera.ensure_initialized();
        assert_eq!(vp.image_height, 2);
        // Viewport is 4 x 2, pixels are 1 x 1
        assert_eq!(vp.viewport_upper_left, Point3::new(-2.0, 1.0, -1.0));
        assert_eq!(vp.pixel00_loc, Point3::new(-1.5, 0.5, -1.0));
        assert_eq!(vp.get_ray(0, 0).direction, Vec3::new(-1.5, 0.5, -1.0));
        assert_eq!(vp.get_ray(3, 1).direction, Vec3::new(1.5, -0.5, -1.0));
    }

    #[test]
    fn it_casts_rays_from_the_camera_center() {
        let mut camera = sample_camera(4);
        camera.aspect_ratio = 2.0;
        camera.center = Point3::new(1.0, 2.0, 3.0);
        let r = camera.ensure_initialized().get_ray(0, 0);
        assert_eq!(r.origin, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(r.direction, Vec3::new(-1.5, 0.5, -1.0));
    }

    #[test]
    fn it_builds_pixel_rays_only_from_initialized_geometry() {
        // A fresh camera hands out rays only through ensure_initialized
        let viewport = Camera::new().ensure_initialized();
        let r = viewport.get_ray(200, 112);
        assert_gt!(r.direction.length(), 0.9);
        let c = ray_color(&r, &sample_sphere());
        assert!(c.x.is_finite() && c.y.is_finite() && c.z.is_finite());
        assert_gt!(c.z, 0.95);
    }

    #[test]
    fn it_ignores_setting_changes_after_initialization() {
        let mut camera = sample_camera(400);
        assert_eq!(camera.image_height(), 225);
        camera.image_width = 800;
        assert_eq!(camera.image_height(), 225);
    }

    #[test]
    fn it_shades_the_center_pixel_with_the_normal_palette() {
        let mut camera = sample_camera(400);
        let frame = camera.render(&sample_sphere());
        assert_eq!(frame.dimensions(), (400, 225));
        let c = rgb_to_color(frame.get_pixel(200, 112));
        for i in 0..3 {
            assert_ge!(c[i], 0.0);
            assert_le!(c[i], 1.0);
        }
        // Normal faces the camera: blue dominates, not gray
        assert_gt!(c.z, 0.95);
        assert_lt!(c.x, 0.6);
        assert_lt!(c.y, 0.6);
    }

    #[test]
    fn it_renders_a_tiny_frame() {
        let mut camera = sample_camera(2);
        let frame = camera.render(&sample_sphere());
        assert_eq!(frame.dimensions(), (2, 1));
        // Both pixel rays pass beside the sphere, level with the horizon
        let horizon = color_to_rgb(sky_color(&camera.ensure_initialized().get_ray(0, 0)));
        assert!(frame.pixels().all(|pixel| *pixel == horizon));
    }

    #[test]
    fn it_draws_only_sky_without_a_sphere() {
        let mut camera = sample_camera(32);
        let world: Option<Sphere> = None;
        let frame = camera.render(&world);
        let viewport = camera.ensure_initialized();

        let mut previous_blend = f64::INFINITY;
        for j in 0..frame.height() {
            let a = sky_blend(&viewport.get_ray(0, j));
            // Viewport v points down, so the top row is the bluest
            assert_lt!(a, previous_blend);
            previous_blend = a;

            for i in 0..frame.width() {
                let c = rgb_to_color(frame.get_pixel(i, j));
                let row_blend = sky_blend(&viewport.get_ray(i, j));
                let expected = (1.0 - row_blend) * SKY_WHITE + row_blend * SKY_BLUE;
                assert_eq!(c, expected);
                // On the white-blue segment: remaining channels follow from red
                let t = (1.0 - c.x) / 0.5;
                assert_lt!((c.y - (1.0 - 0.3 * t)).abs(), 1e-12);
                assert_lt!((c.z - 1.0).abs(), 1e-12);
            }
        }
    }

    #[test]
    fn it_renders_the_same_pixels_sequentially_and_in_parallel() {
        let world = sample_sphere();
        let mut camera = sample_camera(64);
        let parallel = camera.render(&world);

        let mut sequential = Vec::new();
        camera.render_with(&world, |c| sequential.push(c));
        let parallel: Vec<Color> = parallel.pixels().map(rgb_to_color).collect();
        assert_eq!(sequential, parallel);
    }
}
