//! Render settings.
//!
//! A [`RenderConfig`] can be loaded from JSON; every field is optional and
//! defaults to the sample scene: a 400 pixel wide 16:9 image of a sphere of
//! radius 0.5 centered one unit in front of the camera.
//!
//! ```json
//! {
//!   "image_width": 800,
//!   "camera_center": [0, 0, 0],
//!   "sphere": { "center": [0, 0, -1], "radius": 0.5 }
//! }
//! ```
//!
//! `"sphere": null` renders the sky alone.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::camera::Camera;
use crate::error::RenderError;
use crate::sphere::Sphere;

/// Sphere placement in a configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SphereConfig {
    /// Center in world coordinates
    pub center: [f64; 3],
    /// Radius, must be positive
    pub radius: f64,
}

/// Image, camera and scene settings for one render.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Image width in pixels
    pub image_width: u32,
    /// Target width over height; the image height is derived from it
    pub aspect_ratio: f64,
    /// Distance from the camera to the viewport
    pub focal_length: f64,
    /// Viewport height in world units
    pub viewport_height: f64,
    /// Camera position in world coordinates
    pub camera_center: [f64; 3],
    /// The single scene sphere, `None` for an empty scene
    pub sphere: Option<SphereConfig>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
            focal_length: 1.0,
            viewport_height: 2.0,
            camera_center: [0.0, 0.0, 0.0],
            sphere: Some(SphereConfig {
                center: [0.0, 0.0, -1.0],
                radius: 0.5,
            }),
        }
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), RenderError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RenderError::InvalidConfig(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )))
    }
}

fn require_finite(name: &str, value: [f64; 3]) -> Result<(), RenderError> {
    if value.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(RenderError::InvalidConfig(format!("{} must be finite, got {:?}", name, value)))
    }
}

impl RenderConfig {
    /// Read settings from a JSON file. The result is validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RenderError> {
        let path = path.as_ref();
        debug!("Loading render settings from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse settings from a JSON string. The result is validated.
    pub fn from_json(contents: &str) -> Result<Self, RenderError> {
        let config: RenderConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the camera or sphere math degenerate.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.image_width == 0 {
            return Err(RenderError::InvalidConfig("image_width must be at least 1".to_string()));
        }
        require_positive("aspect_ratio", self.aspect_ratio)?;
        require_positive("focal_length", self.focal_length)?;
        require_positive("viewport_height", self.viewport_height)?;
        require_finite("camera_center", self.camera_center)?;
        if let Some(sphere) = &self.sphere {
            require_finite("sphere.center", sphere.center)?;
            require_positive("sphere.radius", sphere.radius)?;
        }
        Ok(())
    }

    /// Camera described by these settings.
    pub fn camera(&self) -> Camera {
        let mut camera = Camera::new();
        camera.image_width = self.image_width;
        camera.aspect_ratio = self.aspect_ratio;
        camera.focal_length = self.focal_length;
        camera.viewport_height = self.viewport_height;
        camera.center = self.camera_center.into();
        camera
    }

    /// The scene: the configured sphere, if any.
    pub fn scene(&self) -> Option<Sphere> {
        self.sphere
            .as_ref()
            .map(|sphere| Sphere::new(sphere.center.into(), sphere.radius))
    }
}
