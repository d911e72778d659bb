//! Error type for the configuration and output layers.
//!
//! The geometric core never fails: a miss is `None`, and degenerate input
//! produces degenerate numbers. Everything that touches files or user
//! settings reports a [`RenderError`] instead.

use std::fmt;
use std::io;

/// Failure while loading settings or writing an image.
#[derive(Debug)]
pub enum RenderError {
    /// Reading or writing a file failed
    Io(io::Error),
    /// The image encoder rejected the frame
    Image(image::ImageError),
    /// A configuration file is not valid JSON for `RenderConfig`
    Config(serde_json::Error),
    /// A configuration value violates a rendering precondition
    InvalidConfig(String),
    /// No encoder for the requested file extension
    UnsupportedFormat(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Io(e) => write!(f, "I/O error: {}", e),
            RenderError::Image(e) => write!(f, "image encoding failed: {}", e),
            RenderError::Config(e) => write!(f, "malformed configuration: {}", e),
            RenderError::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            RenderError::UnsupportedFormat(ext) => write!(
                f,
                "unsupported file extension '{}', only .ppm and .png are supported",
                ext
            ),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io(e) => Some(e),
            RenderError::Image(e) => Some(e),
            RenderError::Config(e) => Some(e),
            RenderError::InvalidConfig(_) | RenderError::UnsupportedFormat(_) => None,
        }
    }
}

impl From<io::Error> for RenderError {
    fn from(e: io::Error) -> Self {
        RenderError::Io(e)
    }
}

impl From<image::ImageError> for RenderError {
    fn from(e: image::ImageError) -> Self {
        RenderError::Image(e)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        RenderError::Config(e)
    }
}
