//! # Output Module
//!
//! Frame buffer and image writers for rendered colors:
//! - Plain-text PPM (`P3`), either to a file or any `Write` sink
//! - PNG file export through the `image` crate
//!
//! Both formats map a channel value `c` to `255.999 * c` truncated to an
//! integer, so that exactly 1.0 lands on 255 rather than 256.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use image::{ImageBuffer, Rgb};
use log::info;

use crate::error::RenderError;
use crate::interval::Interval;
use crate::vec3::Color;

/// Linear f64 RGB render target, row-major with top row first.
pub type Frame = ImageBuffer<Rgb<f64>, Vec<f64>>;

/// Pack a color into a frame pixel.
pub fn color_to_rgb(c: Color) -> Rgb<f64> {
    Rgb([c.x, c.y, c.z])
}

/// Read a frame pixel back as a color.
pub fn rgb_to_color(pixel: &Rgb<f64>) -> Color {
    Color::new(pixel[0], pixel[1], pixel[2])
}

/// Scale one channel to the 8-bit range without clamping.
///
/// Out-of-range input produces out-of-range output.
fn to_byte_value(channel: f64) -> i32 {
    (255.999 * channel) as i32
}

/// Write a single color as an `r g b` line.
pub fn write_color<W: Write>(out: &mut W, pixel_color: Color) -> io::Result<()> {
    writeln!(
        out,
        "{} {} {}",
        to_byte_value(pixel_color.x),
        to_byte_value(pixel_color.y),
        to_byte_value(pixel_color.z)
    )
}

/// Write the plain PPM header for an image of the given size.
pub fn write_ppm_header<W: Write>(out: &mut W, width: u32, height: u32) -> io::Result<()> {
    write!(out, "P3\n{} {}\n255\n", width, height)
}

/// Write a whole frame as plain PPM.
pub fn write_ppm<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    write_ppm_header(out, frame.width(), frame.height())?;
    for row in frame.rows() {
        for pixel in row {
            write_color(out, rgb_to_color(pixel))?;
        }
    }
    Ok(())
}

/// Save a frame as a plain PPM file.
pub fn save_image_as_ppm(frame: &Frame, output_path: &Path) -> Result<(), RenderError> {
    let mut out = BufWriter::new(File::create(output_path)?);
    write_ppm(&mut out, frame)?;
    out.flush()?;
    info!("Image saved as {}", output_path.display());
    Ok(())
}

/// Save a frame as an 8-bit PNG.
///
/// Channels are clamped to [0, 1] first since an 8-bit container cannot
/// hold out-of-range values. No gamma correction is applied.
pub fn save_image_as_png(frame: &Frame, output_path: &Path) -> Result<(), RenderError> {
    let unit = Interval::new(0.0, 1.0);
    let u8_image: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(frame.width(), frame.height(), |x, y| {
        let pixel = frame.get_pixel(x, y);
        Rgb([
            to_byte_value(unit.clamp(pixel[0])) as u8,
            to_byte_value(unit.clamp(pixel[1])) as u8,
            to_byte_value(unit.clamp(pixel[2])) as u8,
        ])
    });

    u8_image.save(output_path)?;
    info!("Image saved as {}", output_path.display());
    Ok(())
}

/// Supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain-text PPM
    Ppm,
    /// 8-bit PNG
    Png,
}

impl OutputFormat {
    /// Pick the encoding from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "ppm" => Ok(OutputFormat::Ppm),
            "png" => Ok(OutputFormat::Png),
            _ => Err(RenderError::UnsupportedFormat(extension)),
        }
    }
}

/// Save a frame, choosing the encoding from the file extension.
pub fn save_frame(frame: &Frame, output_path: &Path) -> Result<(), RenderError> {
    match OutputFormat::from_path(output_path)? {
        OutputFormat::Ppm => save_image_as_ppm(frame, output_path),
        OutputFormat::Png => save_image_as_png(frame, output_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_string(frame: &Frame) -> String {
        let mut out = Vec::new();
        write_ppm(&mut out, frame).expect("writing to a Vec cannot fail");
        String::from_utf8(out).expect("PPM output is ASCII")
    }

    #[test]
    fn it_maps_unit_channels_to_bytes() {
        assert_eq!(to_byte_value(0.0), 0);
        assert_eq!(to_byte_value(0.5), 127);
        assert_eq!(to_byte_value(1.0), 255);
    }

    #[test]
    fn it_does_not_clamp_out_of_range_channels() {
        let mut out = Vec::new();
        write_color(&mut out, Color::new(2.0, -0.5, 1.0)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "511 -127 255\n");
    }

    fn frame_from_colors(width: u32, height: u32, colors: &[Color]) -> Frame {
        let samples = colors.iter().flat_map(|c| [c.x, c.y, c.z]).collect();
        ImageBuffer::from_raw(width, height, samples).expect("one color per pixel")
    }

    #[test]
    fn it_writes_ppm_rows_in_order() {
        let frame = frame_from_colors(
            2,
            2,
            &[
                Color::new(1.0, 0.0, 0.0),
                Color::new(0.0, 1.0, 0.0),
                Color::new(0.0, 0.0, 1.0),
                Color::new(1.0, 1.0, 1.0),
            ],
        );
        assert_eq!(
            render_to_string(&frame),
            "P3\n2 2\n255\n255 0 0\n0 255 0\n0 0 255\n255 255 255\n"
        );
    }

    #[test]
    fn it_converts_between_colors_and_pixels() {
        let c = Color::new(0.25, -1.5, 2.0);
        assert_eq!(color_to_rgb(c), Rgb([0.25, -1.5, 2.0]));
        assert_eq!(rgb_to_color(&color_to_rgb(c)), c);

        let mut frame: Frame = ImageBuffer::new(3, 2);
        frame.put_pixel(1, 1, color_to_rgb(Color::ONE));
        assert_eq!(rgb_to_color(frame.get_pixel(1, 1)), Color::ONE);
        assert_eq!(&frame.as_raw()[12..15], &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn it_picks_the_format_from_the_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.ppm")).unwrap(), OutputFormat::Ppm);
        assert_eq!(OutputFormat::from_path(Path::new("out.PNG")).unwrap(), OutputFormat::Png);
        assert!(matches!(
            OutputFormat::from_path(Path::new("out.exr")),
            Err(RenderError::UnsupportedFormat(ext)) if ext == "exr"
        ));
        assert!(OutputFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn it_saves_ppm_and_png_files() {
        let dir = std::env::temp_dir().join(format!("normalcast-output-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let frame = frame_from_colors(2, 1, &[Color::new(0.5, 0.7, 1.0), Color::new(1.5, -1.0, 0.25)]);

        let ppm = dir.join("frame.ppm");
        save_frame(&frame, &ppm).unwrap();
        assert_eq!(std::fs::read_to_string(&ppm).unwrap(), render_to_string(&frame));

        let png = dir.join("frame.png");
        save_frame(&frame, &png).unwrap();
        let decoded = image::open(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([127, 179, 255]));
        assert_eq!(decoded.get_pixel(1, 0), &Rgb([255, 0, 63]));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
