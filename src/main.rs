use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::Parser;
use image::ImageBuffer;
use log::{error, info};

use normalcast::camera::Camera;
use normalcast::config::RenderConfig;
use normalcast::error::RenderError;
use normalcast::hittable::Hittable;
use normalcast::output::{color_to_rgb, save_frame, write_color, write_ppm_header, Frame, OutputFormat};

mod cli;
mod logger;

use cli::Args;
use logger::init_logger;

fn main() {
    let args = Args::parse();

    init_logger(args.debug_level.clone().into());

    info!("Normalcast - Git Version {} ({})", env!("GIT_HASH"), env!("GIT_DATE"));

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), RenderError> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    if let Some(width) = args.width {
        config.image_width = width;
    }
    config.validate()?;

    let world = config.scene();
    let mut camera = config.camera();
    let image_height = camera.image_height();
    info!(
        "Image resolution: {}x{}, sphere: {}",
        camera.image_width,
        image_height,
        match &world {
            Some(sphere) => format!("center ({}) radius {}", sphere.center, sphere.radius),
            None => "none".to_string(),
        }
    );

    if args.output == "-" {
        return stream_ppm(io::stdout().lock(), &mut camera, &world);
    }

    let path = Path::new(&args.output);
    let format = OutputFormat::from_path(path)?;

    if args.sequential {
        if format == OutputFormat::Ppm {
            stream_ppm(std::fs::File::create(path)?, &mut camera, &world)?;
            info!("Image saved as {}", path.display());
            return Ok(());
        }
        let width = camera.image_width;
        let mut frame: Frame = ImageBuffer::new(width, image_height);
        let mut index = 0;
        camera.render_with(&world, |c| {
            frame.put_pixel(index % width, index / width, color_to_rgb(c));
            index += 1;
        });
        return save_frame(&frame, path);
    }

    let frame = camera.render(&world);
    save_frame(&frame, path)
}

/// Render sequentially, writing each pixel as soon as it is shaded.
fn stream_ppm<W: Write>(
    out: W,
    camera: &mut Camera,
    world: &dyn Hittable,
) -> Result<(), RenderError> {
    let mut out = BufWriter::new(out);
    write_ppm_header(&mut out, camera.image_width, camera.image_height())?;

    let mut result = Ok(());
    camera.render_with(world, |c| {
        if result.is_ok() {
            result = write_color(&mut out, c);
        }
    });
    result?;
    out.flush()?;
    Ok(())
}
