use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Custom enum for log levels that can be used with clap's ValueEnum
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments structure using clap derive macros
#[derive(Parser)]
#[command(name = "normalcast")]
#[command(about = "Casts one ray per pixel at a sphere and shades it by surface normal")]
pub struct Args {
    /// JSON file with image, camera and sphere settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub debug_level: LogLevel,

    /// Image width in pixels (overrides the config file)
    #[arg(long)]
    pub width: Option<u32>,

    /// Output file path (.ppm or .png), or "-" for PPM on stdout
    #[arg(short, long, default_value = "image.ppm")]
    pub output: String,

    /// Render on the calling thread instead of across CPU cores
    #[arg(long)]
    pub sequential: bool,
}
