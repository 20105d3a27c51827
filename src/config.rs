use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use crate::canvas::ImageFormat;
use crate::consts::{ CANVAS_WIDTH, CANVAS_HEIGHT, OUT_FILE };
use crate::consts::{ DEFAULT_SAMPLES, DEFAULT_BATCH };
use crate::error::{ Result, TracerError };
use crate::parallel::{ PoolSettings, default_workers };

/// Renders the demo scene: three spheres on a floor, lit by one light.
#[derive(Parser, Serialize, Clone, Debug, PartialEq)]
#[clap(author, version, about)]
pub struct RenderConfig {
    /// Width of the image, in pixels.
    #[clap(long, default_value_t = CANVAS_WIDTH)]
    pub width: usize,

    /// Height of the image, in pixels.
    #[clap(long, default_value_t = CANVAS_HEIGHT)]
    pub height: usize,

    /// Number of worker threads. Defaults to the available parallelism.
    #[clap(short, long)]
    pub workers: Option<usize>,

    /// Anti-aliasing: each pixel averages a samples x samples grid of rays.
    #[clap(short, long, default_value_t = DEFAULT_SAMPLES)]
    pub samples: usize,

    /// Pixels handed to a worker per message.
    #[clap(short, long, default_value_t = DEFAULT_BATCH)]
    pub batch: usize,

    /// Render on the main thread only.
    #[clap(long)]
    pub sequential: bool,

    /// Write one JSON pixel response per line to stdout instead of an image.
    #[clap(long)]
    pub stream: bool,

    /// Where to save the image.
    #[clap(short, long, default_value = OUT_FILE)]
    pub output: PathBuf,

    /// Image format. Defaults to the output extension, or PNG.
    #[clap(short, long, arg_enum)]
    pub format: Option<ImageFormat>,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            workers: None,
            samples: DEFAULT_SAMPLES,
            batch: DEFAULT_BATCH,
            sequential: false,
            stream: false,
            output: PathBuf::from(OUT_FILE),
            format: None,
        }
    }
}

impl RenderConfig {
    /// Checks that every setting can be rendered with.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TracerError::InvalidConfig(format!(
                "image size must be positive, got {}x{}",
                self.width, self.height
            )));
        }

        if self.samples == 0 {
            return Err(TracerError::InvalidConfig(
                "samples must be at least 1".into()
            ));
        }

        if self.batch == 0 {
            return Err(TracerError::InvalidConfig(
                "batch must be at least 1".into()
            ));
        }

        self.worker_count().map(|_| ())
    }

    /// The number of worker threads to spawn.
    pub fn worker_count(&self) -> Result<usize> {
        match self.workers {
            Some(0) => Err(TracerError::InvalidConfig(
                "workers must be at least 1".into()
            )),
            Some(n) => Ok(n),
            None => Ok(default_workers()),
        }
    }

    /// The format to save in: `--format` if given, else the output
    /// extension, else PNG.
    pub fn image_format(&self) -> ImageFormat {
        self.format
            .or_else(|| ImageFormat::from_path(&self.output))
            .unwrap_or(ImageFormat::Png)
    }

    pub fn pool_settings(&self) -> Result<PoolSettings> {
        Ok(PoolSettings { workers: self.worker_count()?, batch: self.batch })
    }
}

#[test]
fn defaults_without_arguments() {
    let config = RenderConfig::try_parse_from(&["sphere-tracer"]).unwrap();

    assert_eq!(config, RenderConfig::default());
    assert!(config.validate().is_ok());
    assert!(config.worker_count().unwrap() >= 1);
}

#[test]
fn arguments_override_defaults() {
    let config = RenderConfig::try_parse_from(&[
        "sphere-tracer", "--width", "64", "--height", "48",
        "--workers", "3", "--samples", "2", "--batch", "16",
        "--stream", "--output", "frame.ppm",
    ]).unwrap();

    assert_eq!((config.width, config.height), (64, 48));
    assert_eq!(config.pool_settings().unwrap(),
        PoolSettings { workers: 3, batch: 16 });
    assert_eq!(config.samples, 2);
    assert!(config.stream);
    assert!(!config.sequential);
    assert_eq!(config.output, PathBuf::from("frame.ppm"));
    assert_eq!(config.image_format(), ImageFormat::Ppm);
}

#[test]
fn image_format_selection() {
    let default = RenderConfig::default();
    let by_flag = RenderConfig::try_parse_from(&[
        "sphere-tracer", "--output", "frame.ppm", "--format", "png",
    ]).unwrap();
    let unknown_ext = RenderConfig {
        output: PathBuf::from("frame.img"),
        ..Default::default()
    };

    assert_eq!(default.image_format(), ImageFormat::Png);
    assert_eq!(by_flag.image_format(), ImageFormat::Png);
    assert_eq!(unknown_ext.image_format(), ImageFormat::Png);
    assert!(RenderConfig::try_parse_from(&[
        "sphere-tracer", "--format", "gif",
    ]).is_err());
}

#[test]
fn invalid_settings_are_rejected() {
    let zero_workers = RenderConfig { workers: Some(0), ..Default::default() };
    let zero_samples = RenderConfig { samples: 0, ..Default::default() };
    let zero_batch = RenderConfig { batch: 0, ..Default::default() };
    let zero_width = RenderConfig { width: 0, ..Default::default() };

    assert!(zero_workers.validate().is_err());
    assert!(zero_samples.validate().is_err());
    assert!(zero_batch.validate().is_err());
    assert!(zero_width.validate().is_err());
}

#[test]
fn config_serializes_to_json() {
    let config = RenderConfig { workers: Some(2), ..Default::default() };
    let json = serde_json::to_value(&config).unwrap();

    assert_eq!(json["workers"], 2);
    assert_eq!(json["width"], CANVAS_WIDTH as u64);
    assert_eq!(json["output"], OUT_FILE);
    assert!(json["format"].is_null());
}
