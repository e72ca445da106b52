use anyhow::{Context, Result};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

mod angle;
mod config;
mod decode;
mod engine;
mod error;
mod metrics;
mod overlay;
mod pipeline;
mod point;
mod pose;
mod video;

/// Measure knee, elbow and torso angles of the person in a video.
#[derive(structopt::StructOpt)]
struct Opt {
    /// Video to analyze.
    input: Option<PathBuf>,

    /// TOML file with any of the options below; flags take precedence.
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Where to write the annotated video.
    #[structopt(short, long)]
    output_video: Option<PathBuf>,

    /// Where to write the per-frame metrics (JSON).
    #[structopt(short = "-L", long)]
    output_log: Option<PathBuf>,

    /// Path to a MoveNet single-pose ONNX model.
    #[structopt(short, long)]
    model: Option<PathBuf>,

    /// Pose score needed to start tracking a person.
    #[structopt(short, long)]
    detection_confidence: Option<f32>,

    /// Pose score needed to keep tracking a person.
    #[structopt(short, long)]
    tracking_confidence: Option<f32>,

    /// Pose keypoint score threshold.
    #[structopt(short, long)]
    keypoint_threshold: Option<f32>,

    /// Model accuracy: lightning or thunder.
    #[structopt(short, long)]
    accuracy: Option<config::ModelAccuracy>,

    /// Body side to measure: left or right.
    #[structopt(short, long)]
    side: Option<pose::JointSide>,

    /// Four character code of the output codec.
    #[structopt(long)]
    codec: Option<String>,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(short = "-p", long)]
    show_progress: bool,
}

impl Opt {
    /// Layer the flags that were given over `config`.
    fn apply(self, mut config: config::Config) -> config::Config {
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output_video) = self.output_video {
            config.output_video = output_video;
        }
        if let Some(output_log) = self.output_log {
            config.output_log = output_log;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(detection_confidence) = self.detection_confidence {
            config.detection_confidence = detection_confidence;
        }
        if let Some(tracking_confidence) = self.tracking_confidence {
            config.tracking_confidence = tracking_confidence;
        }
        if let Some(keypoint_threshold) = self.keypoint_threshold {
            config.keypoint_threshold = keypoint_threshold;
        }
        if let Some(accuracy) = self.accuracy {
            config.accuracy = accuracy;
        }
        if let Some(side) = self.side {
            config.side = side;
        }
        if let Some(codec) = self.codec {
            config.codec = codec;
        }
        config.show_progress |= self.show_progress;
        config
    }
}

fn main() -> Result<()> {
    let mut opt = Opt::from_args();
    let log_level = std::mem::take(&mut opt.log_level);

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(log_level),
    )?;

    let config = match &opt.config {
        Some(path) => config::Config::load(path)?,
        None => config::Config::default(),
    };
    let config = opt.apply(config);
    config.validate().context("invalid configuration")?;

    let mut pipeline = pipeline::Pipeline::open(&config).context("failed to start")?;

    info!(message = "processing video", input = %config.input.display(), side = ?config.side);
    let summary = pipeline
        .run(&config.output_log)
        .context("failed processing video")?;

    let timing = pipeline.detector().timing();
    info!(
        message = "done",
        video = %config.output_video.display(),
        log = %config.output_log.display(),
        frames = summary.frames,
        detections = summary.detections,
        mean_inference_ms = timing.mean_inference().as_secs_f64() * 1000.0,
    );
    Ok(())
}
