use crate::{
    config::Config,
    decode::decode_single_pose,
    error::Error,
    pose::{LandmarkSet, Pose},
};
use ndarray::Array4;
use opencv::{
    core::{Mat, Size, Vec3b},
    imgproc::{resize, INTER_LINEAR},
    prelude::*,
};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument};

/// Finds the person in a frame.
pub(crate) trait PoseDetector<F> {
    /// Return the landmarks of the person in `frame`, or `None` when there is
    /// nobody to measure.
    fn detect(&mut self, frame: &F) -> Result<Option<LandmarkSet>, Error>;
}

#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Timing {
    pub(crate) inference: Duration,
    pub(crate) frames: usize,
}

impl Timing {
    pub(crate) fn mean_inference(&self) -> Duration {
        u32::try_from(self.frames)
            .ok()
            .filter(|&frames| frames > 0)
            .map_or_else(Duration::default, |frames| self.inference / frames)
    }
}

/// Detection with hysteresis: acquiring a person takes a pose score of at
/// least `detection`, keeping them takes at least `tracking`.
#[derive(Debug, Copy, Clone)]
pub(crate) struct PresenceGate {
    detection: f32,
    tracking: f32,
    tracked: bool,
}

impl PresenceGate {
    pub(crate) fn new(detection: f32, tracking: f32) -> Self {
        Self {
            detection,
            tracking,
            tracked: false,
        }
    }

    pub(crate) fn admit(&mut self, score: f32) -> bool {
        let threshold = if self.tracked {
            self.tracking
        } else {
            self.detection
        };
        self.tracked = score >= threshold;
        self.tracked
    }
}

/// MoveNet single-pose running on onnxruntime.
pub(crate) struct Engine {
    session: Session,
    input_name: String,
    output_name: String,
    input_size: i32,
    keypoint_threshold: f32,
    gate: PresenceGate,
    timing: Timing,
}

impl Engine {
    pub(crate) fn new(config: &Config) -> Result<Self, Error> {
        let model = config.model.as_path();
        let load_error = |e: ort::Error| Error::LoadModel(e, model.to_owned());
        let session = Session::builder()
            .map_err(|e| load_error(e.into()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_error(e.into()))?
            .commit_from_file(model)
            .map_err(|e| load_error(e.into()))?;

        let input_name = first_name(model, "inputs", session.inputs.iter().map(|i| &i.name))?;
        let output_name = first_name(model, "outputs", session.outputs.iter().map(|o| &o.name))?;

        info!(
            message = "loaded pose model",
            model = %model.display(),
            input = %input_name,
            output = %output_name,
            accuracy = ?config.accuracy,
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            input_size: config.accuracy.input_size(),
            keypoint_threshold: config.keypoint_threshold,
            gate: PresenceGate::new(config.detection_confidence, config.tracking_confidence),
            timing: Default::default(),
        })
    }

    pub(crate) fn timing(&self) -> Timing {
        self.timing
    }

    /// Resize a BGR frame to the model's input and lay it out as RGB `[1, H, W, 3]`.
    fn preprocess(&self, frame: &Mat) -> Result<Array4<f32>, Error> {
        let mut resized = Mat::default();
        resize(
            frame,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            INTER_LINEAR,
        )
        .map_err(Error::Resize)?;

        let side = self.input_size as usize;
        let mut tensor = Array4::<f32>::zeros((1, side, side, 3));
        for y in 0..self.input_size {
            for x in 0..self.input_size {
                let bgr = resized
                    .at_2d::<Vec3b>(y, x)
                    .map_err(|e| Error::GetPixel(x, y, e))?;
                let (row, col) = (y as usize, x as usize);
                tensor[[0, row, col, 0]] = f32::from(bgr[2]);
                tensor[[0, row, col, 1]] = f32::from(bgr[1]);
                tensor[[0, row, col, 2]] = f32::from(bgr[0]);
            }
        }
        Ok(tensor)
    }

    fn infer(&mut self, input: Array4<f32>) -> Result<Pose, Error> {
        let input = Tensor::from_array(input).map_err(Error::MakeInputTensor)?;

        let start_inference = Instant::now();
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(Error::RunInference)?;
        self.timing.inference += start_inference.elapsed();
        self.timing.frames += 1;

        let output = outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()
            .map_err(Error::ExtractOutputTensor)?;
        decode_single_pose(output)
    }
}

fn first_name<'a, I>(model: &Path, what: &'static str, mut names: I) -> Result<String, Error>
where
    I: Iterator<Item = &'a String>,
{
    names
        .next()
        .cloned()
        .ok_or_else(|| Error::MissingModelIo(PathBuf::from(model), what))
}

impl PoseDetector<Mat> for Engine {
    #[instrument(name = "Engine::detect", skip(self, frame), level = "debug")]
    fn detect(&mut self, frame: &Mat) -> Result<Option<LandmarkSet>, Error> {
        let input = self.preprocess(frame)?;
        let pose = self.infer(input)?;
        let score = pose.score();
        let admitted = self.gate.admit(score);
        debug!(score, admitted);
        Ok(if admitted {
            Some(pose.landmarks(self.keypoint_threshold))
        } else {
            None
        })
    }
}
