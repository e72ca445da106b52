use crate::{
    config::Config,
    engine::{Engine, PoseDetector},
    error::Error,
    metrics::{FrameMetrics, MetricsLog},
    overlay::{OverlayRenderer, SkeletonOverlay},
    pose::JointSide,
    video::{FrameSink, FrameSource, VideoProperties, VideoSink, VideoSource},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info, instrument};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum State {
    Opening,
    Streaming,
    Finalizing,
    Done,
    Failed,
}

/// What a completed run produced.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) frames: usize,
    pub(crate) detections: usize,
}

/// Runs every frame of a source through detection, measurement and
/// rendering, one frame at a time.
pub(crate) struct Pipeline<S, K, D, R> {
    source: S,
    sink: K,
    detector: D,
    renderer: R,
    side: JointSide,
    log: MetricsLog,
    frame_index: usize,
    state: State,
    progress: Option<ProgressBar>,
}

fn progress_bar(properties: &VideoProperties) -> ProgressBar {
    match properties.frame_count {
        Some(count) => ProgressBar::new(count).with_style(
            ProgressStyle::default_bar()
                .template("{prefix:.bold.dim} [{bar:40}] {pos}/{len} {wide_msg}")
                .progress_chars("=> "),
        ),
        None => ProgressBar::new_spinner().with_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                .template("{prefix:.bold.dim} {spinner} {pos} {wide_msg}"),
        ),
    }
}

impl Pipeline<VideoSource, VideoSink, Engine, SkeletonOverlay> {
    /// Open the input, the output and the model described by `config`.
    pub(crate) fn open(config: &Config) -> Result<Self, Error> {
        debug!(state = ?State::Opening);
        let opened = Self::open_handles(config);
        if let Err(error) = &opened {
            debug!(state = ?State::Failed, %error);
        }
        opened
    }

    /// The output video is created last, so a bad model or input leaves no
    /// file behind.
    fn open_handles(config: &Config) -> Result<Self, Error> {
        let codec = config.fourcc()?;
        let detector = Engine::new(config)?;
        let source = VideoSource::open(&config.input)?;
        let properties = source.properties();
        let sink = VideoSink::create(&config.output_video, codec, properties)?;
        let mut pipeline = Self::new(source, sink, detector, SkeletonOverlay, config.side);
        if config.show_progress {
            pipeline.progress = Some(progress_bar(&properties));
        }
        Ok(pipeline)
    }
}

impl<S, K, D, R> Pipeline<S, K, D, R>
where
    S: FrameSource,
    K: FrameSink<S::Frame>,
    D: PoseDetector<S::Frame>,
    R: OverlayRenderer<S::Frame>,
{
    pub(crate) fn new(source: S, sink: K, detector: D, renderer: R, side: JointSide) -> Self {
        let capacity = source
            .properties()
            .frame_count
            .and_then(|count| usize::try_from(count).ok())
            .unwrap_or_default();
        Self {
            source,
            sink,
            detector,
            renderer,
            side,
            log: MetricsLog::with_capacity(capacity),
            frame_index: 0,
            state: State::Opening,
            progress: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> State {
        self.state
    }

    pub(crate) fn detector(&self) -> &D {
        &self.detector
    }

    #[cfg(test)]
    pub(crate) fn log(&self) -> &MetricsLog {
        &self.log
    }

    fn transition(&mut self, state: State) {
        debug!(from = ?self.state, to = ?state, frame = self.frame_index);
        self.state = state;
    }

    /// Process every remaining frame, then write the metrics log to `log_path`.
    ///
    /// Any failure aborts the run and leaves the pipeline `Failed`; handles are
    /// released when it is dropped.
    pub(crate) fn run<P>(&mut self, log_path: P) -> Result<Summary, Error>
    where
        P: AsRef<Path>,
    {
        let result = self.run_states(log_path.as_ref());
        if result.is_err() {
            self.transition(State::Failed);
            if let Some(progress) = &self.progress {
                progress.abandon();
            }
        }
        result
    }

    fn run_states(&mut self, log_path: &Path) -> Result<Summary, Error> {
        loop {
            match self.state {
                State::Opening => self.transition(State::Streaming),
                State::Streaming => {
                    if !self.step()? {
                        self.transition(State::Finalizing);
                    }
                }
                State::Finalizing => {
                    self.finalize(log_path)?;
                    self.transition(State::Done);
                }
                State::Done => {
                    return Ok(Summary {
                        frames: self.log.len(),
                        detections: self.log.detections(),
                    })
                }
                State::Failed => return Err(Error::PipelineFailed),
            }
        }
    }

    /// Run one frame through the pipeline. Returns `false` once the source is exhausted.
    #[instrument(name = "Pipeline::step", skip(self), fields(frame = self.frame_index + 1), level = "debug")]
    fn step(&mut self) -> Result<bool, Error> {
        let mut frame = match self.source.next_frame()? {
            Some(frame) => frame,
            None => return Ok(false),
        };
        self.frame_index += 1;

        let landmarks = self.detector.detect(&frame)?;
        let metrics = FrameMetrics::extract(self.frame_index, landmarks.as_ref(), self.side);
        self.renderer
            .render(&mut frame, landmarks.as_ref(), &metrics)?;
        self.sink.write(&frame)?;
        debug!(?metrics);
        self.log.push(metrics);

        if let Some(progress) = &self.progress {
            progress.inc(1);
        }
        Ok(true)
    }

    fn finalize(&mut self, log_path: &Path) -> Result<(), Error> {
        self.source.release()?;
        self.sink.release()?;
        self.log.write_to(log_path)?;
        if let Some(progress) = &self.progress {
            progress.finish_with_message("done");
        }
        info!(
            message = "wrote metrics log",
            path = %log_path.display(),
            records = self.log.len(),
        );
        Ok(())
    }
}
