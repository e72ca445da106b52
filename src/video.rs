use crate::error::Error;
use num_traits::cast::ToPrimitive;
use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio::{
        VideoCapture, VideoWriter, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_COUNT,
        CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH,
    },
};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Frame rate and dimensions of a video stream.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct VideoProperties {
    pub(crate) fps: f64,
    pub(crate) width: i32,
    pub(crate) height: i32,
    /// Container's frame count; only a hint, some formats don't know it.
    pub(crate) frame_count: Option<u64>,
}

/// A finite, non-restartable sequence of decoded frames.
pub(crate) trait FrameSource {
    type Frame;

    fn properties(&self) -> VideoProperties;

    /// Decode the next frame, `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>, Error>;

    fn release(&mut self) -> Result<(), Error>;
}

/// Accepts frames in decode order.
pub(crate) trait FrameSink<F> {
    fn write(&mut self, frame: &F) -> Result<(), Error>;

    fn release(&mut self) -> Result<(), Error>;
}

pub(crate) struct VideoSource {
    capture: VideoCapture,
    properties: VideoProperties,
    frames_read: usize,
}

fn capture_property(capture: &VideoCapture, name: &'static str, id: i32) -> Result<f64, Error> {
    capture
        .get(id)
        .map_err(|e| Error::GetCaptureProperty(name, e))
}

fn dimension(capture: &VideoCapture, name: &'static str, id: i32) -> Result<i32, Error> {
    let value = capture_property(capture, name, id)?;
    value
        .to_i32()
        .filter(|&value| value > 0)
        .ok_or(Error::InvalidCaptureProperty(name, value))
}

impl VideoSource {
    pub(crate) fn open<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let capture = VideoCapture::from_file(&path.to_string_lossy(), CAP_ANY)
            .map_err(|e| Error::CreateCapture(e, path.to_owned()))?;
        if !capture
            .is_opened()
            .map_err(|e| Error::CreateCapture(e, path.to_owned()))?
        {
            return Err(Error::OpenSource(path.to_owned()));
        }

        let fps = capture_property(&capture, "fps", CAP_PROP_FPS)?;
        if !fps.is_finite() || fps <= 0.0 {
            return Err(Error::InvalidCaptureProperty("fps", fps));
        }
        let properties = VideoProperties {
            fps,
            width: dimension(&capture, "width", CAP_PROP_FRAME_WIDTH)?,
            height: dimension(&capture, "height", CAP_PROP_FRAME_HEIGHT)?,
            frame_count: capture_property(&capture, "frame count", CAP_PROP_FRAME_COUNT)?
                .to_u64()
                .filter(|&count| count > 0),
        };

        info!(
            message = "opened input video",
            path = %path.display(),
            fps = properties.fps,
            width = properties.width,
            height = properties.height,
            frames = ?properties.frame_count,
        );

        Ok(Self {
            capture,
            properties,
            frames_read: 0,
        })
    }
}

impl FrameSource for VideoSource {
    type Frame = Mat;

    fn properties(&self) -> VideoProperties {
        self.properties
    }

    #[instrument(name = "VideoSource::next_frame", skip(self), level = "trace")]
    fn next_frame(&mut self) -> Result<Option<Mat>, Error> {
        let index = self.frames_read + 1;
        let mut frame = Mat::default();
        let read = self
            .capture
            .read(&mut frame)
            .map_err(|e| Error::ReadFrame(index, e))?;
        if !read || frame.empty() {
            return Ok(None);
        }
        self.frames_read = index;
        Ok(Some(frame))
    }

    fn release(&mut self) -> Result<(), Error> {
        self.capture
            .release()
            .map_err(|e| Error::ReleaseVideo("input", e))
    }
}

pub(crate) struct VideoSink {
    writer: VideoWriter,
    frames_written: usize,
}

impl VideoSink {
    /// Create `path`, encoding with `codec` at the frame rate and size of `properties`.
    pub(crate) fn create<P>(
        path: P,
        codec: [char; 4],
        properties: VideoProperties,
    ) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let [a, b, c, d] = codec;
        let fourcc = VideoWriter::fourcc(a, b, c, d)
            .map_err(|e| Error::Fourcc(e, codec.iter().collect()))?;
        let writer = VideoWriter::new(
            &path.to_string_lossy(),
            fourcc,
            properties.fps,
            Size::new(properties.width, properties.height),
            true, // is_color
        )
        .map_err(|e| Error::CreateWriter(e, PathBuf::from(path)))?;

        if !writer
            .is_opened()
            .map_err(|e| Error::CreateWriter(e, PathBuf::from(path)))?
        {
            return Err(Error::OpenSink(path.to_owned()));
        }

        info!(
            message = "created output video",
            path = %path.display(),
            codec = %codec.iter().collect::<String>(),
        );

        Ok(Self {
            writer,
            frames_written: 0,
        })
    }
}

impl FrameSink<Mat> for VideoSink {
    #[instrument(name = "VideoSink::write", skip(self, frame), level = "trace")]
    fn write(&mut self, frame: &Mat) -> Result<(), Error> {
        self.frames_written += 1;
        self.writer
            .write(frame)
            .map_err(|e| Error::WriteFrame(self.frames_written, e))
    }

    fn release(&mut self) -> Result<(), Error> {
        self.writer
            .release()
            .map_err(|e| Error::ReleaseVideo("output", e))
    }
}

/// Write `frames` flat grey frames of `properties`' size to `path` as MJPG.
#[cfg(test)]
pub(crate) fn write_clip(path: &Path, properties: VideoProperties, frames: usize) {
    use opencv::core::{Scalar, CV_8UC3};

    let mut sink = VideoSink::create(path, ['M', 'J', 'P', 'G'], properties).unwrap();
    for i in 0..frames {
        let shade = (i * 20 % 256) as f64;
        let frame = Mat::new_rows_cols_with_default(
            properties.height,
            properties.width,
            CV_8UC3,
            Scalar::all(shade),
        )
        .unwrap();
        sink.write(&frame).unwrap();
    }
    sink.release().unwrap();
}

#[cfg(test)]
mod tests {
    use super::{write_clip, FrameSource, VideoProperties, VideoSource};
    use crate::error::Error;
    use assert_approx_eq::assert_approx_eq;
    use opencv::prelude::*;

    #[test]
    fn missing_input_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.mp4");
        match VideoSource::open(&path) {
            Err(Error::OpenSource(missing)) | Err(Error::CreateCapture(_, missing)) => {
                assert_eq!(missing, path)
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("opened a file that doesn't exist"),
        }
    }

    #[test]
    fn output_keeps_rate_size_and_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.avi");
        let properties = VideoProperties {
            fps: 25.0,
            width: 64,
            height: 48,
            frame_count: None,
        };
        write_clip(&path, properties, 10);

        let mut source = VideoSource::open(&path).unwrap();
        let read = source.properties();
        assert_approx_eq!(read.fps, 25.0);
        assert_eq!((read.width, read.height), (64, 48));

        let mut frames = 0;
        while let Some(frame) = source.next_frame().unwrap() {
            assert_eq!((frame.cols(), frame.rows()), (64, 48));
            frames += 1;
        }
        assert_eq!(frames, 10);
        source.release().unwrap();
    }
}
