use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("could not open video {0:?}")]
    OpenSource(PathBuf),

    #[error("failed to open video capture for {1:?}")]
    CreateCapture(#[source] opencv::Error, PathBuf),

    #[error("failed to get video capture property {0}")]
    GetCaptureProperty(&'static str, #[source] opencv::Error),

    #[error("video capture reported an invalid {0}: {1}")]
    InvalidCaptureProperty(&'static str, f64),

    #[error("failed to read frame {0}")]
    ReadFrame(usize, #[source] opencv::Error),

    #[error("could not open output video {0:?}")]
    OpenSink(PathBuf),

    #[error("failed to create video writer for {1:?}")]
    CreateWriter(#[source] opencv::Error, PathBuf),

    #[error("codec must be exactly four ASCII characters, got {0:?}")]
    InvalidCodec(String),

    #[error("failed to compute fourcc for codec {1:?}")]
    Fourcc(#[source] opencv::Error, String),

    #[error("failed to write frame {0}")]
    WriteFrame(usize, #[source] opencv::Error),

    #[error("failed to release video {0}")]
    ReleaseVideo(&'static str, #[source] opencv::Error),

    #[error("failed to create metrics log {1:?}")]
    CreateLog(#[source] std::io::Error, PathBuf),

    #[error("failed to write metrics log {1:?}")]
    WriteLog(#[source] serde_json::Error, PathBuf),

    #[error("failed to flush metrics log {1:?}")]
    FlushLog(#[source] std::io::Error, PathBuf),

    #[error("failed to read config file {1:?}")]
    ReadConfig(#[source] std::io::Error, PathBuf),

    #[error("failed to parse config file {1:?}")]
    ParseConfig(#[source] toml::de::Error, PathBuf),

    #[error("{0} must be within [0, 1], got {1}")]
    InvalidThreshold(&'static str, f32),

    #[error("unknown joint side {0:?}, expected `left` or `right`")]
    ParseJointSide(String),

    #[error("unknown model accuracy {0:?}, expected `lightning` or `thunder`")]
    ParseModelAccuracy(String),

    #[error("failed to construct NotNan from f64: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f64),

    #[error("failed to convert usize value to keypoint kind: {0}")]
    ConvertUSizeToKeypointKind(usize),

    #[error("failed to convert keypoint variant to usize: {0:?}")]
    KeypointVariantToUSize(crate::pose::KeypointKind),

    #[error("failed to convert value to i32")]
    ConvertToI32,

    #[error("failed to load model {1:?}")]
    LoadModel(#[source] ort::Error, PathBuf),

    #[error("model {0:?} has no {1}")]
    MissingModelIo(PathBuf, &'static str),

    #[error("failed to construct input tensor")]
    MakeInputTensor(#[source] ort::Error),

    #[error("failed to run inference")]
    RunInference(#[source] ort::Error),

    #[error("failed to extract output tensor")]
    ExtractOutputTensor(#[source] ort::Error),

    #[error("expected output tensor of shape [1, 1, 17, 3], got {0:?}")]
    UnexpectedOutputShape(Vec<usize>),

    #[error("pipeline has already failed")]
    PipelineFailed,

    #[error("failed to resize frame")]
    Resize(#[source] opencv::Error),

    #[error("failed to get pixel at ({0}, {1})")]
    GetPixel(i32, i32, #[source] opencv::Error),

    #[error("failed to draw line")]
    DrawLine(#[source] opencv::Error),

    #[error("failed to draw circle")]
    DrawCircle(#[source] opencv::Error),

    #[error("failed to draw text")]
    PutText(#[source] opencv::Error),
}
