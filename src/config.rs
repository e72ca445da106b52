use crate::{error::Error, pose::JointSide};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// MoveNet variant, trading speed for accuracy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ModelAccuracy {
    Lightning,
    Thunder,
}

impl ModelAccuracy {
    /// Square input resolution the model expects.
    pub(crate) fn input_size(self) -> i32 {
        match self {
            Self::Lightning => 192,
            Self::Thunder => 256,
        }
    }
}

impl Default for ModelAccuracy {
    fn default() -> Self {
        Self::Thunder
    }
}

impl std::str::FromStr for ModelAccuracy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lightning" => Ok(Self::Lightning),
            "thunder" => Ok(Self::Thunder),
            _ => Err(Error::ParseModelAccuracy(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Video to analyze.
    pub(crate) input: PathBuf,
    /// Annotated copy of the input.
    pub(crate) output_video: PathBuf,
    /// Per-frame metrics, as JSON.
    pub(crate) output_log: PathBuf,
    /// MoveNet single-pose ONNX model.
    pub(crate) model: PathBuf,
    /// Minimum pose score to start tracking a person.
    pub(crate) detection_confidence: f32,
    /// Minimum pose score to keep tracking a person.
    pub(crate) tracking_confidence: f32,
    /// Minimum keypoint score for a landmark to be used.
    pub(crate) keypoint_threshold: f32,
    pub(crate) accuracy: ModelAccuracy,
    pub(crate) side: JointSide,
    /// Four character code of the output video codec.
    pub(crate) codec: String,
    pub(crate) show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.mp4"),
            output_video: PathBuf::from("output_overlay.mp4"),
            output_log: PathBuf::from("keypoints.json"),
            model: PathBuf::from("models/movenet_singlepose_thunder.onnx"),
            detection_confidence: 0.5,
            tracking_confidence: 0.5,
            keypoint_threshold: 0.2,
            accuracy: ModelAccuracy::default(),
            side: JointSide::default(),
            codec: "mp4v".to_owned(),
            show_progress: false,
        }
    }
}

impl Config {
    pub(crate) fn load<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::ReadConfig(e, path.to_owned()))?;
        Self::parse(&content).map_err(|e| Error::ParseConfig(e, path.to_owned()))
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("detection confidence", self.detection_confidence),
            ("tracking confidence", self.tracking_confidence),
            ("keypoint threshold", self.keypoint_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidThreshold(name, value));
            }
        }
        self.fourcc().map(|_| ())
    }

    /// The codec as the four characters `VideoWriter::fourcc` takes.
    pub(crate) fn fourcc(&self) -> Result<[char; 4], Error> {
        let mut chars = self.codec.chars();
        match (chars.next(), chars.next(), chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), Some(c), Some(d), None)
                if [a, b, c, d].iter().all(char::is_ascii) =>
            {
                Ok([a, b, c, d])
            }
            _ => Err(Error::InvalidCodec(self.codec.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ModelAccuracy};
    use crate::pose::JointSide;
    use std::path::PathBuf;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file() {
        let config = Config::parse(
            r#"
            input = "bowling.mp4"
            side = "left"
            accuracy = "lightning"
            tracking_confidence = 0.3
            "#,
        )
        .unwrap();
        assert_eq!(config.input, PathBuf::from("bowling.mp4"));
        assert_eq!(config.side, JointSide::Left);
        assert_eq!(config.accuracy, ModelAccuracy::Lightning);
        assert_eq!(config.tracking_confidence, 0.3);
        assert_eq!(config.detection_confidence, 0.5);
        assert_eq!(config.output_log, PathBuf::from("keypoints.json"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("inptu = \"typo.mp4\"").is_err());
    }

    #[test]
    fn load_missing_file() {
        assert!(Config::load("/definitely/not/here.toml").is_err());
    }

    #[test]
    fn thresholds_are_validated() {
        let config = Config {
            detection_confidence: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn codec_must_be_four_chars() {
        assert_eq!(Config::default().fourcc().unwrap(), ['m', 'p', '4', 'v']);
        for codec in &["mp4", "avc1x", "", "mp4é"] {
            let config = Config {
                codec: codec.to_string(),
                ..Default::default()
            };
            assert!(config.fourcc().is_err(), "{}", codec);
        }
    }

    #[test]
    fn accuracy_picks_input_size() {
        assert_eq!("Lightning".parse::<ModelAccuracy>().unwrap().input_size(), 192);
        assert_eq!(ModelAccuracy::default().input_size(), 256);
        assert!("medium".parse::<ModelAccuracy>().is_err());
    }
}
