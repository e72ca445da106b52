use crate::{error::Error, point::Point};
use num_traits::{FromPrimitive, ToPrimitive};

#[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub(crate) enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

pub(crate) const NUM_KEYPOINTS: usize = 17;

impl KeypointKind {
    pub(crate) fn idx(self) -> Result<usize, Error> {
        self.to_usize().ok_or(Error::KeypointVariantToUSize(self))
    }

    pub(crate) fn from_idx(index: usize) -> Result<Self, Error> {
        Self::from_usize(index).ok_or(Error::ConvertUSizeToKeypointKind(index))
    }
}

/// A single scored keypoint as produced by the model. `point` is `None` when
/// the model gave no usable location for it.
#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Keypoint {
    pub(crate) point: Option<Point>,
    pub(crate) score: f32,
}

/// Every keypoint of one detected person, indexed by `KeypointKind`.
#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Pose {
    pub(crate) keypoints: [Keypoint; NUM_KEYPOINTS],
}

impl Pose {
    /// Mean keypoint score.
    pub(crate) fn score(&self) -> f32 {
        self.keypoints.iter().map(|keypoint| keypoint.score).sum::<f32>() / NUM_KEYPOINTS as f32
    }

    /// Keep the located keypoints scoring at least `threshold`.
    pub(crate) fn landmarks(&self, threshold: f32) -> LandmarkSet {
        let mut points = [None; NUM_KEYPOINTS];
        for (slot, keypoint) in points.iter_mut().zip(self.keypoints.iter()) {
            *slot = keypoint.point.filter(|_| keypoint.score >= threshold);
        }
        LandmarkSet { points }
    }
}

/// The landmarks of one frame. A joint is absent when the detector was not
/// confident enough about it.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(crate) struct LandmarkSet {
    points: [Option<Point>; NUM_KEYPOINTS],
}

impl LandmarkSet {
    pub(crate) fn get(&self, kind: KeypointKind) -> Option<Point> {
        kind.idx().ok().and_then(|index| self.points[index])
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (KeypointKind, Point)> + '_ {
        self.points.iter().enumerate().filter_map(|(index, point)| {
            point.and_then(|point| KeypointKind::from_idx(index).ok().map(|kind| (kind, point)))
        })
    }

    #[cfg(test)]
    pub(crate) fn with(mut self, kind: KeypointKind, point: Point) -> Result<Self, Error> {
        self.points[kind.idx()?] = Some(point);
        Ok(self)
    }
}

/// Which side of the body metrics are measured on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum JointSide {
    Left,
    Right,
}

impl Default for JointSide {
    fn default() -> Self {
        Self::Right
    }
}

impl std::str::FromStr for JointSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(Error::ParseJointSide(s.to_owned())),
        }
    }
}

/// The joints of one side of the body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Limbs {
    pub(crate) shoulder: KeypointKind,
    pub(crate) elbow: KeypointKind,
    pub(crate) wrist: KeypointKind,
    pub(crate) hip: KeypointKind,
    pub(crate) knee: KeypointKind,
    pub(crate) ankle: KeypointKind,
}

impl JointSide {
    pub(crate) fn limbs(self) -> Limbs {
        use KeypointKind::*;

        match self {
            Self::Left => Limbs {
                shoulder: LeftShoulder,
                elbow: LeftElbow,
                wrist: LeftWrist,
                hip: LeftHip,
                knee: LeftKnee,
                ankle: LeftAnkle,
            },
            Self::Right => Limbs {
                shoulder: RightShoulder,
                elbow: RightElbow,
                wrist: RightWrist,
                hip: RightHip,
                knee: RightKnee,
                ankle: RightAnkle,
            },
        }
    }
}

pub(crate) mod constants {
    use crate::pose::KeypointKind::{self, *};

    pub(crate) const KEYPOINT_EDGES: [(KeypointKind, KeypointKind); 19] = [
        (Nose, LeftEye),
        (Nose, RightEye),
        (Nose, LeftEar),
        (Nose, RightEar),
        (LeftEar, LeftEye),
        (RightEar, RightEye),
        (LeftEye, RightEye),
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftShoulder, LeftHip),
        (RightShoulder, RightElbow),
        (RightShoulder, RightHip),
        (LeftElbow, LeftWrist),
        (RightElbow, RightWrist),
        (LeftHip, RightHip),
        (LeftHip, LeftKnee),
        (RightHip, RightKnee),
        (LeftKnee, LeftAnkle),
        (RightKnee, RightAnkle),
    ];
}

#[cfg(test)]
mod tests {
    use super::{JointSide, Keypoint, KeypointKind, Pose, NUM_KEYPOINTS};
    use crate::point::Point;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn every_index_is_a_keypoint() {
        for index in 0..NUM_KEYPOINTS {
            let kind = KeypointKind::from_idx(index).unwrap();
            assert_eq!(kind.idx().unwrap(), index);
        }
        assert!(KeypointKind::from_idx(NUM_KEYPOINTS).is_err());
    }

    #[test]
    fn landmarks_below_threshold_are_dropped() {
        let mut pose = Pose::default();
        for (index, keypoint) in pose.keypoints.iter_mut().enumerate() {
            *keypoint = Keypoint {
                point: Some(Point::new(0.5, 0.5).unwrap()),
                score: if index % 2 == 0 { 0.9 } else { 0.1 },
            };
        }

        let landmarks = pose.landmarks(0.2);
        assert!(landmarks.get(KeypointKind::Nose).is_some());
        assert!(landmarks.get(KeypointKind::LeftEye).is_none());
        assert_eq!(landmarks.iter().count(), (NUM_KEYPOINTS + 1) / 2);
    }

    #[test]
    fn unlocated_keypoints_are_dropped() {
        let mut pose = Pose::default();
        pose.keypoints[0].score = 0.9;
        pose.keypoints[1] = Keypoint {
            point: Some(Point::new(0.5, 0.5).unwrap()),
            score: 0.9,
        };

        let landmarks = pose.landmarks(0.0);
        assert_eq!(landmarks.get(KeypointKind::Nose), None);
        assert!(landmarks.get(KeypointKind::LeftEye).is_some());
        assert_eq!(landmarks.iter().count(), 1);
    }

    #[test]
    fn pose_score_is_mean() {
        let mut pose = Pose::default();
        pose.keypoints[0].score = 1.7;
        assert_approx_eq!(pose.score(), 0.1);
    }

    #[test]
    fn parse_side() {
        assert_eq!("left".parse::<JointSide>().unwrap(), JointSide::Left);
        assert_eq!("Right".parse::<JointSide>().unwrap(), JointSide::Right);
        assert!("middle".parse::<JointSide>().is_err());
    }

    #[test]
    fn sides_do_not_overlap() {
        let left = JointSide::Left.limbs();
        let right = JointSide::Right.limbs();
        assert_eq!(right.knee, KeypointKind::RightKnee);
        assert_eq!(left.shoulder, KeypointKind::LeftShoulder);
        assert_ne!(left.hip, right.hip);
    }
}
