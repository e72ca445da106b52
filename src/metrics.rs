use crate::{
    angle::angle,
    error::Error,
    pose::{JointSide, LandmarkSet},
};
use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Joint angles measured on a single frame, in whole degrees.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub(crate) struct FrameMetrics {
    /// 1-based index of the frame in decode order.
    pub(crate) frame: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) knee_angle: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) elbow_angle: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) body_lean: Option<u16>,
}

impl FrameMetrics {
    /// Measure the joints on `side` of `landmarks`.
    ///
    /// Each metric needs three joints and is left empty when any one of them is
    /// missing; the others are still measured.
    pub(crate) fn extract(frame: usize, landmarks: Option<&LandmarkSet>, side: JointSide) -> Self {
        let landmarks = match landmarks {
            Some(landmarks) => landmarks,
            None => {
                return Self {
                    frame,
                    ..Default::default()
                }
            }
        };

        let limbs = side.limbs();
        let shoulder = landmarks.get(limbs.shoulder);
        let elbow = landmarks.get(limbs.elbow);
        let wrist = landmarks.get(limbs.wrist);
        let hip = landmarks.get(limbs.hip);
        let knee = landmarks.get(limbs.knee);
        let ankle = landmarks.get(limbs.ankle);

        Self {
            frame,
            knee_angle: hip
                .zip(knee)
                .zip(ankle)
                .map(|((hip, knee), ankle)| angle(hip, knee, ankle)),
            elbow_angle: shoulder
                .zip(elbow)
                .zip(wrist)
                .map(|((shoulder, elbow), wrist)| angle(shoulder, elbow, wrist)),
            body_lean: shoulder
                .zip(hip)
                .map(|(shoulder, hip)| angle(shoulder.above(), shoulder, hip)),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.knee_angle.is_none() && self.elbow_angle.is_none() && self.body_lean.is_none()
    }

    /// Labelled values of the metrics that are present, in display order.
    pub(crate) fn labels(&self) -> impl Iterator<Item = (usize, String)> {
        [
            ("Knee Angle", self.knee_angle),
            ("Elbow Angle", self.elbow_angle),
            ("Body Lean", self.body_lean),
        ]
        .into_iter()
        .enumerate()
        .filter_map(|(slot, (label, value))| {
            value.map(|value| (slot, format!("{}: {}", label, value)))
        })
    }
}

/// Per-frame metrics of a whole run, in frame order.
#[derive(Debug, Default)]
pub(crate) struct MetricsLog {
    records: Vec<FrameMetrics>,
}

impl MetricsLog {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, record: FrameMetrics) {
        debug_assert_eq!(record.frame, self.records.len() + 1);
        self.records.push(record);
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub(crate) fn records(&self) -> &[FrameMetrics] {
        &self.records
    }

    /// Number of frames with at least one metric.
    pub(crate) fn detections(&self) -> usize {
        self.records.iter().filter(|record| !record.is_empty()).count()
    }

    /// Write the log as a JSON array to `path`, replacing whatever was there.
    pub(crate) fn write_to<P>(&self, path: P) -> Result<(), Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::CreateLog(e, path.to_owned()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.records)
            .map_err(|e| Error::WriteLog(e, path.to_owned()))?;
        writer
            .flush()
            .map_err(|e| Error::FlushLog(e, path.to_owned()))
    }
}
