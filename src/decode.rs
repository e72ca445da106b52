use crate::{
    error::Error,
    point::Point,
    pose::{Keypoint, Pose, NUM_KEYPOINTS},
};
use ndarray::{ArrayViewD, Axis, Ix3};
use tracing::debug;

/// Number of values per keypoint: y, x and score.
const KEYPOINT_FIELDS: usize = 3;

/// Decode MoveNet single-pose output into a `Pose`.
///
/// The output tensor has shape `[1, 1, 17, 3]`, holding `(y, x, score)` for
/// every keypoint in normalized image coordinates. A keypoint with a NaN
/// coordinate is left unlocated and a NaN score counts as zero; neither
/// affects the other keypoints.
pub(crate) fn decode_single_pose(output: ArrayViewD<f32>) -> Result<Pose, Error> {
    let shape = output.shape().to_vec();
    if shape != [1, 1, NUM_KEYPOINTS, KEYPOINT_FIELDS] {
        return Err(Error::UnexpectedOutputShape(shape));
    }

    let keypoints = output
        .index_axis(Axis(0), 0)
        .into_dimensionality::<Ix3>()
        .map_err(|_| Error::UnexpectedOutputShape(shape.clone()))?;
    let keypoints = keypoints.index_axis(Axis(0), 0);

    let mut pose = Pose::default();
    for (index, (slot, row)) in pose
        .keypoints
        .iter_mut()
        .zip(keypoints.axis_iter(Axis(0)))
        .enumerate()
    {
        let point = match Point::new(f64::from(row[1]), f64::from(row[0])) {
            Ok(point) => Some(point),
            Err(error) => {
                debug!(keypoint = index, %error, "dropping unlocated keypoint");
                None
            }
        };
        *slot = Keypoint {
            point,
            score: if row[2].is_nan() { 0.0 } else { row[2] },
        };
    }
    Ok(pose)
}
