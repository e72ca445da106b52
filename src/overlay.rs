use crate::{error::Error, metrics::FrameMetrics, point::Point, pose::LandmarkSet};
use num_traits::cast::ToPrimitive;
use opencv::{
    core::{Mat, Point2i, Scalar},
    imgproc::{FONT_HERSHEY_SIMPLEX, LINE_8, LINE_AA},
    prelude::*,
};

/// Burns annotations into a frame.
pub(crate) trait OverlayRenderer<F> {
    fn render(
        &mut self,
        frame: &mut F,
        landmarks: Option<&LandmarkSet>,
        metrics: &FrameMetrics,
    ) -> Result<(), Error>;
}

const GREEN: (f64, f64, f64) = (0.0, 255.0, 0.0);
const YELLOW: (f64, f64, f64) = (0.0, 255.0, 255.0);
const WHITE: (f64, f64, f64) = (255.0, 255.0, 255.0);

const TEXT_ORIGIN: (i32, i32) = (10, 30);
const TEXT_LINE_HEIGHT: i32 = 30;
const TEXT_SCALE: f64 = 0.7;

/// Draws the skeleton and the metric labels with OpenCV.
#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct SkeletonOverlay;

/// Map a normalized point onto a `width` x `height` frame.
fn to_pixel(point: Point, width: i32, height: i32) -> Result<Point2i, Error> {
    let x = (point.x() * f64::from(width))
        .to_i32()
        .ok_or(Error::ConvertToI32)?;
    let y = (point.y() * f64::from(height))
        .to_i32()
        .ok_or(Error::ConvertToI32)?;
    Ok(Point2i::new(x, y))
}

/// Top-left anchored position of the label in `slot`.
fn label_origin(slot: usize) -> Point2i {
    let (x, y) = TEXT_ORIGIN;
    Point2i::new(x, y + TEXT_LINE_HEIGHT * slot as i32)
}

impl SkeletonOverlay {
    fn draw_skeleton(&self, frame: &mut Mat, landmarks: &LandmarkSet) -> Result<(), Error> {
        let (width, height) = (frame.cols(), frame.rows());

        for (a, b) in crate::pose::constants::KEYPOINT_EDGES {
            if let (Some(a_point), Some(b_point)) = (landmarks.get(a), landmarks.get(b)) {
                opencv::imgproc::line(
                    frame,
                    to_pixel(a_point, width, height)?,
                    to_pixel(b_point, width, height)?,
                    Scalar::from(YELLOW),
                    2,      // thickness
                    LINE_8, // line_type
                    0,      // shift
                )
                .map_err(Error::DrawLine)?;
            }
        }

        landmarks.iter().try_for_each(|(_, point)| {
            opencv::imgproc::circle(
                frame,
                to_pixel(point, width, height)?,
                4,
                Scalar::from(GREEN),
                -1,     // filled
                LINE_8, // line_type
                0,      // shift
            )
            .map_err(Error::DrawCircle)
        })
    }
}

impl OverlayRenderer<Mat> for SkeletonOverlay {
    fn render(
        &mut self,
        frame: &mut Mat,
        landmarks: Option<&LandmarkSet>,
        metrics: &FrameMetrics,
    ) -> Result<(), Error> {
        if let Some(landmarks) = landmarks {
            self.draw_skeleton(frame, landmarks)?;
        }

        for (slot, text) in metrics.labels() {
            opencv::imgproc::put_text(
                frame,
                &text,
                label_origin(slot),
                FONT_HERSHEY_SIMPLEX,
                TEXT_SCALE,
                Scalar::from(WHITE),
                2,       // thickness
                LINE_AA, // line_type
                false,   // bottom_left_origin
            )
            .map_err(Error::PutText)?;
        }
        Ok(())
    }
}
