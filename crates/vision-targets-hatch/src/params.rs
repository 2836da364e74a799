use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Pinhole calibration for the vision-tape stripe.
///
/// Focal lengths are in pixels; the real dimensions share whatever unit the
/// distance should be reported in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraModel {
    pub focal_length_w: f64,
    pub real_width: f64,
    pub focal_length_h: f64,
    pub real_height: f64,
}

impl Default for CameraModel {
    fn default() -> Self {
        Self {
            focal_length_w: 393.903,
            real_width: 3.313,
            focal_length_h: 370.815,
            real_height: 5.825,
        }
    }
}

/// Configuration for hatch target pairing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HatchParams {
    /// Where targets are expected in the image. Offset from the true center
    /// because the camera is mounted off-axis.
    pub reference_point: Point2<f32>,
    /// Expected rotation of the left stripe, degrees.
    pub expected_left_angle_deg: f32,
    /// Expected rotation of the right stripe, degrees.
    pub expected_right_angle_deg: f32,
    /// Both stripes must be strictly closer than this to their expected angle.
    pub angle_tolerance_deg: f32,
    /// Fitted rectangles with a side at or below this many pixels are dropped
    /// before ranking.
    pub min_side_px: f32,
    pub camera: CameraModel,
}

impl Default for HatchParams {
    fn default() -> Self {
        Self {
            reference_point: Point2::new(208.0, 120.0),
            expected_left_angle_deg: -75.5,
            expected_right_angle_deg: -14.5,
            angle_tolerance_deg: 10.0,
            min_side_px: 0.0,
            camera: CameraModel::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let p: HatchParams =
            serde_json::from_str(r#"{"angle_tolerance_deg": 5.0, "reference_point": [160, 120]}"#)
                .expect("parse");
        assert_eq!(p.angle_tolerance_deg, 5.0);
        assert_eq!(p.reference_point, Point2::new(160.0, 120.0));
        assert_eq!(p.expected_left_angle_deg, -75.5);
        assert_eq!(p.camera, CameraModel::default());
    }
}
