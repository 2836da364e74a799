use serde::{Deserialize, Serialize};
use vision_targets_core::RotatedRect;

use crate::distance::DistanceError;
use crate::params::CameraModel;
use crate::select::{PairRejection, TargetPair};

/// One published stripe: upright box, range, and the fitted rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub distance: f64,
    pub angle: f64,
}

impl TargetRecord {
    /// All zeros: "no target this frame".
    pub const RESET: TargetRecord = TargetRecord {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
        distance: 0.0,
        angle: 0.0,
    };

    pub fn from_rect(rect: &RotatedRect, camera: &CameraModel) -> Result<Self, DistanceError> {
        let bb = rect.bounding_box();
        let width = bb.width as f64;
        let height = bb.height as f64;
        Ok(Self {
            x: bb.x as f64,
            y: bb.y as f64,
            width,
            height,
            distance: camera.distance(width, height)?,
            angle: rect.angle as f64,
        })
    }

    /// Bus layout: `[x, y, width, height, distance, angle]`.
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.x,
            self.y,
            self.width,
            self.height,
            self.distance,
            self.angle,
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResetReason {
    Rejected(PairRejection),
    /// The range estimate failed for a selected stripe.
    ///
    /// [`HatchDetector`](crate::HatchDetector) drops zero-sided rectangles
    /// before pairing and ranges from the inclusive bounding box, which is
    /// always at least 1x1, so its `detect` paths never produce this. It is
    /// kept for callers that range records with their own [`CameraModel`].
    DegenerateGeometry(DistanceError),
}

impl std::fmt::Display for ResetReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetReason::Rejected(r) => write!(f, "{r}"),
            ResetReason::DegenerateGeometry(e) => write!(f, "degenerate geometry: {e}"),
        }
    }
}

/// Result of one frame for the hatch channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HatchOutcome {
    Published {
        pair: TargetPair,
        left: TargetRecord,
        right: TargetRecord,
    },
    Reset(ResetReason),
}

impl HatchOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, HatchOutcome::Published { .. })
    }

    /// `(contour_left, contour_right)` arrays; zeros on reset.
    pub fn entries(&self) -> ([f64; 6], [f64; 6]) {
        match self {
            HatchOutcome::Published { left, right, .. } => (left.to_array(), right.to_array()),
            HatchOutcome::Reset(_) => (TargetRecord::RESET.to_array(), TargetRecord::RESET.to_array()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    #[test]
    fn record_uses_bounding_box() {
        let rect = RotatedRect {
            center: Point2::new(50.0, 40.0),
            width: 10.0,
            height: 20.0,
            angle: -90.0,
        };
        let rec = TargetRecord::from_rect(&rect, &CameraModel::default()).expect("record");
        // width side runs vertically at -90
        assert_eq!(rec.x, 40.0);
        assert_eq!(rec.y, 35.0);
        assert_eq!(rec.width, 21.0);
        assert_eq!(rec.height, 11.0);
        assert_eq!(rec.angle, -90.0);
        let expected = (393.903 * 3.313 / 21.0 + 370.815 * 5.825 / 11.0) / 2.0;
        assert_relative_eq!(rec.distance, expected, epsilon = 1e-9);
    }

    #[test]
    fn reset_entries_are_zero() {
        let out = HatchOutcome::Reset(ResetReason::Rejected(PairRejection::NoCandidates));
        assert!(!out.is_published());
        assert_eq!(out.entries(), ([0.0; 6], [0.0; 6]));
    }

    #[test]
    fn degenerate_reset_publishes_zeros() {
        let err = CameraModel::default().distance(0.0, 10.0).unwrap_err();
        let out = HatchOutcome::Reset(ResetReason::DegenerateGeometry(err));
        assert_eq!(out.entries(), ([0.0; 6], [0.0; 6]));
        assert!(ResetReason::DegenerateGeometry(err)
            .to_string()
            .starts_with("degenerate geometry"));
    }
}
