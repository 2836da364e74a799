//! Pinhole range estimate from a stripe's bounding box.

use crate::params::CameraModel;

/// A box side that cannot be projected (zero, negative, or not finite).
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum DistanceError {
    #[error("bounding width must be positive (got {width})")]
    NonPositiveWidth { width: f64 },
    #[error("bounding height must be positive (got {height})")]
    NonPositiveHeight { height: f64 },
}

impl CameraModel {
    pub fn distance_from_width(&self, width: f64) -> Result<f64, DistanceError> {
        if !(width > 0.0 && width.is_finite()) {
            return Err(DistanceError::NonPositiveWidth { width });
        }
        Ok(self.focal_length_w * self.real_width / width)
    }

    pub fn distance_from_height(&self, height: f64) -> Result<f64, DistanceError> {
        if !(height > 0.0 && height.is_finite()) {
            return Err(DistanceError::NonPositiveHeight { height });
        }
        Ok(self.focal_length_h * self.real_height / height)
    }

    /// Mean of the width and height projections.
    pub fn distance(&self, width: f64, height: f64) -> Result<f64, DistanceError> {
        let from_w = self.distance_from_width(width)?;
        let from_h = self.distance_from_height(height)?;
        Ok((from_w + from_h) / 2.0)
    }
}

/// [`CameraModel::distance`] with the stock calibration.
pub fn estimate_distance(width: f64, height: f64) -> Result<f64, DistanceError> {
    CameraModel::default().distance(width, height)
}
