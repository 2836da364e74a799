use log::debug;
use vision_targets_core::{fit_enclosing_circle, Circle, Contour};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::types::{CargoParams, CargoReport};

/// Cargo detector: one circle per contour, input order preserved.
#[derive(Clone, Debug, Default)]
pub struct CargoDetector {
    params: CargoParams,
}

impl CargoDetector {
    pub fn new(params: CargoParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CargoParams {
        &self.params
    }

    pub fn circles(&self, contours: &[Contour]) -> Vec<Circle> {
        let min_r = self.params.min_radius_px;
        contours
            .iter()
            .map(fit_enclosing_circle)
            .filter(|c| c.radius >= min_r)
            .collect()
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, contours), fields(contours = contours.len()))
    )]
    pub fn detect(&self, contours: &[Contour]) -> CargoReport {
        let circles = self.circles(contours);
        debug!("cargo: {} circle(s) from {} contour(s)", circles.len(), contours.len());
        CargoReport::from_circles(&circles)
    }
}
