use serde::{Deserialize, Serialize};
use vision_targets_core::Circle;

/// Parameters for cargo detection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CargoParams {
    /// Circles with a radius below this are dropped. `0` keeps everything.
    pub min_radius_px: f32,
}

/// Circles for one frame as parallel arrays (`x[i]`, `y[i]`, `r[i]` describe
/// circle `i`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CargoReport {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub r: Vec<f64>,
}

impl CargoReport {
    pub fn from_circles(circles: &[Circle]) -> Self {
        let mut report = Self {
            x: Vec::with_capacity(circles.len()),
            y: Vec::with_capacity(circles.len()),
            r: Vec::with_capacity(circles.len()),
        };
        for c in circles {
            report.x.push(c.center.x as f64);
            report.y.push(c.center.y as f64);
            report.r.push(c.radius as f64);
        }
        report
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
