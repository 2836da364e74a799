//! Hatch (vision-tape) target detector.
//!
//! A valid sighting is two tape stripes tilted toward each other. Given the
//! frame's contours this crate:
//! - fits each contour with a minimum-area rectangle,
//! - ranks rectangles by distance to the expected target location,
//! - picks the best left/right stripe by rotation and gates the pair,
//! - converts each stripe's bounding box to a range with a pinhole model.
//!
//! Every frame is independent; nothing is tracked across calls.

mod detector;
mod distance;
mod params;
mod record;
mod select;

pub use detector::HatchDetector;
pub use distance::{estimate_distance, DistanceError};
pub use params::{CameraModel, HatchParams};
pub use record::{HatchOutcome, ResetReason, TargetRecord};
pub use select::{
    angle_diff, best_angle_match, evaluate_pair, select_pair, PairRejection, TargetPair,
};
