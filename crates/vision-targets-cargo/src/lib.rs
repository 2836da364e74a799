//! Cargo ball detector.
//!
//! Every contour becomes its minimum enclosing circle and every circle is
//! reported, in contour order, as three index-aligned arrays. There is no
//! pairing or selection step.

mod detector;
mod types;

pub use detector::CargoDetector;
pub use types::{CargoParams, CargoReport};
