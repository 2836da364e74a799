//! Core types for retro-reflective target detection.
//!
//! This crate is purely geometric. It knows nothing about cameras,
//! segmentation, or where results are published: it turns contours into
//! fitted primitives and orders them.

mod fit;
mod frame;
mod geometry;
mod logger;
mod rank;

pub use fit::{
    convex_hull, fit_enclosing_circle, fit_rotated_rect, min_area_rect, min_enclosing_circle,
};
pub use frame::{Frame, FrameError, PixelFormat};
pub use geometry::{BoundingBox, Centered, Circle, Contour, ContourError, RotatedRect};
pub use rank::{proximity_order, rank_by_proximity};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

pub use nalgebra::Point2;
