//! Facade crate for the `vision-targets-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry, detector and bus crates
//! - the publisher that writes detector output to the bus
//! - configuration loading (`/boot/frc.json` layout)
//! - a threaded runtime: one grab thread, one worker per target channel
//!
//! ## Quickstart
//!
//! ```
//! use vision_targets::bus::{Bus, MemoryBus, CARGO_TABLE, TARGETS_TABLE};
//! use vision_targets::detect::{detect_and_publish, ContourSet};
//! use vision_targets::{CargoDetector, Contour, HatchDetector};
//!
//! let bus = MemoryBus::new();
//! let contours = ContourSet {
//!     hatch: vec![],
//!     cargo: vec![Contour::from_xy(&[(8.0, 10.0), (10.0, 8.0), (12.0, 10.0), (10.0, 12.0)]).unwrap()],
//! };
//! let res = detect_and_publish(
//!     &contours,
//!     &HatchDetector::default(),
//!     &CargoDetector::default(),
//!     &bus,
//!     TARGETS_TABLE,
//! );
//! assert!(!res.hatch.is_published());
//! let r = bus.get_number_array(CARGO_TABLE, "r").unwrap();
//! assert!((r[0] - 2.0).abs() < 1e-4);
//! ```
//!
//! ## API map
//! - `vision_targets::core`: contours, fitted shapes, ranking, frames.
//! - `vision_targets::hatch`: stripe pairing and range estimation.
//! - `vision_targets::cargo`: enclosing circles for cargo balls.
//! - `vision_targets::bus`: the key-value bus and its table layout.
//! - `vision_targets::runtime`: capture/worker threads and shutdown.

pub use vision_targets_bus as bus;
pub use vision_targets_cargo as cargo;
pub use vision_targets_core as core;
pub use vision_targets_hatch as hatch;

pub mod channel;
pub mod config;
pub mod detect;
pub mod frame_slot;
pub mod publish;
pub mod runtime;

pub use vision_targets_cargo::{CargoDetector, CargoParams, CargoReport};
pub use vision_targets_core::{Circle, Contour, Frame, PixelFormat, RotatedRect};
pub use vision_targets_hatch::{HatchDetector, HatchOutcome, HatchParams, TargetRecord};

pub use channel::{CargoChannel, HatchChannel, Segmenter, TargetChannel};
pub use config::{ConfigError, VisionConfig};
pub use runtime::{FrameSource, RuntimeConfig, RuntimeError, ShutdownToken, VisionRuntime};
