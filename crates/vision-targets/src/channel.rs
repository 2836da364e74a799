//! Target channels: one owned segment -> detect -> publish pipeline per
//! target class.

use crate::bus::{Bus, TARGETS_TABLE};
use crate::cargo::CargoDetector;
use crate::core::{Contour, Frame};
use crate::hatch::HatchDetector;
use crate::publish::{publish_cargo, publish_hatch};

/// Turns a frame into candidate contours (color threshold, morphology,
/// contour extraction). Provided by the caller.
pub trait Segmenter: Send {
    fn segment(&mut self, frame: &Frame) -> Vec<Contour>;
}

impl<F> Segmenter for F
where
    F: FnMut(&Frame) -> Vec<Contour> + Send,
{
    fn segment(&mut self, frame: &Frame) -> Vec<Contour> {
        self(frame)
    }
}

/// What a channel wrote for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    /// Real target data was written.
    Published,
    /// The "no target" value was written.
    Reset,
}

/// Per-frame outcome of [`TargetChannel::process`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelReport {
    pub state: ChannelState,
    pub contours: usize,
    pub failed_writes: usize,
}

/// One independent detection channel, driven by its own worker thread.
pub trait TargetChannel: Send {
    fn name(&self) -> &str;

    fn process(&mut self, frame: &Frame, bus: &dyn Bus) -> ChannelReport;
}

/// Vision-tape pair channel.
pub struct HatchChannel<S> {
    segmenter: S,
    detector: HatchDetector,
    table: String,
}

impl<S: Segmenter> HatchChannel<S> {
    pub fn new(segmenter: S, detector: HatchDetector) -> Self {
        Self {
            segmenter,
            detector,
            table: TARGETS_TABLE.to_owned(),
        }
    }

    /// Publish under a different table, e.g. `vision/hatch-targets`.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl<S: Segmenter> TargetChannel for HatchChannel<S> {
    fn name(&self) -> &str {
        "hatch"
    }

    fn process(&mut self, frame: &Frame, bus: &dyn Bus) -> ChannelReport {
        let contours = self.segmenter.segment(frame);
        let outcome = self.detector.detect(&contours);
        let failed_writes = publish_hatch(bus, &self.table, &outcome);
        ChannelReport {
            state: if outcome.is_published() {
                ChannelState::Published
            } else {
                ChannelState::Reset
            },
            contours: contours.len(),
            failed_writes,
        }
    }
}

/// Cargo ball channel.
pub struct CargoChannel<S> {
    segmenter: S,
    detector: CargoDetector,
}

impl<S: Segmenter> CargoChannel<S> {
    pub fn new(segmenter: S, detector: CargoDetector) -> Self {
        Self {
            segmenter,
            detector,
        }
    }
}

impl<S: Segmenter> TargetChannel for CargoChannel<S> {
    fn name(&self) -> &str {
        "cargo"
    }

    fn process(&mut self, frame: &Frame, bus: &dyn Bus) -> ChannelReport {
        let contours = self.segmenter.segment(frame);
        let report = self.detector.detect(&contours);
        let failed_writes = publish_cargo(bus, &report);
        ChannelReport {
            state: if report.is_empty() {
                ChannelState::Reset
            } else {
                ChannelState::Published
            },
            contours: contours.len(),
            failed_writes,
        }
    }
}
