//! One-shot detection over pre-extracted contours.
//!
//! This is the same per-frame path the runtime takes, minus capture and
//! segmentation. The CLI and the integration tests drive it.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::bus::Bus;
use crate::cargo::{CargoDetector, CargoReport};
use crate::config::ConfigError;
use crate::core::Contour;
use crate::hatch::{HatchDetector, HatchOutcome};
use crate::publish::{publish_cargo, publish_hatch};

/// Contours for one frame, split by target class.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourSet {
    pub hatch: Vec<Contour>,
    pub cargo: Vec<Contour>,
}

impl ContourSet {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Clone, Debug)]
pub struct FrameResult {
    pub hatch: HatchOutcome,
    pub cargo: CargoReport,
    pub failed_writes: usize,
}

/// Run both detectors on `contours` and publish the results.
pub fn detect_and_publish(
    contours: &ContourSet,
    hatch: &HatchDetector,
    cargo: &CargoDetector,
    bus: &dyn Bus,
    hatch_table: &str,
) -> FrameResult {
    let hatch_outcome = hatch.detect(&contours.hatch);
    let cargo_report = cargo.detect(&contours.cargo);
    let failed_writes = publish_hatch(bus, hatch_table, &hatch_outcome)
        + publish_cargo(bus, &cargo_report);
    info!(
        "hatch {}, {} cargo circle(s)",
        if hatch_outcome.is_published() {
            "published"
        } else {
            "reset"
        },
        cargo_report.len()
    );
    FrameResult {
        hatch: hatch_outcome,
        cargo: cargo_report,
        failed_writes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{MemoryBus, CARGO_TABLE, CARGO_X_KEY, TARGETS_TABLE};

    #[test]
    fn contour_set_reads_point_lists() {
        let set: ContourSet = serde_json::from_str(
            r#"{"cargo": [[[0,0],[2,0],[2,2],[0,2]]]}"#,
        )
        .unwrap();
        assert!(set.hatch.is_empty());
        assert_eq!(set.cargo.len(), 1);
        assert_eq!(set.cargo[0].len(), 4);
    }

    #[test]
    fn short_contour_is_a_parse_error() {
        let res: Result<ContourSet, _> = serde_json::from_str(r#"{"hatch": [[[0,0],[1,1]]]}"#);
        assert!(res.is_err());
    }

    #[test]
    fn empty_set_resets_hatch_and_clears_cargo() {
        let bus = MemoryBus::new();
        let res = detect_and_publish(
            &ContourSet::default(),
            &HatchDetector::default(),
            &CargoDetector::default(),
            &bus,
            TARGETS_TABLE,
        );
        assert!(!res.hatch.is_published());
        assert!(res.cargo.is_empty());
        assert_eq!(res.failed_writes, 0);
        assert_eq!(bus.get_number_array(CARGO_TABLE, CARGO_X_KEY), Some(vec![]));
        assert_eq!(bus.table(TARGETS_TABLE).len(), 2);
    }
}
