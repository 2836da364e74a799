//! Writes detector output to the bus.
//!
//! Failures are logged and dropped, never retried. The next frame rewrites
//! the same entries.

use log::warn;

use crate::bus::{
    Bus, CARGO_R_KEY, CARGO_TABLE, CARGO_X_KEY, CARGO_Y_KEY, CONTOUR_LEFT_KEY,
    CONTOUR_RIGHT_KEY,
};
use crate::cargo::CargoReport;
use crate::hatch::HatchOutcome;

/// Write `contour_left` / `contour_right` under `table`.
///
/// A reset outcome writes six zeros to both entries. Returns the number of
/// entries that failed to write.
pub fn publish_hatch(bus: &dyn Bus, table: &str, outcome: &HatchOutcome) -> usize {
    let (left, right) = outcome.entries();
    [
        write(bus, table, CONTOUR_LEFT_KEY, &left),
        write(bus, table, CONTOUR_RIGHT_KEY, &right),
    ]
    .into_iter()
    .filter(|ok| !ok)
    .count()
}

/// Write the cargo `x`, `y`, `r` arrays. Returns the number of failed writes.
pub fn publish_cargo(bus: &dyn Bus, report: &CargoReport) -> usize {
    [
        write(bus, CARGO_TABLE, CARGO_X_KEY, &report.x),
        write(bus, CARGO_TABLE, CARGO_Y_KEY, &report.y),
        write(bus, CARGO_TABLE, CARGO_R_KEY, &report.r),
    ]
    .into_iter()
    .filter(|ok| !ok)
    .count()
}

fn write(bus: &dyn Bus, table: &str, key: &str, values: &[f64]) -> bool {
    match bus.set_number_array(table, key, values) {
        Ok(()) => true,
        Err(e) => {
            warn!("bus write {table}/{key} failed: {e}");
            false
        }
    }
}
