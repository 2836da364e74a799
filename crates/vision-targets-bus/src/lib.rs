//! Key-value bus shared with the robot controller.
//!
//! Entries live under a table path (`vision/cargo`) and a key (`x`). Writes
//! are fire-and-forget and last-write-wins; there is no acknowledgement.
//! [`MemoryBus`] is the in-process implementation used by tests and the CLI;
//! a network transport implements [`Bus`] the same way.

mod memory;

pub use memory::MemoryBus;

use serde::{Deserialize, Serialize};

/// Root table; holds the camera selector.
pub const VISION_TABLE: &str = "vision";
pub const CARGO_TABLE: &str = "vision/cargo";
pub const TARGETS_TABLE: &str = "vision/targets";
/// Alternate table name used when hatch targets get their own channel.
pub const HATCH_TARGETS_TABLE: &str = "vision/hatch-targets";

pub const SOURCE_KEY: &str = "source";
pub const CONTOUR_LEFT_KEY: &str = "contour_left";
pub const CONTOUR_RIGHT_KEY: &str = "contour_right";
pub const CARGO_X_KEY: &str = "x";
pub const CARGO_Y_KEY: &str = "y";
pub const CARGO_R_KEY: &str = "r";

/// A bus entry value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    NumberArray(Vec<f64>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::NumberArray(_) => "number[]",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::NumberArray(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            Value::NumberArray(v) => Some(v),
            Value::Number(_) => None,
        }
    }
}

/// Errors returned by a bus write.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BusError {
    /// An entry keeps the type it was created with.
    #[error("entry {table}/{key} holds a {existing}, cannot store a {attempted}")]
    TypeMismatch {
        table: String,
        key: String,
        existing: &'static str,
        attempted: &'static str,
    },
    #[error("bus connection closed")]
    Closed,
}

/// Shared key-value store. Implementations must be usable from several
/// worker threads at once.
pub trait Bus: Send + Sync {
    fn set_value(&self, table: &str, key: &str, value: Value) -> Result<(), BusError>;

    fn get_value(&self, table: &str, key: &str) -> Option<Value>;

    fn set_number_array(&self, table: &str, key: &str, values: &[f64]) -> Result<(), BusError> {
        self.set_value(table, key, Value::NumberArray(values.to_vec()))
    }

    fn set_number(&self, table: &str, key: &str, value: f64) -> Result<(), BusError> {
        self.set_value(table, key, Value::Number(value))
    }

    fn get_number(&self, table: &str, key: &str) -> Option<f64> {
        self.get_value(table, key).and_then(|v| v.as_number())
    }

    fn get_number_array(&self, table: &str, key: &str) -> Option<Vec<f64>> {
        match self.get_value(table, key)? {
            Value::NumberArray(v) => Some(v),
            Value::Number(_) => None,
        }
    }
}
