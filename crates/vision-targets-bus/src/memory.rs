use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::trace;

use crate::{Bus, BusError, Value};

type Entries = BTreeMap<String, BTreeMap<String, Value>>;

/// In-process bus. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryBus {
    entries: RwLock<Entries>,
    closed: AtomicBool,
    writes: AtomicU64,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every later write with [`BusError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Number of accepted writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Acquire)
    }

    /// Copy of every table: `table -> key -> value`.
    pub fn snapshot(&self) -> BTreeMap<String, BTreeMap<String, Value>> {
        self.read().clone()
    }

    /// Copy of one table (empty if it was never written).
    pub fn table(&self, table: &str) -> BTreeMap<String, Value> {
        self.read().get(table).cloned().unwrap_or_default()
    }

    // A panicking writer cannot leave a half-written entry, so poisoning is
    // ignored.
    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Bus for MemoryBus {
    fn set_value(&self, table: &str, key: &str, value: Value) -> Result<(), BusError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BusError::Closed);
        }
        let mut entries = self.write();
        let slot = entries.entry(table.to_owned()).or_default();
        if let Some(existing) = slot.get(key) {
            if existing.type_name() != value.type_name() {
                return Err(BusError::TypeMismatch {
                    table: table.to_owned(),
                    key: key.to_owned(),
                    existing: existing.type_name(),
                    attempted: value.type_name(),
                });
            }
        }
        trace!("{table}/{key} <- {value:?}");
        slot.insert(key.to_owned(), value);
        self.writes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn get_value(&self, table: &str, key: &str) -> Option<Value> {
        self.read().get(table)?.get(key).cloned()
    }
}
