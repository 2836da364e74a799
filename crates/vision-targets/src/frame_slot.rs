//! Latest-frame handoff between the grab thread and the workers.
//!
//! The slot stores an immutable `Arc<Frame>` plus a version counter. The
//! grab thread swaps in a new handle; workers clone the handle and process a
//! consistent snapshot while the next frame is captured.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::core::Frame;

#[derive(Default)]
struct Latest {
    version: u64,
    frame: Option<Arc<Frame>>,
    closed: bool,
}

/// Versioned single-frame buffer.
#[derive(Default)]
pub struct FrameSlot {
    latest: Mutex<Latest>,
    fresh: Condvar,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    // Holders only swap an `Arc`, so a poisoned lock still guards valid data.
    fn lock(&self) -> MutexGuard<'_, Latest> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the current frame and wake waiting workers. Returns the new
    /// version.
    pub fn publish(&self, frame: Frame) -> u64 {
        let version = {
            let mut latest = self.lock();
            latest.version += 1;
            latest.frame = Some(Arc::new(frame));
            latest.version
        };
        self.fresh.notify_all();
        version
    }

    /// Current version; `0` until the first publish.
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    pub fn snapshot(&self) -> Option<(u64, Arc<Frame>)> {
        let latest = self.lock();
        latest
            .frame
            .as_ref()
            .map(|f| (latest.version, Arc::clone(f)))
    }

    /// Block until a frame newer than `after` exists, the slot is closed, or
    /// `timeout` elapses. Only the first case returns a frame.
    pub fn wait_newer(&self, after: u64, timeout: Duration) -> Option<(u64, Arc<Frame>)> {
        let guard = self.lock();
        let (latest, _) = self
            .fresh
            .wait_timeout_while(guard, timeout, |l| l.version <= after && !l.closed)
            .unwrap_or_else(|e| e.into_inner());
        if latest.closed || latest.version <= after {
            return None;
        }
        latest
            .frame
            .as_ref()
            .map(|f| (latest.version, Arc::clone(f)))
    }

    /// Release every waiter; later waits return `None` immediately.
    pub fn close(&self) {
        self.lock().closed = true;
        self.fresh.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PixelFormat;
    use std::thread;

    fn frame(v: u8) -> Frame {
        Frame::new(1, 1, PixelFormat::Gray8, vec![v]).unwrap()
    }

    #[test]
    fn empty_slot_has_no_snapshot() {
        let slot = FrameSlot::new();
        assert_eq!(slot.version(), 0);
        assert!(slot.snapshot().is_none());
        assert!(slot.wait_newer(0, Duration::from_millis(5)).is_none());
    }

    #[test]
    fn snapshot_survives_replacement() {
        let slot = FrameSlot::new();
        slot.publish(frame(1));
        let (v1, held) = slot.snapshot().unwrap();
        slot.publish(frame(2));
        assert_eq!(held.data(), &[1]);
        let (v2, now) = slot.snapshot().unwrap();
        assert!(v2 > v1);
        assert_eq!(now.data(), &[2]);
    }

    #[test]
    fn waiter_sees_next_frame() {
        let slot = Arc::new(FrameSlot::new());
        slot.publish(frame(1));
        let seen = slot.version();

        let writer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                slot.publish(frame(7));
            })
        };
        let (v, f) = slot
            .wait_newer(seen, Duration::from_secs(5))
            .expect("new frame");
        writer.join().unwrap();
        assert!(v > seen);
        assert_eq!(f.data(), &[7]);
    }

    #[test]
    fn close_releases_waiters() {
        let slot = Arc::new(FrameSlot::new());
        let waiter = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.wait_newer(0, Duration::from_secs(30)))
        };
        thread::sleep(Duration::from_millis(20));
        slot.close();
        assert!(waiter.join().unwrap().is_none());
        assert!(slot.is_closed());
    }

    #[test]
    fn already_newer_returns_immediately() {
        let slot = FrameSlot::new();
        slot.publish(frame(3));
        let (v, _) = slot.wait_newer(0, Duration::ZERO).expect("frame");
        assert_eq!(v, 1);
    }
}
