//! Threaded runtime: one grab thread feeding a [`FrameSlot`], one worker per
//! [`TargetChannel`].
//!
//! Shutdown is cooperative. [`VisionRuntime::shutdown`] cancels the shared
//! token, closes the slot so idle workers wake up, and joins every thread.
//! An iteration already in flight runs to completion first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::bus::{Bus, SOURCE_KEY, VISION_TABLE};
use crate::channel::{ChannelState, TargetChannel};
use crate::core::Frame;
use crate::frame_slot::FrameSlot;

/// A camera (or anything else that yields frames).
pub trait FrameSource: Send {
    fn name(&self) -> &str;

    /// Next frame. May block for up to one frame period.
    fn grab(&mut self) -> Result<Frame, SourceError>;
}

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("camera '{name}' timed out")]
    Timeout { name: String },
    #[error("camera '{name}' disconnected")]
    Disconnected { name: String },
    #[error("camera '{name}': {message}")]
    Other { name: String, message: String },
}

#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    #[error("no frame sources configured")]
    NoSources,
    #[error("no target channels configured")]
    NoChannels,
    #[error("failed to spawn thread '{name}'")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("thread '{name}' panicked")]
    WorkerPanicked { name: String },
}

/// Cancellation flag shared by every runtime thread.
#[derive(Clone, Debug, Default)]
pub struct ShutdownToken(Arc<AtomicBool>);

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Longest a worker sleeps waiting for a new frame before rechecking the
    /// shutdown token.
    pub worker_poll: Duration,
    /// Pause after a failed grab.
    pub grab_retry_delay: Duration,
    /// Bus entry holding the active camera index.
    pub source_table: String,
    pub source_key: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_poll: Duration::from_millis(100),
            grab_retry_delay: Duration::from_millis(10),
            source_table: VISION_TABLE.to_owned(),
            source_key: SOURCE_KEY.to_owned(),
        }
    }
}

/// Counters returned by each thread when it exits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub name: String,
    /// Frames grabbed (grab thread) or processed (workers).
    pub frames: u64,
    pub published: u64,
    pub resets: u64,
    /// Failed grabs (grab thread) or failed bus writes (workers).
    pub errors: u64,
}

/// Camera index for a raw `vision/source` value: truncated, then taken
/// modulo `count`. Missing or non-finite values select camera 0.
pub fn select_source(value: Option<f64>, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    match value {
        Some(v) if v.is_finite() => (v.trunc() as i64).rem_euclid(count as i64) as usize,
        _ => 0,
    }
}

pub struct VisionRuntime {
    token: ShutdownToken,
    slot: Arc<FrameSlot>,
    handles: Vec<(String, JoinHandle<WorkerStats>)>,
}

impl VisionRuntime {
    /// Spawn the grab thread and one worker per channel.
    pub fn start(
        sources: Vec<Box<dyn FrameSource>>,
        channels: Vec<Box<dyn TargetChannel>>,
        bus: Arc<dyn Bus>,
        config: RuntimeConfig,
    ) -> Result<Self, RuntimeError> {
        if sources.is_empty() {
            return Err(RuntimeError::NoSources);
        }
        if channels.is_empty() {
            return Err(RuntimeError::NoChannels);
        }

        let mut runtime = Self {
            token: ShutdownToken::new(),
            slot: Arc::new(FrameSlot::new()),
            handles: Vec::with_capacity(channels.len() + 1),
        };

        for channel in channels {
            let name = format!("vision-{}", channel.name());
            let token = runtime.token.clone();
            let slot = Arc::clone(&runtime.slot);
            let bus = Arc::clone(&bus);
            let poll = config.worker_poll;
            runtime.spawn(name, move || worker_loop(channel, &slot, bus.as_ref(), &token, poll))?;
        }

        let token = runtime.token.clone();
        let slot = Arc::clone(&runtime.slot);
        runtime.spawn("vision-grab".to_owned(), move || {
            grab_loop(sources, &slot, bus.as_ref(), &token, &config)
        })?;

        info!("vision runtime started ({} thread(s))", runtime.handles.len());
        Ok(runtime)
    }

    fn spawn<F>(&mut self, name: String, f: F) -> Result<(), RuntimeError>
    where
        F: FnOnce() -> WorkerStats + Send + 'static,
    {
        match thread::Builder::new().name(name.clone()).spawn(f) {
            Ok(handle) => {
                self.handles.push((name, handle));
                Ok(())
            }
            Err(source) => {
                // Do not leak the threads that did start.
                self.stop_and_join();
                Err(RuntimeError::Spawn { name, source })
            }
        }
    }

    pub fn token(&self) -> ShutdownToken {
        self.token.clone()
    }

    pub fn frame_slot(&self) -> Arc<FrameSlot> {
        Arc::clone(&self.slot)
    }

    /// Stop every thread and wait for it. Reports the first panicked thread,
    /// after all threads have been joined.
    pub fn shutdown(mut self) -> Result<Vec<WorkerStats>, RuntimeError> {
        let (stats, panicked) = self.stop_and_join();
        match panicked {
            Some(name) => Err(RuntimeError::WorkerPanicked { name }),
            None => Ok(stats),
        }
    }

    fn stop_and_join(&mut self) -> (Vec<WorkerStats>, Option<String>) {
        self.token.cancel();
        self.slot.close();
        let mut stats = Vec::with_capacity(self.handles.len());
        let mut panicked = None;
        for (name, handle) in self.handles.drain(..) {
            match handle.join() {
                Ok(s) => stats.push(s),
                Err(_) => {
                    warn!("thread '{name}' panicked");
                    panicked.get_or_insert(name);
                }
            }
        }
        info!("vision runtime stopped");
        (stats, panicked)
    }
}

impl Drop for VisionRuntime {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.stop_and_join();
        }
    }
}

fn grab_loop(
    mut sources: Vec<Box<dyn FrameSource>>,
    slot: &FrameSlot,
    bus: &dyn Bus,
    token: &ShutdownToken,
    config: &RuntimeConfig,
) -> WorkerStats {
    let mut stats = WorkerStats {
        name: "grab".to_owned(),
        ..WorkerStats::default()
    };
    let mut active = None;

    while !token.is_cancelled() {
        let requested = bus.get_number(&config.source_table, &config.source_key);
        let idx = select_source(requested, sources.len());
        let source = &mut sources[idx];
        if active != Some(idx) {
            info!("active camera: {} ({})", idx, source.name());
            active = Some(idx);
        }
        match source.grab() {
            Ok(frame) => {
                slot.publish(frame);
                stats.frames += 1;
                stats.published += 1;
            }
            Err(e) => {
                debug!("grab failed: {e}");
                stats.errors += 1;
                thread::sleep(config.grab_retry_delay);
            }
        }
    }
    stats
}

fn worker_loop(
    mut channel: Box<dyn TargetChannel>,
    slot: &FrameSlot,
    bus: &dyn Bus,
    token: &ShutdownToken,
    poll: Duration,
) -> WorkerStats {
    let mut stats = WorkerStats {
        name: channel.name().to_owned(),
        ..WorkerStats::default()
    };
    info!("{} worker started", stats.name);
    let mut seen = 0;

    while !token.is_cancelled() {
        let Some((version, frame)) = slot.wait_newer(seen, poll) else {
            continue;
        };
        seen = version;
        let report = channel.process(&frame, bus);
        stats.frames += 1;
        match report.state {
            ChannelState::Published => stats.published += 1,
            ChannelState::Reset => stats.resets += 1,
        }
        stats.errors += report.failed_writes as u64;
    }

    info!(
        "{} worker stopped after {} frame(s)",
        stats.name, stats.frames
    );
    stats
}
