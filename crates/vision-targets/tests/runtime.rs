use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use vision_targets::bus::{
    Bus, MemoryBus, CARGO_TABLE, CARGO_X_KEY, CONTOUR_LEFT_KEY, SOURCE_KEY, TARGETS_TABLE,
    VISION_TABLE,
};
use vision_targets::runtime::SourceError;
use vision_targets::{
    CargoChannel, CargoDetector, Contour, Frame, FrameSource, HatchChannel, HatchDetector,
    PixelFormat, RuntimeConfig, RuntimeError, TargetChannel, VisionRuntime,
};

/// Emits frames whose single pixel is `id`, or fails every other grab.
struct FakeCamera {
    id: u8,
    flaky: bool,
    grabs: Arc<AtomicUsize>,
}

impl FakeCamera {
    fn new(id: u8) -> Self {
        Self {
            id,
            flaky: false,
            grabs: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FrameSource for FakeCamera {
    fn name(&self) -> &str {
        "fake"
    }

    fn grab(&mut self) -> Result<Frame, SourceError> {
        let n = self.grabs.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(2));
        if self.flaky && n % 2 == 1 {
            return Err(SourceError::Timeout {
                name: "fake".into(),
            });
        }
        Ok(Frame::new(1, 1, PixelFormat::Gray8, vec![self.id]).expect("frame"))
    }
}

/// One cargo ball whose x coordinate is the frame's pixel value.
fn ball_at_pixel(frame: &Frame) -> Vec<Contour> {
    let x = frame.data()[0] as f32 * 10.0 + 10.0;
    vec![Contour::from_xy(&[(x - 1.0, 10.0), (x + 1.0, 10.0), (x, 12.0)]).expect("contour")]
}

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

fn fast_config() -> RuntimeConfig {
    RuntimeConfig {
        worker_poll: Duration::from_millis(10),
        grab_retry_delay: Duration::from_millis(1),
        ..RuntimeConfig::default()
    }
}

#[test]
fn start_requires_sources_and_channels() {
    let bus: Arc<dyn Bus> = Arc::new(MemoryBus::new());
    let channels: Vec<Box<dyn TargetChannel>> = vec![Box::new(CargoChannel::new(
        ball_at_pixel,
        CargoDetector::default(),
    ))];
    let err = VisionRuntime::start(vec![], channels, Arc::clone(&bus), fast_config())
        .err()
        .expect("no sources");
    assert!(matches!(err, RuntimeError::NoSources));

    let err = VisionRuntime::start(
        vec![Box::new(FakeCamera::new(0))],
        vec![],
        bus,
        fast_config(),
    )
    .err()
    .expect("no channels");
    assert!(matches!(err, RuntimeError::NoChannels));
}

#[test]
fn workers_publish_until_shutdown() {
    let bus = Arc::new(MemoryBus::new());
    let channels: Vec<Box<dyn TargetChannel>> = vec![
        Box::new(CargoChannel::new(ball_at_pixel, CargoDetector::default())),
        Box::new(HatchChannel::new(
            |_: &Frame| Vec::<Contour>::new(),
            HatchDetector::default(),
        )),
    ];
    let mut cam = FakeCamera::new(0);
    cam.flaky = true;
    let grabs = Arc::clone(&cam.grabs);

    let runtime = VisionRuntime::start(
        vec![Box::new(cam)],
        channels,
        Arc::clone(&bus) as Arc<dyn Bus>,
        fast_config(),
    )
    .expect("start");

    assert!(wait_for(|| {
        grabs.load(Ordering::SeqCst) >= 4
            && bus.get_number_array(CARGO_TABLE, CARGO_X_KEY).is_some()
            && bus.get_number_array(TARGETS_TABLE, CONTOUR_LEFT_KEY).is_some()
    }));
    assert_eq!(
        bus.get_number_array(TARGETS_TABLE, CONTOUR_LEFT_KEY),
        Some(vec![0.0; 6])
    );

    let slot = runtime.frame_slot();
    let stats = runtime.shutdown().expect("clean shutdown");
    assert!(slot.is_closed());
    assert_eq!(stats.len(), 3);

    let grab = stats.iter().find(|s| s.name == "grab").expect("grab stats");
    assert!(grab.frames > 0);
    assert!(grab.errors > 0);
    let cargo = stats.iter().find(|s| s.name == "cargo").expect("cargo stats");
    assert!(cargo.published > 0);
    assert!(cargo.frames <= grab.frames);
    let hatch = stats.iter().find(|s| s.name == "hatch").expect("hatch stats");
    assert_eq!(hatch.published, 0);
    assert!(hatch.resets > 0);
}

#[test]
fn source_entry_switches_camera() {
    let bus = Arc::new(MemoryBus::new());
    let channels: Vec<Box<dyn TargetChannel>> = vec![Box::new(CargoChannel::new(
        ball_at_pixel,
        CargoDetector::default(),
    ))];
    let sources: Vec<Box<dyn FrameSource>> =
        vec![Box::new(FakeCamera::new(0)), Box::new(FakeCamera::new(1))];

    let runtime = VisionRuntime::start(
        sources,
        channels,
        Arc::clone(&bus) as Arc<dyn Bus>,
        fast_config(),
    )
    .expect("start");

    let x_is = |want: f64| {
        bus.get_number_array(CARGO_TABLE, CARGO_X_KEY)
            .is_some_and(|x| x.len() == 1 && (x[0] - want).abs() < 1e-3)
    };
    assert!(wait_for(|| x_is(10.0)));

    bus.set_number(VISION_TABLE, SOURCE_KEY, 1.0).unwrap();
    assert!(wait_for(|| x_is(20.0)));

    // Out-of-range selectors wrap.
    bus.set_number(VISION_TABLE, SOURCE_KEY, 2.0).unwrap();
    assert!(wait_for(|| x_is(10.0)));

    runtime.shutdown().expect("clean shutdown");
}

#[test]
fn token_cancel_stops_threads() {
    let bus: Arc<dyn Bus> = Arc::new(MemoryBus::new());
    let channels: Vec<Box<dyn TargetChannel>> = vec![Box::new(CargoChannel::new(
        ball_at_pixel,
        CargoDetector::default(),
    ))];
    let runtime =
        VisionRuntime::start(vec![Box::new(FakeCamera::new(0))], channels, bus, fast_config())
            .expect("start");
    let token = runtime.token();
    token.cancel();
    assert!(token.is_cancelled());
    let stats = runtime.shutdown().expect("clean shutdown");
    assert_eq!(stats.len(), 2);
}
