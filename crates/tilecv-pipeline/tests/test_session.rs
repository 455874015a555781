use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tilecv_image::{Image, ImageSize};
use tilecv_io::{FrameSink, FrameSource, MemorySink, StreamError, SyntheticSource};
use tilecv_pipeline::{
    Devices, EncoderConfig, ExitReason, FilterParams, FrameLoop, LoopState, ParameterSource,
    PipelineConfig, PipelineError, PreviewSurface, RecordingError, RecordingRequest,
    RecordingTarget,
};

// what the devices saw, shared with the test after the loop returns
#[derive(Default)]
struct Log {
    opened: Cell<usize>,
    source_closed: Cell<bool>,
    ui_closed: Cell<bool>,
    shown: Cell<usize>,
    collage_size: Cell<Option<ImageSize>>,
    params_read: RefCell<Vec<FilterParams>>,
    // whether the canny tile of each shown collage had any edge pixel
    canny_edges: RefCell<Vec<bool>>,
    sink: RefCell<Option<MemorySink>>,
}

#[derive(Clone, Copy)]
enum Fault {
    EmptyFrame,
    ReadError,
}

struct TrackedSource {
    inner: SyntheticSource,
    log: Rc<Log>,
    reads: usize,
    // replaces the n-th read (1-based)
    fault: Option<(usize, Fault)>,
    step_edge: bool,
}

impl FrameSource for TrackedSource {
    fn read_frame(&mut self) -> Result<Option<Image<u8, 3>>, StreamError> {
        self.reads += 1;
        match self.fault {
            Some((n, Fault::EmptyFrame)) if n == self.reads => {
                return Ok(Some(Image::new([0, 0].into(), vec![])?));
            }
            Some((n, Fault::ReadError)) if n == self.reads => {
                return Err(StreamError::CameraOpen("device unplugged".to_string()));
            }
            _ => {}
        }

        let Some(frame) = self.inner.read_frame()? else {
            return Ok(None);
        };
        if !self.step_edge {
            return Ok(Some(frame));
        }

        // black left half, gray right half: an L1 gradient of 800 at the step
        let width = frame.width();
        let data = (0..frame.width() * frame.height())
            .flat_map(|i| if i % width < width / 2 { [0u8; 3] } else { [200u8; 3] })
            .collect();
        Ok(Some(Image::new(frame.size(), data)?))
    }

    fn close(&mut self) -> Result<(), StreamError> {
        self.log.source_closed.set(true);
        self.inner.close()
    }
}

struct HeadlessUi {
    log: Rc<Log>,
    params: FilterParams,
    // per-cycle slider positions, the last one sticks
    schedule: Vec<FilterParams>,
    // key pressed after the n-th shown frame
    quit_after: Option<usize>,
}

impl ParameterSource for HeadlessUi {
    fn filter_params(&self) -> FilterParams {
        let cycle = self.log.shown.get();
        let params = match self.schedule.get(cycle).or(self.schedule.last()) {
            Some(params) => *params,
            None => self.params,
        };
        self.log.params_read.borrow_mut().push(params);
        params
    }
}

impl PreviewSurface for HeadlessUi {
    fn show(&mut self, collage: &Image<u8, 3>) -> Result<(), PipelineError> {
        self.log.shown.set(self.log.shown.get() + 1);
        self.log.collage_size.set(Some(collage.size()));
        self.log.canny_edges.borrow_mut().push(canny_tile_has_edges(collage));
        Ok(())
    }

    fn poll_key(&mut self) -> Option<char> {
        match self.quit_after {
            Some(n) if n == self.log.shown.get() => Some('q'),
            _ => Some('x'),
        }
    }

    fn close(&mut self) {
        self.log.ui_closed.set(true);
    }
}

// the canny tile is the last of the 3x4 grid; only its upper half is checked, clear of the label
fn canny_tile_has_edges(collage: &Image<u8, 3>) -> bool {
    let (tile_w, tile_h) = (collage.width() / 3, collage.height() / 4);
    (3 * tile_h..3 * tile_h + tile_h / 2).any(|y| {
        (2 * tile_w..3 * tile_w).any(|x| collage.get_pixel(x, y, 0).is_ok_and(|v| v > 0))
    })
}

struct SharedSink {
    log: Rc<Log>,
}

impl FrameSink for SharedSink {
    fn frame_size(&self) -> ImageSize {
        self.log
            .sink
            .borrow()
            .as_ref()
            .map(|sink| sink.frame_size())
            .unwrap_or(ImageSize {
                width: 0,
                height: 0,
            })
    }

    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), StreamError> {
        match self.log.sink.borrow_mut().as_mut() {
            Some(sink) => sink.write(frame),
            None => Err(StreamError::SinkClosed),
        }
    }

    fn close(&mut self) -> Result<(), StreamError> {
        match self.log.sink.borrow_mut().as_mut() {
            Some(sink) => sink.close(),
            None => Ok(()),
        }
    }
}

struct TestDevices {
    log: Rc<Log>,
    num_frames: usize,
    quit_after: Option<usize>,
    fault: Option<(usize, Fault)>,
    step_edge: bool,
    schedule: Vec<FilterParams>,
    fail_ui: bool,
    fail_writer: bool,
}

impl TestDevices {
    fn new(num_frames: usize) -> Self {
        Self {
            log: Rc::new(Log::default()),
            num_frames,
            quit_after: None,
            fault: None,
            step_edge: false,
            schedule: Vec::new(),
            fail_ui: false,
            fail_writer: false,
        }
    }
}

impl Devices for TestDevices {
    type Source = TrackedSource;
    type Ui = HeadlessUi;
    type Writer = SharedSink;

    fn open_source(&mut self, size: ImageSize) -> Result<Self::Source, PipelineError> {
        self.log.opened.set(self.log.opened.get() + 1);
        Ok(TrackedSource {
            inner: SyntheticSource::new(size, self.num_frames).with_color([200, 40, 90]),
            log: self.log.clone(),
            reads: 0,
            fault: self.fault,
            step_edge: self.step_edge,
        })
    }

    fn open_ui(&mut self, initial: FilterParams) -> Result<Self::Ui, PipelineError> {
        if self.fail_ui {
            return Err(PipelineError::Preview("no display".to_string()));
        }
        self.log.opened.set(self.log.opened.get() + 1);
        Ok(HeadlessUi {
            log: self.log.clone(),
            params: initial,
            schedule: self.schedule.clone(),
            quit_after: self.quit_after,
        })
    }

    fn open_writer(&mut self, target: &RecordingTarget) -> Result<Self::Writer, PipelineError> {
        if self.fail_writer {
            return Err(StreamError::InvalidConfig("no encoder".to_string()).into());
        }
        self.log.opened.set(self.log.opened.get() + 1);
        // an encoder creates its file when it starts
        std::fs::File::create(&target.path).map_err(|e| StreamError::InvalidConfig(e.to_string()))?;
        *self.log.sink.borrow_mut() = Some(MemorySink::new(
            target.encoder.frame_size,
            target.encoder.fps,
        ));
        Ok(SharedSink {
            log: self.log.clone(),
        })
    }
}

#[test]
fn records_synthetic_stream() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let request = RecordingRequest::new(Some(tmp.path().to_path_buf()), Some("out.mp4".into()));
    let target = request.resolve(EncoderConfig::default())?;

    let mut devices = TestDevices::new(10);
    let mut frame_loop = FrameLoop::new(PipelineConfig::default())?;
    let summary = frame_loop.run(&mut devices, target.as_ref())?;

    assert_eq!(summary.frames, 10);
    assert_eq!(summary.reason, ExitReason::EndOfStream);
    assert_eq!(frame_loop.state(), LoopState::Exit(ExitReason::EndOfStream));

    // 12 tiles of 840x480 in a 3x4 grid, scaled by 0.35
    assert_eq!(devices.log.shown.get(), 10);
    assert_eq!(devices.log.collage_size.get(), Some([882, 672].into()));

    let sink = devices.log.sink.borrow();
    let Some(sink) = sink.as_ref() else {
        panic!("the writer was not opened");
    };
    assert_eq!(sink.frames().len(), 10);
    assert_eq!(sink.fps(), 20.0);
    assert!(sink.frames().iter().all(|f| f.size() == [840, 480].into()));
    assert!(sink.is_closed());

    assert!(devices.log.source_closed.get());
    assert!(devices.log.ui_closed.get());

    // same target again: rejected before any device is opened
    let opened = devices.log.opened.get();
    let again = request.resolve(EncoderConfig::default());
    assert!(matches!(again, Err(RecordingError::FileExists(_))));
    assert_eq!(devices.log.opened.get(), opened);

    Ok(())
}

#[test]
fn quit_key_stops_the_loop() -> Result<(), Box<dyn std::error::Error>> {
    let mut devices = TestDevices::new(100);
    devices.quit_after = Some(3);

    let mut frame_loop = FrameLoop::new(PipelineConfig {
        capture_size: [64, 48].into(),
        ..Default::default()
    })?;
    let summary = frame_loop.run(&mut devices, None)?;

    assert_eq!(summary.frames, 3);
    assert_eq!(summary.reason, ExitReason::QuitKey);
    assert!(devices.log.sink.borrow().is_none());
    assert!(devices.log.source_closed.get());
    assert!(devices.log.ui_closed.get());
    Ok(())
}

#[test]
fn cancel_token_stops_the_loop() -> Result<(), Box<dyn std::error::Error>> {
    let token = Arc::new(AtomicBool::new(false));
    token.store(true, Ordering::SeqCst);

    let mut devices = TestDevices::new(100);
    let mut frame_loop = FrameLoop::new(PipelineConfig {
        capture_size: [32, 32].into(),
        ..Default::default()
    })?
    .with_cancel_token(token);

    let summary = frame_loop.run(&mut devices, None)?;
    assert_eq!(summary.frames, 1);
    assert_eq!(summary.reason, ExitReason::Cancelled);
    Ok(())
}

#[test]
fn empty_stream_still_cleans_up() -> Result<(), Box<dyn std::error::Error>> {
    let mut devices = TestDevices::new(0);
    let mut frame_loop = FrameLoop::new(PipelineConfig::default())?;

    let summary = frame_loop.run(&mut devices, None)?;
    assert_eq!(summary.frames, 0);
    assert_eq!(summary.reason, ExitReason::EndOfStream);
    assert_eq!(devices.log.shown.get(), 0);
    assert!(devices.log.source_closed.get());
    assert!(devices.log.ui_closed.get());
    Ok(())
}

#[test]
fn failed_init_releases_opened_devices() -> Result<(), Box<dyn std::error::Error>> {
    let mut devices = TestDevices::new(5);
    devices.fail_ui = true;
    let mut frame_loop = FrameLoop::new(PipelineConfig::default())?;

    assert!(matches!(
        frame_loop.run(&mut devices, None),
        Err(PipelineError::Preview(_))
    ));
    assert_eq!(frame_loop.state(), LoopState::Failed);
    assert!(devices.log.source_closed.get());

    let tmp = tempfile::tempdir()?;
    let target = RecordingTarget {
        path: tmp.path().join("out.mp4"),
        encoder: EncoderConfig::default(),
    };
    let mut devices = TestDevices::new(5);
    devices.fail_writer = true;

    assert!(matches!(
        frame_loop.run(&mut devices, Some(&target)),
        Err(PipelineError::Stream(StreamError::InvalidConfig(_)))
    ));
    assert!(devices.log.source_closed.get());
    assert!(devices.log.ui_closed.get());
    assert_eq!(devices.log.shown.get(), 0);
    Ok(())
}

#[test]
fn empty_frame_ends_the_stream() -> Result<(), Box<dyn std::error::Error>> {
    let mut devices = TestDevices::new(10);
    devices.fault = Some((3, Fault::EmptyFrame));
    let mut frame_loop = FrameLoop::new(PipelineConfig {
        capture_size: [64, 48].into(),
        ..Default::default()
    })?;

    let summary = frame_loop.run(&mut devices, None)?;
    assert_eq!(summary.frames, 2);
    assert_eq!(summary.reason, ExitReason::EndOfStream);
    assert_eq!(frame_loop.state(), LoopState::Exit(ExitReason::EndOfStream));
    assert_eq!(devices.log.shown.get(), 2);
    assert!(devices.log.source_closed.get());
    assert!(devices.log.ui_closed.get());
    Ok(())
}

#[test]
fn read_error_ends_the_stream() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let target = RecordingTarget {
        path: tmp.path().join("out.mp4"),
        encoder: EncoderConfig::default(),
    };

    let mut devices = TestDevices::new(10);
    devices.fault = Some((3, Fault::ReadError));
    let mut frame_loop = FrameLoop::new(PipelineConfig {
        capture_size: [64, 48].into(),
        ..Default::default()
    })?;

    let summary = frame_loop.run(&mut devices, Some(&target))?;
    assert_eq!(summary.frames, 2);
    assert_eq!(summary.reason, ExitReason::EndOfStream);
    assert_eq!(frame_loop.state(), LoopState::Exit(ExitReason::EndOfStream));
    assert!(devices.log.source_closed.get());
    assert!(devices.log.ui_closed.get());

    let sink = devices.log.sink.borrow();
    let Some(sink) = sink.as_ref() else {
        panic!("the writer was not opened");
    };
    assert_eq!(sink.frames().len(), 2);
    assert!(sink.is_closed());
    Ok(())
}

#[test]
fn slider_changes_reach_canny_in_the_same_cycle() -> Result<(), Box<dyn std::error::Error>> {
    let strict = FilterParams::new(1000, 1000);
    let schedule = vec![FilterParams::default(), strict, FilterParams::default()];

    let mut devices = TestDevices::new(3);
    devices.step_edge = true;
    devices.schedule = schedule.clone();
    let mut frame_loop = FrameLoop::new(PipelineConfig::default())?;

    let summary = frame_loop.run(&mut devices, None)?;
    assert_eq!(summary.frames, 3);

    // read once per cycle, in order
    assert_eq!(*devices.log.params_read.borrow(), schedule);
    // the step gradient of 800 passes 50/150 but not 1000/1000
    assert_eq!(*devices.log.canny_edges.borrow(), vec![true, false, true]);
    Ok(())
}
