use std::time::Instant;

/// A monotonic, high-resolution tick source.
pub trait TickSource {
    /// Current tick count. Never decreases.
    fn ticks(&self) -> u64;

    /// Number of ticks per second.
    fn frequency(&self) -> f64;
}

/// Nanosecond ticks from [`Instant`], counted from the creation of the clock.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a new clock starting at zero ticks.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MonotonicClock {
    fn ticks(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn frequency(&self) -> f64 {
        1e9
    }
}

/// An instantaneous frame per second (FPS) counter.
///
/// Each [`update`](FpsCounter::update) computes `frequency / (now - previous)` from the tick
/// source. The previous tick is taken when the counter is created, so the first rate is only
/// a rough estimate. When two consecutive ticks are equal the previous rate is kept.
///
/// # Examples
///
/// ```
/// use tilecv_io::fps_counter::{FpsCounter, MonotonicClock};
///
/// let mut fps_counter = FpsCounter::new(MonotonicClock::new());
///
/// for _ in 0..100 {
///    fps_counter.update();
/// }
///
/// assert!(fps_counter.fps() >= 0.0);
/// ```
#[derive(Debug)]
pub struct FpsCounter<S: TickSource = MonotonicClock> {
    source: S,
    last_tick: u64,
    frame_count: u64,
    fps: f64,
}

impl<S: TickSource> FpsCounter<S> {
    /// Creates a new `FpsCounter`, reading the first tick from `source`.
    pub fn new(source: S) -> Self {
        let last_tick = source.ticks();
        Self {
            source,
            last_tick,
            frame_count: 0,
            fps: 0.0,
        }
    }

    /// Returns the last computed FPS.
    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Returns the number of updates so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Reads the tick source and updates the FPS.
    pub fn update(&mut self) -> f64 {
        self.frame_count += 1;

        let now = self.source.ticks();
        let delta = now.saturating_sub(self.last_tick);
        if delta > 0 {
            self.fps = self.source.frequency() / delta as f64;
        }
        self.last_tick = now;

        self.fps
    }

    /// The FPS formatted as `"<fps> FPS"` with one decimal.
    pub fn label(&self) -> String {
        format!("{:.1} FPS", self.fps)
    }
}

impl Default for FpsCounter<MonotonicClock> {
    fn default() -> Self {
        Self::new(MonotonicClock::new())
    }
}
