use tilecv_image::{Image, ImageError};
use tilecv_imgproc::draw::{draw_text, TextStyle};
use tilecv_io::{FpsCounter, MonotonicClock, TickSource};

use crate::frame::{Frame, NamedFrameSet, TransformKind};

// bottom-left corners of the texts
const FPS_ORIGIN: (i64, i64) = (10, 70);
const LABEL_ORIGIN: (i64, i64) = (80, 450);

const FPS_STYLE: TextStyle<3> = TextStyle {
    color: [0, 255, 100],
    scale: 2.0,
    thickness: 3,
    anti_aliased: true,
};

const LABEL_STYLE: TextStyle<3> = TextStyle {
    color: [0, 255, 255],
    scale: 1.0,
    thickness: 2,
    anti_aliased: true,
};

/// Burns the frame rate and the transform names onto the tiles.
///
/// The only state carried across frames is the tick of the previous
/// [`annotate`](MetricsOverlay::annotate) call, held by the [`FpsCounter`].
#[derive(Debug)]
pub struct MetricsOverlay<S: TickSource = MonotonicClock> {
    fps_counter: FpsCounter<S>,
}

impl MetricsOverlay<MonotonicClock> {
    /// Creates an overlay timed by the monotonic clock, starting now.
    pub fn new() -> Self {
        Self::with_tick_source(MonotonicClock::new())
    }
}

impl Default for MetricsOverlay<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TickSource> MetricsOverlay<S> {
    /// Creates an overlay timed by `source`. The first tick is read immediately.
    pub fn with_tick_source(source: S) -> Self {
        Self {
            fps_counter: FpsCounter::new(source),
        }
    }

    /// The last measured frame rate.
    pub fn fps(&self) -> f64 {
        self.fps_counter.fps()
    }

    /// Updates the frame rate and annotates the set in place.
    ///
    /// The rate goes on the `original` tile only, then every tile gets its own name near
    /// the bottom. Returns the updated rate.
    pub fn annotate(&mut self, frames: &mut NamedFrameSet) -> Result<f64, ImageError> {
        let fps = self.fps_counter.update();
        let fps_text = self.fps_counter.label();

        if let Some(original) = frames.get_mut(TransformKind::Original) {
            put_text(original, &fps_text, FPS_ORIGIN, &FPS_STYLE)?;
        }

        for named in frames.iter_mut() {
            put_text(&mut named.frame, named.kind.name(), LABEL_ORIGIN, &LABEL_STYLE)?;
        }

        Ok(fps)
    }
}

// gray frames are drawn with the blue component of the style color
fn put_text(
    frame: &mut Frame,
    text: &str,
    origin: (i64, i64),
    style: &TextStyle<3>,
) -> Result<(), ImageError> {
    match frame {
        Frame::Color(img) => draw_text(img, text, origin, style),
        Frame::Gray(img) => draw_gray_text(img, text, origin, style),
    }
}

fn draw_gray_text(
    img: &mut Image<u8, 1>,
    text: &str,
    origin: (i64, i64),
    style: &TextStyle<3>,
) -> Result<(), ImageError> {
    let gray_style = TextStyle {
        color: [style.color[2]],
        scale: style.scale,
        thickness: style.thickness,
        anti_aliased: style.anti_aliased,
    };
    draw_text(img, text, origin, &gray_style)
}
