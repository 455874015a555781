//! Sliders drawn above the collage, driven by the mouse.

use tilecv::image::{Image, ImageError};
use tilecv::imgproc::draw::{draw_filled_rect, draw_text, TextStyle};
use tilecv::pipeline::{config::MAX_THRESHOLD, FilterParams, ParameterSource};

/// Height in pixels of one slider row.
pub const ROW_HEIGHT: usize = 32;

// horizontal layout of a row
const TRACK_START: usize = 210;
const TRACK_MARGIN: usize = 16;
const KNOB_HALF_WIDTH: i64 = 5;

const BACKGROUND: [u8; 3] = [40, 40, 40];
const TRACK: [u8; 3] = [110, 110, 110];
const FILL: [u8; 3] = [0, 170, 255];
const KNOB: [u8; 3] = [235, 235, 235];

const LABEL_STYLE: TextStyle<3> = TextStyle {
    color: [235, 235, 235],
    scale: 0.5,
    thickness: 1,
    anti_aliased: true,
};

/// A named integer slider in `[0, max]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trackbar {
    name: &'static str,
    value: u32,
    max: u32,
}

impl Trackbar {
    /// Creates a slider; `value` is clamped to `max`.
    pub fn new(name: &'static str, value: u32, max: u32) -> Self {
        Self {
            name,
            value: value.min(max),
            max,
        }
    }

    /// The name shown next to the slider.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The current value.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Sets the value, clamped to the range. Returns true if it changed.
    pub fn set_value(&mut self, value: u32) -> bool {
        let value = value.min(self.max);
        let changed = value != self.value;
        self.value = value;
        changed
    }
}

/// A stack of sliders rendered as the top rows of the preview.
#[derive(Debug, Clone)]
pub struct TrackbarPanel {
    bars: Vec<Trackbar>,
    width: usize,
    dragging: Option<usize>,
    was_pressed: bool,
}

impl TrackbarPanel {
    /// Creates a panel `width` pixels wide.
    pub fn new(width: usize, bars: Vec<Trackbar>) -> Self {
        Self {
            bars,
            width,
            dragging: None,
            was_pressed: false,
        }
    }

    /// The two edge threshold sliders.
    pub fn canny(width: usize, initial: FilterParams) -> Self {
        Self::new(
            width,
            vec![
                Trackbar::new("canny_lower", initial.canny_lower(), MAX_THRESHOLD),
                Trackbar::new("canny_upper", initial.canny_upper(), MAX_THRESHOLD),
            ],
        )
    }

    /// The sliders, top to bottom.
    pub fn bars(&self) -> &[Trackbar] {
        &self.bars
    }

    /// Height of the panel in pixels.
    pub fn height(&self) -> usize {
        self.bars.len() * ROW_HEIGHT
    }

    /// Width of the panel in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Follows the width of the canvas.
    pub fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    // pixel span of the track, end exclusive
    fn track(&self) -> (usize, usize) {
        let end = self.width.saturating_sub(TRACK_MARGIN).max(TRACK_START + 1);
        (TRACK_START, end)
    }

    fn knob_x(&self, bar: &Trackbar) -> i64 {
        let (start, end) = self.track();
        let span = (end - start - 1) as f64;
        let ratio = if bar.max == 0 {
            0.0
        } else {
            bar.value as f64 / bar.max as f64
        };
        start as i64 + (ratio * span).round() as i64
    }

    fn value_at(&self, bar: &Trackbar, x: f32) -> u32 {
        let (start, end) = self.track();
        let span = (end - start - 1) as f32;
        let ratio = ((x - start as f32) / span).clamp(0.0, 1.0);
        (ratio * bar.max as f32).round() as u32
    }

    /// Updates the sliders from the mouse state, in canvas coordinates.
    ///
    /// A press on a row grabs its slider until the button is released. Returns true if a
    /// value changed.
    pub fn handle_mouse(&mut self, x: f32, y: f32, pressed: bool) -> bool {
        let just_pressed = pressed && !self.was_pressed;
        self.was_pressed = pressed;

        if !pressed {
            self.dragging = None;
            return false;
        }

        if just_pressed {
            let row = y.floor() as i64 / ROW_HEIGHT as i64;
            let on_track = x >= TRACK_START as f32 - KNOB_HALF_WIDTH as f32;
            if y >= 0.0 && on_track && (row as usize) < self.bars.len() {
                self.dragging = Some(row as usize);
            }
        }

        let Some(index) = self.dragging else {
            return false;
        };

        let value = self.value_at(&self.bars[index], x);
        self.bars[index].set_value(value)
    }

    /// Draws the panel over the top rows of `canvas`.
    pub fn render(&self, canvas: &mut Image<u8, 3>) -> Result<(), ImageError> {
        let width = self.width as i64;

        for (i, bar) in self.bars.iter().enumerate() {
            let top = (i * ROW_HEIGHT) as i64;
            let mid = top + ROW_HEIGHT as i64 / 2;

            draw_filled_rect(canvas, (0, top), (width, top + ROW_HEIGHT as i64), BACKGROUND);

            let label = format!("{}: {}", bar.name, bar.value);
            draw_text(canvas, &label, (10, mid + 7), &LABEL_STYLE)?;

            let (start, end) = self.track();
            let knob = self.knob_x(bar);
            draw_filled_rect(canvas, (start as i64, mid - 2), (end as i64, mid + 2), TRACK);
            draw_filled_rect(canvas, (start as i64, mid - 2), (knob, mid + 2), FILL);
            draw_filled_rect(
                canvas,
                (knob - KNOB_HALF_WIDTH, mid - 9),
                (knob + KNOB_HALF_WIDTH + 1, mid + 10),
                KNOB,
            );
        }

        Ok(())
    }
}

impl ParameterSource for TrackbarPanel {
    fn filter_params(&self) -> FilterParams {
        let value = |i: usize| self.bars.get(i).map(Trackbar::value).unwrap_or(0);
        FilterParams::new(value(0), value(1))
    }
}
