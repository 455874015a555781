//! The preview window: the collage below the threshold sliders.

use std::time::Duration;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use tilecv::image::{Image, ImageSize};
use tilecv::pipeline::{FilterParams, ParameterSource, PipelineError, PreviewSurface};

use crate::trackbar::TrackbarPanel;

const KEY_WAIT: Duration = Duration::from_millis(1);

/// A `minifb` window showing the collage under a [`TrackbarPanel`].
pub struct PreviewWindow {
    window: Option<Window>,
    panel: TrackbarPanel,
    canvas: Image<u8, 3>,
    buffer: Vec<u32>,
}

impl PreviewWindow {
    /// Opens the window sized for a collage of `collage_size`.
    pub fn new(
        title: &str,
        collage_size: ImageSize,
        initial: FilterParams,
    ) -> Result<Self, PipelineError> {
        let panel = TrackbarPanel::canny(collage_size.width, initial);
        let canvas_size = ImageSize {
            width: collage_size.width,
            height: collage_size.height + panel.height(),
        };

        let window = Window::new(
            title,
            canvas_size.width,
            canvas_size.height,
            WindowOptions {
                resize: true,
                ..Default::default()
            },
        )
        .map_err(|e| PipelineError::Preview(e.to_string()))?;

        let mut preview = Self {
            window: Some(window),
            panel,
            canvas: Image::from_size_val(canvas_size, 0)?,
            buffer: vec![0; canvas_size.width * canvas_size.height],
        };
        // show the sliders before the first frame
        preview.present()?;

        Ok(preview)
    }

    // grow or shrink the canvas to hold `collage`
    fn fit_canvas(&mut self, collage: &Image<u8, 3>) -> Result<(), PipelineError> {
        let size = ImageSize {
            width: collage.width(),
            height: collage.height() + self.panel.height(),
        };
        if self.canvas.size() != size {
            log::debug!("preview canvas resized to {size}");
            self.canvas = Image::from_size_val(size, 0)?;
            self.buffer = vec![0; size.width * size.height];
            self.panel.set_width(size.width);
        }
        Ok(())
    }

    fn present(&mut self) -> Result<(), PipelineError> {
        self.panel.render(&mut self.canvas)?;

        for (dst, px) in self
            .buffer
            .iter_mut()
            .zip(self.canvas.as_slice().chunks_exact(3))
        {
            *dst = ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32;
        }

        let (width, height) = (self.canvas.width(), self.canvas.height());
        if let Some(window) = self.window.as_mut() {
            window
                .update_with_buffer(&self.buffer, width, height)
                .map_err(|e| PipelineError::Preview(e.to_string()))?;
        }
        Ok(())
    }

    // mouse position in canvas pixels, the window may be stretched
    fn poll_mouse(&mut self) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let Some((x, y)) = window.get_mouse_pos(MouseMode::Clamp) else {
            return;
        };
        let pressed = window.get_mouse_down(MouseButton::Left);

        let (win_w, win_h) = window.get_size();
        let sx = self.canvas.width() as f32 / win_w.max(1) as f32;
        let sy = self.canvas.height() as f32 / win_h.max(1) as f32;

        if self.panel.handle_mouse(x * sx, y * sy, pressed) {
            let params = self.panel.filter_params();
            log::debug!(
                "thresholds: {} {}",
                params.canny_lower(),
                params.canny_upper()
            );
        }
    }
}

impl ParameterSource for PreviewWindow {
    fn filter_params(&self) -> FilterParams {
        self.panel.filter_params()
    }
}

impl PreviewSurface for PreviewWindow {
    fn show(&mut self, collage: &Image<u8, 3>) -> Result<(), PipelineError> {
        self.fit_canvas(collage)?;

        let offset = self.panel.height() * self.canvas.width() * 3;
        let data = self.canvas.as_slice_mut();
        data[offset..offset + collage.as_slice().len()].copy_from_slice(collage.as_slice());

        self.present()
    }

    fn poll_key(&mut self) -> Option<char> {
        std::thread::sleep(KEY_WAIT);

        let window = self.window.as_mut()?;
        window.update();
        let quit = window
            .get_keys_pressed(KeyRepeat::No)
            .contains(&Key::Q);

        self.poll_mouse();

        quit.then_some('q')
    }

    fn is_open(&self) -> bool {
        self.window.as_ref().is_some_and(Window::is_open)
    }

    fn close(&mut self) {
        if self.window.take().is_some() {
            log::debug!("preview window closed");
        }
    }
}
