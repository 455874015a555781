use tilecv_image::ImageSize;

/// Upper bound of the edge detection thresholds.
pub const MAX_THRESHOLD: u32 = 1000;

/// The live parameters of the edge detector.
///
/// Both thresholds are clamped to `[0, MAX_THRESHOLD]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParams {
    canny_lower: u32,
    canny_upper: u32,
}

impl FilterParams {
    /// Creates the parameters, clamping both thresholds.
    ///
    /// # Examples
    ///
    /// ```
    /// use tilecv_pipeline::FilterParams;
    ///
    /// let params = FilterParams::new(20, 5000);
    /// assert_eq!(params.canny_lower(), 20);
    /// assert_eq!(params.canny_upper(), 1000);
    /// ```
    pub fn new(canny_lower: u32, canny_upper: u32) -> Self {
        Self {
            canny_lower: canny_lower.min(MAX_THRESHOLD),
            canny_upper: canny_upper.min(MAX_THRESHOLD),
        }
    }

    /// The low hysteresis threshold.
    pub fn canny_lower(&self) -> u32 {
        self.canny_lower
    }

    /// The high hysteresis threshold.
    pub fn canny_upper(&self) -> u32 {
        self.canny_upper
    }
}

impl Default for FilterParams {
    fn default() -> Self {
        Self::new(50, 150)
    }
}

/// Grid layout of the collage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollageLayout {
    /// Tiles per row.
    pub cols: usize,
    /// Uniform scale applied to the assembled grid.
    pub scale: f32,
}

impl Default for CollageLayout {
    fn default() -> Self {
        Self {
            cols: 3,
            scale: 0.35,
        }
    }
}

/// Settings of the video encoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderConfig {
    /// Frames per second of the output stream.
    pub fps: f64,
    /// The size of every encoded frame.
    pub frame_size: ImageSize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            fps: 20.0,
            frame_size: ImageSize {
                width: 840,
                height: 480,
            },
        }
    }
}

/// Configuration of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// The frame size requested from the capture device.
    pub capture_size: ImageSize,
    /// The collage layout.
    pub layout: CollageLayout,
    /// The encoder settings, used when recording.
    pub encoder: EncoderConfig,
    /// The initial edge detection thresholds.
    pub filter_params: FilterParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capture_size: ImageSize {
                width: 840,
                height: 480,
            },
            layout: CollageLayout::default(),
            encoder: EncoderConfig::default(),
            filter_params: FilterParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.capture_size, [840, 480].into());
        assert_eq!(config.layout.cols, 3);
        assert_eq!(config.layout.scale, 0.35);
        assert_eq!(config.encoder.fps, 20.0);
        assert_eq!(config.encoder.frame_size, [840, 480].into());
        assert_eq!(config.filter_params, FilterParams::new(50, 150));
    }

    #[test]
    fn test_filter_params_clamped() {
        let params = FilterParams::new(1001, u32::MAX);
        assert_eq!(params.canny_lower(), MAX_THRESHOLD);
        assert_eq!(params.canny_upper(), MAX_THRESHOLD);
    }
}
