mod camera;
mod video;

pub use camera::{v4l2_camera_pipeline_description, CameraCapture, V4L2CameraConfig};
pub use video::VideoWriter;

// make sure that we do not initialize gstreamer several times
fn ensure_initialized() -> Result<(), crate::StreamError> {
    if !gstreamer::INITIALIZED.load(std::sync::atomic::Ordering::Relaxed) {
        gstreamer::init()?;
    }
    Ok(())
}
