use std::path::PathBuf;

use clap::Parser;
use tilecv::pipeline::RecordingRequest;

/// Show a live collage of image filters applied to the camera stream.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Directory to save the video into, created if missing
    #[arg(long = "save_video_path")]
    pub save_video_path: Option<PathBuf>,

    /// Video file name, must end with .mp4
    #[arg(long)]
    pub name: Option<String>,

    /// The camera id to use, /dev/video<id>
    #[arg(short, long = "camera_id", default_value_t = 0)]
    pub camera_id: u32,

    /// Replace the camera with this many solid-color frames
    #[arg(long)]
    pub synthetic: Option<usize>,
}

impl Args {
    /// The recording options of the command line.
    pub fn recording_request(&self) -> RecordingRequest {
        RecordingRequest::new(self.save_video_path.clone(), self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() -> Result<(), clap::Error> {
        let args = Args::try_parse_from(["filter_collage"])?;
        assert_eq!(args.camera_id, 0);
        assert!(args.synthetic.is_none());
        assert!(!args.recording_request().is_requested());
        Ok(())
    }

    #[test]
    fn test_recording_flags() -> Result<(), clap::Error> {
        let args = Args::try_parse_from([
            "filter_collage",
            "--save_video_path",
            "videos",
            "--name",
            "demo.mp4",
            "-c",
            "2",
        ])?;
        assert_eq!(args.camera_id, 2);

        let request = args.recording_request();
        assert_eq!(request.save_video_path, Some(PathBuf::from("videos")));
        assert_eq!(request.name.as_deref(), Some("demo.mp4"));
        Ok(())
    }

    #[test]
    fn test_empty_name_is_absent() -> Result<(), clap::Error> {
        let args = Args::try_parse_from(["filter_collage", "--name", ""])?;
        assert!(!args.recording_request().is_requested());
        Ok(())
    }
}
