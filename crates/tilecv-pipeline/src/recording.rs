use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::EncoderConfig;
use crate::error::RecordingError;

/// The output video options as given on the command line.
///
/// Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingRequest {
    /// Directory of the video. Created if missing.
    pub save_video_path: Option<PathBuf>,
    /// File name of the video, ending in `.mp4`.
    pub name: Option<String>,
}

/// A validated output video: a path that does not exist yet, and the encoder settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingTarget {
    /// Path of the video file.
    pub path: PathBuf,
    /// Frame rate and frame size of the video.
    pub encoder: EncoderConfig,
}

impl RecordingRequest {
    /// Creates a request from the optional directory and file name.
    pub fn new(save_video_path: Option<PathBuf>, name: Option<String>) -> Self {
        Self {
            save_video_path: save_video_path.filter(|p| !p.as_os_str().is_empty()),
            name: name.filter(|n| !n.is_empty()),
        }
    }

    /// Returns true if either option is set.
    pub fn is_requested(&self) -> bool {
        self.save_video_path.is_some() || self.name.is_some()
    }

    /// Resolves the request against the current time. See [`RecordingRequest::resolve_at`].
    pub fn resolve(
        &self,
        encoder: EncoderConfig,
    ) -> Result<Option<RecordingTarget>, RecordingError> {
        let now_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.resolve_at(now_secs, encoder)
    }

    /// Resolves the request into a target, or `None` if no recording was asked for.
    ///
    /// A directory without a name records to `<now_secs>.mp4` in it; the directory tree is
    /// created if missing. A name without a directory resolves against `./`. An existing
    /// target is rejected before the extension is checked.
    ///
    /// # Errors
    ///
    /// * [`RecordingError::DirectoryCreation`] if the directory cannot be created.
    /// * [`RecordingError::FileExists`] if the target already exists.
    /// * [`RecordingError::InvalidExtension`] if the name does not end with `.mp4`,
    ///   case-insensitive.
    pub fn resolve_at(
        &self,
        now_secs: u64,
        encoder: EncoderConfig,
    ) -> Result<Option<RecordingTarget>, RecordingError> {
        let mut name = self.name.clone();

        if let Some(dir) = &self.save_video_path {
            if name.is_none() {
                name = Some(format!("{now_secs}.mp4"));
            }
            if !dir.is_dir() {
                std::fs::create_dir_all(dir).map_err(|source| {
                    RecordingError::DirectoryCreation {
                        path: dir.clone(),
                        source,
                    }
                })?;
                log::info!("created the output directory {}", dir.display());
            }
        }

        let Some(name) = name else {
            return Ok(None);
        };

        let dir = self
            .save_video_path
            .as_deref()
            .unwrap_or_else(|| Path::new("./"));
        let path = dir.join(&name);

        if path.exists() {
            return Err(RecordingError::FileExists(path));
        }
        if !has_mp4_extension(&name) {
            return Err(RecordingError::InvalidExtension(name));
        }

        Ok(Some(RecordingTarget { path, encoder }))
    }
}

fn has_mp4_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".mp4")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(dir: Option<&Path>, name: Option<&str>) -> RecordingRequest {
        RecordingRequest::new(dir.map(Path::to_path_buf), name.map(str::to_string))
    }

    #[test]
    fn test_not_requested() -> Result<(), RecordingError> {
        let req = request(None, Some(""));
        assert!(!req.is_requested());
        assert_eq!(req.resolve(EncoderConfig::default())?, None);
        Ok(())
    }

    #[test]
    fn test_dir_only_synthesizes_name() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let dir = tmp.path().join("a").join("b");

        let target =
            request(Some(dir.as_path()), None).resolve_at(1_700_000_000, EncoderConfig::default())?;

        assert!(dir.is_dir());
        assert_eq!(target.map(|t| t.path), Some(dir.join("1700000000.mp4")));
        Ok(())
    }

    #[test]
    fn test_extension_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;

        let target =
            request(Some(tmp.path()), Some("clip.MP4")).resolve(EncoderConfig::default())?;
        assert_eq!(target.map(|t| t.path), Some(tmp.path().join("clip.MP4")));

        let res = request(Some(tmp.path()), Some("clip.mov")).resolve(EncoderConfig::default());
        assert!(matches!(res, Err(RecordingError::InvalidExtension(name)) if name == "clip.mov"));
        Ok(())
    }

    #[test]
    fn test_existing_target_checked_first() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        std::fs::write(tmp.path().join("clip.mov"), b"")?;
        std::fs::write(tmp.path().join("clip.mp4"), b"")?;

        for name in ["clip.mov", "clip.mp4"] {
            let expected = tmp.path().join(name);
            let res = request(Some(tmp.path()), Some(name)).resolve(EncoderConfig::default());
            assert!(
                matches!(&res, Err(RecordingError::FileExists(path)) if path == &expected),
                "{name}: {res:?}"
            );
        }
        Ok(())
    }

    #[test]
    fn test_name_only_resolves_in_cwd() -> Result<(), RecordingError> {
        let target =
            request(None, Some("tilecv-test-missing.mp4")).resolve(EncoderConfig::default())?;
        assert_eq!(
            target.map(|t| t.path),
            Some(Path::new("./").join("tilecv-test-missing.mp4"))
        );
        Ok(())
    }

    #[test]
    fn test_directory_creation_fails() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let file = tmp.path().join("file");
        std::fs::write(&file, b"")?;

        let res = request(Some(file.join("sub").as_path()), None).resolve(EncoderConfig::default());
        assert!(matches!(res, Err(RecordingError::DirectoryCreation { .. })));
        Ok(())
    }
}
