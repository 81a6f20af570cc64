// Camera collaborator seam
//
// The real capture device (and its frame encoding) lives outside this crate;
// the client only needs encoded image bytes, one frame at a time.

use std::path::{Path, PathBuf};

use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("frame capture failed: {0}")]
    Capture(#[from] std::io::Error),

    #[error("no frames found in {0}")]
    Empty(PathBuf),
}

/// Source of encoded image frames. `Ok(None)` means the source is exhausted
/// and the session should end cleanly; a capture failure is fatal to the
/// session.
pub trait Camera {
    fn capture(&mut self) -> Result<Option<Vec<u8>>, CameraError>;
}

/// Serves pre-encoded frames from a directory in sorted filename order.
///
/// Stands in for the capture device when running off-target or when
/// replaying a recorded run against a live perception server.
pub struct ReplayCamera {
    frames: Vec<PathBuf>,
    next: usize,
}

impl ReplayCamera {
    pub fn open(dir: &Path) -> Result<Self, CameraError> {
        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(CameraError::Empty(dir.to_path_buf()));
        }

        info!(count = frames.len(), dir = %dir.display(), "replay camera loaded");
        Ok(Self { frames, next: 0 })
    }
}

impl Camera for ReplayCamera {
    fn capture(&mut self) -> Result<Option<Vec<u8>>, CameraError> {
        let Some(path) = self.frames.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        Ok(Some(std::fs::read(path)?))
    }
}
