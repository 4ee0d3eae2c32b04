mod file_source;

pub use file_source::FileFrameSource;

use crate::error::CaptureError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// An encoded frame handed over by the camera.
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

impl CapturedFrame {
    pub fn new(width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            width,
            height,
            bytes,
            captured_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Camera-side collaborator of the detection loop.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Whether a capture can be attempted right now.
    fn is_available(&self) -> bool {
        true
    }

    /// Captures one encoded frame at `quality` (0.0 to 1.0).
    ///
    /// `Ok(None)` means nothing was captured and is not an error.
    async fn capture_frame(&self, quality: f32) -> Result<Option<CapturedFrame>, CaptureError>;
}
