use super::{CapturedFrame, FrameSource};
use crate::error::CaptureError;
use async_trait::async_trait;
use image::ImageReader;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Replays pre-encoded image files as camera frames, in name order, looping.
///
/// Files are sent as-is, so the requested quality has no effect.
pub struct FileFrameSource {
    files: Vec<PathBuf>,
    next: AtomicUsize,
}

impl FileFrameSource {
    /// Accepts a single image file or a directory of images.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let files = if path.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(path)? {
                let candidate = entry?.path();
                if is_image(&candidate) {
                    files.push(candidate);
                }
            }
            files.sort();
            files
        } else {
            vec![path.to_path_buf()]
        };
        debug!("File frame source with {} frames from {:?}", files.len(), path);

        Ok(Self {
            files,
            next: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[async_trait]
impl FrameSource for FileFrameSource {
    fn is_available(&self) -> bool {
        !self.files.is_empty()
    }

    async fn capture_frame(&self, _quality: f32) -> Result<Option<CapturedFrame>, CaptureError> {
        if self.files.is_empty() {
            return Err(CaptureError::Unavailable);
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.files.len();
        let path = &self.files[index];

        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        // Header only; pixels are never decoded.
        let (width, height) = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()?
            .into_dimensions()?;

        Ok(Some(CapturedFrame::new(width, height, bytes)))
    }
}
