//! Scripted collaborators for unit tests.

use crate::capture::{CapturedFrame, FrameSource};
use crate::client::Detector;
use crate::detection::{BoundingBox, Detection, DetectionBatch, ImageSize, ScrewClass};
use crate::error::{CaptureError, DetectError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Frame source returning a fixed frame, with switchable availability.
pub struct MockFrameSource {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
    available: AtomicBool,
    failing: AtomicBool,
    captures: AtomicUsize,
    qualities: Mutex<Vec<f32>>,
}

impl MockFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bytes: vec![0xFF, 0xD8, 0xFF],
            available: AtomicBool::new(true),
            failing: AtomicBool::new(false),
            captures: AtomicUsize::new(0),
            qualities: Mutex::new(Vec::new()),
        }
    }

    /// A source that captures successfully but returns no bytes.
    pub fn blank() -> Self {
        Self {
            bytes: Vec::new(),
            ..Self::new(0, 0)
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// While set, every capture attempt fails with an I/O error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    pub fn qualities(&self) -> Vec<f32> {
        self.qualities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl FrameSource for MockFrameSource {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn capture_frame(&self, quality: f32) -> Result<Option<CapturedFrame>, CaptureError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        self.qualities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(quality);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CaptureError::Io(io::Error::other("camera busy")));
        }
        Ok(Some(CapturedFrame::new(
            self.width,
            self.height,
            self.bytes.clone(),
        )))
    }
}

/// What a [`MockDetector`] call should produce.
pub enum Reply {
    Batch(DetectionBatch),
    Fail(DetectError),
}

/// Detector replaying scripted replies after an optional delay.
///
/// Once the script runs out every call returns the fallback batch.
pub struct MockDetector {
    delay: Duration,
    replies: Mutex<VecDeque<Reply>>,
    fallback: DetectionBatch,
    calls: AtomicUsize,
    confidences: Mutex<Vec<f32>>,
}

impl MockDetector {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            delay: Duration::ZERO,
            replies: Mutex::new(replies.into()),
            fallback: DetectionBatch::default(),
            calls: AtomicUsize::new(0),
            confidences: Mutex::new(Vec::new()),
        }
    }

    pub fn always(batch: DetectionBatch) -> Self {
        Self {
            fallback: batch,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn confidences(&self) -> Vec<f32> {
        self.confidences
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Detector for MockDetector {
    async fn detect(&self, _image: &[u8], confidence: f32) -> Result<DetectionBatch, DetectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.confidences
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(confidence);
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match reply {
            Some(Reply::Batch(batch)) => Ok(batch),
            Some(Reply::Fail(e)) => Err(e),
            None => Ok(self.fallback.clone()),
        }
    }
}

pub fn batch(count: usize, width: u32, height: u32) -> DetectionBatch {
    let detections = (0..count)
        .map(|i| {
            let x = 100.0 * i as f32;
            Detection::new(
                ScrewClass::ALL[i % ScrewClass::ALL.len()],
                0.5 + 0.1 * i as f32,
                BoundingBox::new(x, 50.0, x + 80.0, 130.0),
            )
        })
        .collect();
    DetectionBatch::new(detections, ImageSize::new(width, height))
}
