mod http;
mod service;

pub use http::{HealthReport, HttpDetector};
pub use service::{DetectRequest, DetectionService, TimedDetection};

use crate::detection::DetectionBatch;
use crate::error::DetectError;
use async_trait::async_trait;

/// Remote object detector.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Runs detection on an encoded image, keeping results at or above
    /// `confidence`.
    async fn detect(&self, image: &[u8], confidence: f32) -> Result<DetectionBatch, DetectError>;
}
