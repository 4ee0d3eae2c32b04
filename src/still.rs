//! Deliberate single-shot detection.
//!
//! Unlike the live loop there is no next tick to fall back on, so every
//! failure is returned to the caller to be shown to the user.

use crate::capture::FrameSource;
use crate::client::{DetectRequest, Detector, TimedDetection};
use crate::config::StillSettings;
use crate::detection::{Detection, DetectionBatch, ImageSize};
use crate::error::AppError;
use crate::geometry::{map_detections_with, FitStrategy, MapOptions, ScreenRect, Viewport};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Headline numbers shown above a photo result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionSummary {
    pub count: usize,
    pub mean_confidence: f32,
}

impl DetectionSummary {
    /// `None` for an empty list, which is shown as "nothing found".
    pub fn of(detections: &[Detection]) -> Option<Self> {
        if detections.is_empty() {
            return None;
        }
        let total: f32 = detections.iter().map(|d| d.confidence).sum();
        Some(Self {
            count: detections.len(),
            mean_confidence: total / detections.len() as f32,
        })
    }

    /// Mean confidence as a whole percentage.
    pub fn percent(&self) -> u32 {
        (self.mean_confidence * 100.0).round() as u32
    }
}

/// A photo and what the detector found in it.
#[derive(Debug, Clone)]
pub struct StillResult {
    pub image: Vec<u8>,
    pub detections: Vec<Detection>,
    pub image_size: ImageSize,
    pub detected_at: DateTime<Utc>,
}

impl StillResult {
    fn new(image: Vec<u8>, batch: DetectionBatch) -> Self {
        Self {
            image,
            detections: batch.detections,
            image_size: batch.image_size,
            detected_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> Option<DetectionSummary> {
        DetectionSummary::of(&self.detections)
    }

    /// Boxes contain-fitted into the result panel.
    pub fn overlay(&self, viewport: Viewport, narrow_label_width: f32) -> Vec<ScreenRect> {
        let options =
            MapOptions::new(FitStrategy::Contain).with_narrow_label_width(narrow_label_width);
        map_detections_with(&self.detections, self.image_size, viewport, &options)
    }
}

#[derive(Clone)]
pub struct StillDetector {
    detection: TimedDetection,
    settings: StillSettings,
}

impl StillDetector {
    pub fn new(detector: Arc<dyn Detector>, settings: StillSettings) -> Self {
        Self {
            detection: TimedDetection::new(detector, settings.request_timeout()),
            settings,
        }
    }

    pub fn settings(&self) -> &StillSettings {
        &self.settings
    }

    /// Captures one high-quality frame and runs detection on it.
    #[instrument(skip(self, frames))]
    pub async fn capture(&self, frames: &dyn FrameSource) -> Result<StillResult, AppError> {
        let frame = frames
            .capture_frame(self.settings.quality)
            .await?
            .filter(|frame| !frame.is_empty())
            .ok_or(AppError::NoFrame)?;
        self.detect_bytes(frame.bytes).await
    }

    /// Runs detection on an already encoded image, such as one picked from
    /// the photo library.
    pub async fn detect_bytes(&self, image: Vec<u8>) -> Result<StillResult, AppError> {
        let mut detection = self.detection.clone();
        let request = DetectRequest::new(image.clone(), self.settings.confidence);
        match detection.detect(request).await {
            Ok(batch) => {
                info!("Still detection found {} objects", batch.len());
                Ok(StillResult::new(image, batch))
            }
            Err(e) => {
                warn!("Still detection failed: {}", e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectError;
    use crate::test_support::{batch, MockDetector, MockFrameSource, Reply};

    #[tokio::test]
    async fn capture_uses_still_quality_and_threshold() {
        let frames = MockFrameSource::new(1920, 1080);
        let detector = Arc::new(MockDetector::always(batch(2, 4032, 3024)));
        let still = StillDetector::new(detector.clone(), StillSettings::default());

        let result = still.capture(&frames).await.unwrap();
        assert_eq!(frames.qualities(), vec![0.8]);
        assert_eq!(detector.confidences(), vec![0.2]);
        // The response's own size is authoritative for a still.
        assert_eq!(result.image_size, ImageSize::new(4032, 3024));
        assert_eq!(result.detections.len(), 2);
    }

    #[tokio::test]
    async fn blank_capture_is_an_error() {
        let frames = MockFrameSource::blank();
        let detector = Arc::new(MockDetector::always(batch(1, 10, 10)));
        let still = StillDetector::new(detector.clone(), StillSettings::default());

        assert!(matches!(
            still.capture(&frames).await,
            Err(AppError::NoFrame)
        ));
        assert_eq!(detector.calls(), 0);
    }

    #[tokio::test]
    async fn detector_failure_is_surfaced() {
        let detector = Arc::new(MockDetector::new(vec![Reply::Fail(DetectError::Status(502))]));
        let still = StillDetector::new(detector, StillSettings::default());

        let err = still.detect_bytes(vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, AppError::Detect(DetectError::Status(502))));
    }

    #[tokio::test]
    async fn summary_counts_and_averages_detections() {
        let detector = Arc::new(MockDetector::new(vec![
            Reply::Batch(batch(3, 800, 600)),
            Reply::Batch(batch(0, 800, 600)),
        ]));
        let still = StillDetector::new(detector, StillSettings::default());

        // batch(3, ..) confidences are 0.5, 0.6 and 0.7.
        let summary = still.detect_bytes(vec![1]).await.unwrap().summary().unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.mean_confidence - 0.6).abs() < 1e-6);
        assert_eq!(summary.percent(), 60);

        let empty = still.detect_bytes(vec![2]).await.unwrap();
        assert_eq!(empty.summary(), None);
    }

    #[tokio::test]
    async fn overlay_is_contain_fitted() {
        let detector = Arc::new(MockDetector::always(batch(1, 800, 600)));
        let still = StillDetector::new(detector, StillSettings::default());
        let result = still.detect_bytes(vec![9]).await.unwrap();

        let rects = result.overlay(Viewport::new(400.0, 400.0), 90.0);
        // batch(1, ..) box is x 0..80, y 50..130 at scale 0.5 with a 50pt top pad.
        assert_eq!(rects.len(), 1);
        assert!((rects[0].x2 - 40.0).abs() < 1e-3);
        assert!((rects[0].y1 - 75.0).abs() < 1e-3);
        assert!(rects[0].narrow);
    }
}
