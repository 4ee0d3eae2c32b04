use crate::{
    capture::FrameSource,
    client::{Detector, HttpDetector},
    config::Settings,
    detection::DetectionSnapshot,
    error::AppError,
    geometry::{map_detections_with, FitStrategy, MapOptions, ScreenRect, Viewport},
    scheduler::DetectionScheduler,
    still::{StillDetector, StillResult},
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

/// Switches between the live camera overlay and the captured photo result.
pub struct DetectionController {
    frames: Arc<dyn FrameSource>,
    scheduler: DetectionScheduler,
    still: StillDetector,
    live_label_width: f32,
    result: Option<StillResult>,
}

impl DetectionController {
    pub fn builder(settings: Settings) -> ControllerBuilder {
        ControllerBuilder::new(settings)
    }

    /// Shows the camera and starts live detection. Any previous photo result
    /// is discarded.
    pub fn open_camera(&mut self) -> Uuid {
        self.result = None;
        self.scheduler.start()
    }

    pub fn close_camera(&mut self) {
        self.scheduler.stop();
    }

    pub fn is_camera_open(&self) -> bool {
        self.scheduler.is_active()
    }

    /// Stops live detection, lets the camera settle, then runs a still
    /// capture. The stored result is cleared if the capture fails.
    pub async fn take_picture(&mut self) -> Result<&StillResult, AppError> {
        self.scheduler.stop();
        tokio::time::sleep(self.still.settings().settle_delay()).await;
        let outcome = self.still.capture(self.frames.as_ref()).await;
        self.store(outcome)
    }

    /// Runs detection on an image chosen outside the camera.
    pub async fn detect_image(&mut self, image: Vec<u8>) -> Result<&StillResult, AppError> {
        let outcome = self.still.detect_bytes(image).await;
        self.store(outcome)
    }

    fn store(&mut self, outcome: Result<StillResult, AppError>) -> Result<&StillResult, AppError> {
        match outcome {
            Ok(result) => Ok(&*self.result.insert(result)),
            Err(e) => {
                self.result = None;
                Err(e)
            }
        }
    }

    /// Back to the idle state: no camera, no result.
    pub fn reset(&mut self) {
        self.result = None;
        self.scheduler.stop();
        info!("Detection controller reset");
    }

    pub fn result(&self) -> Option<&StillResult> {
        self.result.as_ref()
    }

    pub fn live_snapshot(&self) -> DetectionSnapshot {
        self.scheduler.snapshot()
    }

    pub fn subscribe_live(&self) -> watch::Receiver<DetectionSnapshot> {
        self.scheduler.subscribe()
    }

    /// Live boxes cover-fitted into the preview area of `screen`.
    pub fn live_overlay(&self, screen: Viewport) -> Vec<ScreenRect> {
        live_overlay(&self.scheduler.snapshot(), screen, self.live_label_width)
    }

    /// Result boxes contain-fitted into the result panel of `screen`.
    pub fn result_overlay(&self, screen: Viewport) -> Vec<ScreenRect> {
        self.result
            .as_ref()
            .map(|result| {
                result.overlay(
                    Viewport::result_panel(screen),
                    self.still.settings().narrow_label_width,
                )
            })
            .unwrap_or_default()
    }
}

/// Maps a live snapshot onto the preview area of `screen`.
pub fn live_overlay(
    snapshot: &DetectionSnapshot,
    screen: Viewport,
    narrow_label_width: f32,
) -> Vec<ScreenRect> {
    let options = MapOptions::new(FitStrategy::Cover).with_narrow_label_width(narrow_label_width);
    map_detections_with(
        &snapshot.detections,
        snapshot.image_size,
        Viewport::live_preview(screen),
        &options,
    )
}

impl Drop for DetectionController {
    fn drop(&mut self) {
        self.scheduler.stop();
    }
}

pub struct ControllerBuilder {
    settings: Settings,
    frames: Option<Arc<dyn FrameSource>>,
    detector: Option<Arc<dyn Detector>>,
}

impl ControllerBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            frames: None,
            detector: None,
        }
    }

    pub fn frames(mut self, frames: Arc<dyn FrameSource>) -> Self {
        self.frames = Some(frames);
        self
    }

    // Overrides the HTTP detector built from the endpoint settings.
    pub fn detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn build(self) -> Result<DetectionController, AppError> {
        self.settings.validate()?;
        let frames = self.frames.ok_or(AppError::MissingComponent("frame source"))?;
        let detector = match self.detector {
            Some(detector) => detector,
            None => Arc::new(HttpDetector::from_settings(&self.settings.endpoint)?),
        };

        Ok(DetectionController {
            scheduler: DetectionScheduler::new(
                frames.clone(),
                detector.clone(),
                self.settings.live.clone(),
            ),
            still: StillDetector::new(detector, self.settings.still.clone()),
            live_label_width: self.settings.live.narrow_label_width,
            frames,
            result: None,
        })
    }
}
