pub mod capture;
pub mod client;
pub mod config;
pub mod controller;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod scheduler;
pub mod still;

#[cfg(test)]
mod test_support;

pub use error::{AppError, CaptureError, ConfigError, DetectError};

pub use capture::{CapturedFrame, FileFrameSource, FrameSource};
pub use client::{Detector, HttpDetector};
pub use config::Settings;
pub use controller::{ControllerBuilder, DetectionController};
pub use detection::{
    BoundingBox, ConfidenceTier, Detection, DetectionBatch, DetectionSnapshot, ImageSize,
    ScrewClass,
};
pub use geometry::{map_detections, FitStrategy, ScreenRect, Viewport};
pub use scheduler::{DetectionScheduler, TickOutcome};
pub use still::{DetectionSummary, StillResult};
