use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Detection Error: {0}")]
    Detect(#[from] DetectError),
    #[error("Capture Error: {0}")]
    Capture(#[from] CaptureError),
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("No frame was captured")]
    NoFrame,
    #[error("Controller is missing its {0}")]
    MissingComponent(&'static str),
}

// Detector Endpoint Error Type
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Request to detector failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Detector responded with status {0}")]
    Status(u16),
    #[error("Detector response was malformed: {0}")]
    Malformed(String),
    #[error("Detector reported an unsuccessful detection")]
    Rejected,
    #[error("Detector did not respond within {0}ms")]
    Timeout(u64),
    #[error("Detection service failed: {0}")]
    Service(String),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Frame source is not available")]
    Unavailable,
    #[error("Failed to read frame: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to probe frame dimensions: {0}")]
    Probe(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("Invalid endpoint address: {0}")]
    Endpoint(String),
}
