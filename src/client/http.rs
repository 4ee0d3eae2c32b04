use super::Detector;
use crate::config::EndpointSettings;
use crate::detection::{BoundingBox, Detection, DetectionBatch, ImageSize, ScrewClass};
use crate::error::{ConfigError, DetectError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const DETECT_PATH: &str = "/detect/base64";
const HEALTH_PATH: &str = "/health";

#[derive(Serialize)]
struct DetectBody {
    image: String,
    confidence: f32,
}

// Class names stay strings here; the detector reports `class_{id}` for ids
// outside its label table.
#[derive(Deserialize)]
struct WireDetection {
    class_name: String,
    confidence: f32,
    bbox: BoundingBox,
}

#[derive(Deserialize)]
struct DetectResponse {
    success: bool,
    detections: Option<Vec<WireDetection>>,
    image_size: Option<ImageSize>,
}

fn known_detections(wire: Vec<WireDetection>) -> Vec<Detection> {
    wire.into_iter()
        .filter_map(|d| match ScrewClass::from_name(&d.class_name) {
            Some(class) => Some(Detection::new(class, d.confidence, d.bbox)),
            None => {
                debug!("Skipping detection of unknown class {:?}", d.class_name);
                None
            }
        })
        .collect()
}

/// Result of the detector's `/health` probe.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HealthReport {
    pub status: String,
    pub model_loaded: bool,
    #[serde(default)]
    pub classes: Vec<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.model_loaded && self.status == "healthy"
    }
}

/// Detector reached over HTTP with base64-encoded JSON bodies.
#[derive(Clone, Debug)]
pub struct HttpDetector {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDetector {
    /// `base_url` must already be normalized (see [`crate::config::normalize_base_url`]).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &EndpointSettings) -> Result<Self, ConfigError> {
        Ok(Self::new(settings.resolve()?))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthReport, DetectError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, HEALTH_PATH))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DetectError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| DetectError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl Detector for HttpDetector {
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    async fn detect(&self, image: &[u8], confidence: f32) -> Result<DetectionBatch, DetectError> {
        let body = DetectBody {
            image: STANDARD.encode(image),
            confidence,
        };
        let response = self
            .client
            .post(format!("{}{}", self.base_url, DETECT_PATH))
            .json(&body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let batch = parse_detect_response(status, &bytes)?;
        debug!("Detector returned {} detections", batch.len());
        Ok(batch)
    }
}

/// Accepts only a 2xx status carrying `success: true`, a detection list and
/// an image size. Entries naming a class outside [`ScrewClass`] are dropped.
pub(crate) fn parse_detect_response(status: u16, body: &[u8]) -> Result<DetectionBatch, DetectError> {
    if !(200..300).contains(&status) {
        return Err(DetectError::Status(status));
    }
    let response: DetectResponse =
        serde_json::from_slice(body).map_err(|e| DetectError::Malformed(e.to_string()))?;
    if !response.success {
        return Err(DetectError::Rejected);
    }
    match (response.detections, response.image_size) {
        (Some(detections), Some(image_size)) => Ok(DetectionBatch::new(
            known_detections(detections),
            image_size,
        )),
        (None, _) => Err(DetectError::Malformed("missing detections".to_string())),
        (_, None) => Err(DetectError::Malformed("missing image_size".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_success_becomes_a_batch() {
        let body = br#"{
            "success": true,
            "image_size": {"width": 1280, "height": 720},
            "detections_count": 1,
            "detections": [
                {"class_id": 0, "class_name": "phillips", "confidence": 0.66,
                 "bbox": {"x1": 1, "y1": 2, "x2": 30, "y2": 40}}
            ]
        }"#;
        let batch = parse_detect_response(200, body).unwrap();
        assert_eq!(batch.image_size, ImageSize::new(1280, 720));
        assert_eq!(batch.detections[0].class, ScrewClass::Phillips);
    }

    #[test]
    fn empty_detection_list_is_still_a_success() {
        let body = br#"{"success": true, "image_size": {"width": 64, "height": 48}, "detections": []}"#;
        assert!(parse_detect_response(200, body).unwrap().is_empty());
    }

    #[test]
    fn non_success_status_is_an_error() {
        let body = br#"{"detail": "Tespit hatasi"}"#;
        assert!(matches!(
            parse_detect_response(500, body),
            Err(DetectError::Status(500))
        ));
    }

    #[test]
    fn success_false_is_rejected() {
        let body = br#"{"success": false}"#;
        assert!(matches!(
            parse_detect_response(200, body),
            Err(DetectError::Rejected)
        ));
    }

    #[test]
    fn missing_fields_and_garbage_are_malformed() {
        for body in [
            &br#"{"success": true, "detections": []}"#[..],
            &br#"{"success": true, "image_size": {"width": 1, "height": 1}}"#[..],
            &b"<html>bad gateway</html>"[..],
            &br#"{"success": true, "image_size": {"width": 1, "height": 1},
                  "detections": [{"class_name": "torx", "confidence": "high",
                                  "bbox": {"x1": 0, "y1": 0, "x2": 1, "y2": 1}}]}"#[..],
        ] {
            assert!(matches!(
                parse_detect_response(200, body),
                Err(DetectError::Malformed(_))
            ));
        }
    }

    #[test]
    fn unknown_classes_are_skipped_per_detection() {
        let body = br#"{
            "success": true,
            "image_size": {"width": 640, "height": 480},
            "detections": [
                {"class_id": 7, "class_name": "class_7", "confidence": 0.95,
                 "bbox": {"x1": 0, "y1": 0, "x2": 10, "y2": 10}},
                {"class_id": 4, "class_name": "slotted", "confidence": 0.61,
                 "bbox": {"x1": 5, "y1": 5, "x2": 50, "y2": 60}}
            ]
        }"#;
        let batch = parse_detect_response(200, body).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.detections[0].class, ScrewClass::Slotted);
        assert_eq!(batch.detections[0].confidence, 0.61);
    }

    #[test]
    fn health_report_reads_server_payload() {
        let report: HealthReport = serde_json::from_str(
            r#"{"status": "healthy", "model_loaded": true, "model_type": "ONNX",
                "classes": ["phillips", "pozidriv", "torx", "hex", "slotted"]}"#,
        )
        .unwrap();
        assert!(report.is_healthy());
        assert_eq!(report.classes.len(), 5);
    }
}
