use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Detection, DetectionBatch, ImageSize};

/// Most recent live result as seen by the renderer.
///
/// `detections` and `image_size` always come from the same response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionSnapshot {
    pub session: Option<Uuid>,
    pub detections: Vec<Detection>,
    pub image_size: ImageSize,
    pub received_at: Option<DateTime<Utc>>,
}

impl DetectionSnapshot {
    /// Cleared state with no owning session.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Cleared state owned by a freshly started session.
    pub fn for_session(session: Uuid) -> Self {
        Self {
            session: Some(session),
            ..Self::default()
        }
    }

    pub fn belongs_to(&self, session: Uuid) -> bool {
        self.session == Some(session)
    }

    /// Replaces both halves of the result at once.
    pub fn replace(&mut self, batch: DetectionBatch) {
        self.detections = batch.detections;
        self.image_size = batch.image_size;
        self.received_at = Some(Utc::now());
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
