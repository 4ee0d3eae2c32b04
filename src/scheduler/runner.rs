use super::outcome::{SkipReason, TickOutcome};
use crate::capture::FrameSource;
use crate::client::{DetectRequest, TimedDetection};
use crate::detection::{DetectionSnapshot, ImageSize};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

/// Releases the in-flight flag when dropped, whichever way the tick ends.
pub(crate) struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Everything one live session needs to run a tick.
pub(crate) struct TickRunner {
    pub(crate) session: Uuid,
    pub(crate) in_flight: Arc<AtomicBool>,
    frames: Arc<dyn FrameSource>,
    detection: TimedDetection,
    quality: f32,
    confidence: f32,
    state_tx: Arc<watch::Sender<DetectionSnapshot>>,
}

impl TickRunner {
    pub(crate) fn new(
        session: Uuid,
        frames: Arc<dyn FrameSource>,
        detection: TimedDetection,
        quality: f32,
        confidence: f32,
        state_tx: Arc<watch::Sender<DetectionSnapshot>>,
    ) -> Self {
        Self {
            session,
            in_flight: Arc::new(AtomicBool::new(false)),
            frames,
            detection,
            quality,
            confidence,
            state_tx,
        }
    }

    /// Claims the in-flight slot, or reports why this tick must be skipped.
    pub(crate) fn try_begin(&self) -> Result<InFlightGuard, TickOutcome> {
        if !self.frames.is_available() {
            return Err(TickOutcome::Skipped(SkipReason::SourceUnavailable));
        }
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TickOutcome::Skipped(SkipReason::InFlight))?;
        Ok(InFlightGuard {
            flag: self.in_flight.clone(),
        })
    }

    pub(crate) async fn run(&self, _guard: InFlightGuard) -> TickOutcome {
        let frame = match self.frames.capture_frame(self.quality).await {
            Ok(Some(frame)) if !frame.is_empty() => frame,
            Ok(_) => return TickOutcome::NoFrame,
            Err(e) => return TickOutcome::CaptureFailed(e),
        };
        let frame_size = ImageSize::new(frame.width, frame.height);

        let mut detection = self.detection.clone();
        let mut batch = match detection
            .detect(DetectRequest::new(frame.bytes, self.confidence))
            .await
        {
            Ok(batch) => batch,
            Err(e) => return TickOutcome::Discarded(e),
        };
        // Boxes are drawn over the preview stream, which has the frame's geometry.
        if frame_size.is_known() {
            batch.image_size = frame_size;
        }

        let detections = batch.len();
        let session = self.session;
        let published = self.state_tx.send_if_modified(move |snapshot| {
            if !snapshot.belongs_to(session) {
                return false;
            }
            snapshot.replace(batch);
            true
        });

        if published {
            TickOutcome::Published { detections }
        } else {
            debug!("Dropping result for stopped session {}", session);
            TickOutcome::Stale
        }
    }
}
