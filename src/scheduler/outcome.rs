use crate::error::{CaptureError, DetectError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The previous tick has not finished.
    InFlight,
    /// The frame source cannot capture right now.
    SourceUnavailable,
}

/// Which path a single tick took.
#[derive(Debug)]
pub enum TickOutcome {
    /// No live session is running.
    Inactive,
    Skipped(SkipReason),
    /// The source returned nothing to send.
    NoFrame,
    CaptureFailed(CaptureError),
    /// The detector call failed and its result was dropped.
    Discarded(DetectError),
    /// The session was stopped or replaced while the request was out.
    Stale,
    Published { detections: usize },
}

impl TickOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, TickOutcome::Published { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TickOutcome::Skipped(_))
    }
}
