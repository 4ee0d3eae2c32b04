//! Live detection loop.
//!
//! While a session is active a timer fires every `interval` and each firing
//! runs at most one capture-and-detect round trip. Firings that land while a
//! round trip is still out are dropped, never queued, so a slow network or
//! camera only lowers the effective rate.
//!
//! Results are published through a `watch` channel as a whole
//! [`DetectionSnapshot`]; readers never see boxes from one response paired
//! with the image size of another.

mod outcome;
mod runner;

pub use outcome::{SkipReason, TickOutcome};

use crate::capture::FrameSource;
use crate::client::{Detector, TimedDetection};
use crate::config::LiveSettings;
use crate::detection::DetectionSnapshot;
use runner::TickRunner;
use std::sync::{atomic::Ordering, Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};
use uuid::Uuid;

struct LiveSession {
    runner: Arc<TickRunner>,
    ticker: JoinHandle<()>,
}

pub struct DetectionScheduler {
    frames: Arc<dyn FrameSource>,
    detector: Arc<dyn Detector>,
    settings: LiveSettings,
    state_tx: Arc<watch::Sender<DetectionSnapshot>>,
    session: Mutex<Option<LiveSession>>,
}

impl DetectionScheduler {
    pub fn new(
        frames: Arc<dyn FrameSource>,
        detector: Arc<dyn Detector>,
        settings: LiveSettings,
    ) -> Self {
        let (state_tx, _) = watch::channel(DetectionSnapshot::empty());
        Self {
            frames,
            detector,
            settings,
            state_tx: Arc::new(state_tx),
            session: Mutex::new(None),
        }
    }

    fn session(&self) -> MutexGuard<'_, Option<LiveSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn active_runner(&self) -> Option<Arc<TickRunner>> {
        self.session()
            .as_ref()
            .map(|session| session.runner.clone())
    }

    /// Read side of the live result, for the renderer.
    pub fn subscribe(&self) -> watch::Receiver<DetectionSnapshot> {
        self.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> DetectionSnapshot {
        self.state_tx.borrow().clone()
    }

    pub fn settings(&self) -> &LiveSettings {
        &self.settings
    }

    pub fn is_active(&self) -> bool {
        self.session().is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.active_runner()
            .map(|runner| runner.in_flight.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Starts polling and returns the session id. A running session is left
    /// untouched and its id returned.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> Uuid {
        let mut slot = self.session();
        if let Some(session) = slot.as_ref() {
            debug!("Live session {} already running", session.runner.session);
            return session.runner.session;
        }

        let id = Uuid::new_v4();
        self.state_tx.send_replace(DetectionSnapshot::for_session(id));
        let runner = Arc::new(TickRunner::new(
            id,
            self.frames.clone(),
            TimedDetection::new(self.detector.clone(), self.settings.request_timeout()),
            self.settings.quality,
            self.settings.confidence,
            self.state_tx.clone(),
        ));
        let ticker = tokio::spawn(run_ticker(runner.clone(), self.settings.interval()));
        info!(
            "Started live session {} ({}ms interval)",
            id, self.settings.interval_ms
        );

        *slot = Some(LiveSession { runner, ticker });
        id
    }

    /// Stops polling and clears the published result.
    ///
    /// A request already on the wire is not cancelled; its result is dropped
    /// when it arrives because the snapshot no longer belongs to its session.
    pub fn stop(&self) {
        // The slot stays locked until the snapshot is cleared, so a concurrent
        // start() cannot publish its session in between and be wiped.
        let mut slot = self.session();
        if let Some(session) = slot.take() {
            session.ticker.abort();
            session.runner.in_flight.store(false, Ordering::Release);
            info!("Stopped live session {}", session.runner.session);
        }
        let cleared = DetectionSnapshot::empty();
        self.state_tx.send_if_modified(|snapshot| {
            if *snapshot == cleared {
                return false;
            }
            *snapshot = cleared.clone();
            true
        });
        drop(slot);
    }

    /// Runs one tick now, outside the timer. Subject to the same in-flight
    /// guard as timer ticks.
    pub async fn tick(&self) -> TickOutcome {
        let Some(runner) = self.active_runner() else {
            return TickOutcome::Inactive;
        };
        match runner.try_begin() {
            Ok(guard) => runner.run(guard).await,
            Err(outcome) => outcome,
        }
    }
}

impl Drop for DetectionScheduler {
    fn drop(&mut self) {
        if let Some(session) = self.session().take() {
            session.ticker.abort();
        }
    }
}

async fn run_ticker(runner: Arc<TickRunner>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; polling starts one period in.
    interval.tick().await;

    loop {
        interval.tick().await;
        match runner.try_begin() {
            Ok(guard) => {
                let runner = runner.clone();
                tokio::spawn(async move {
                    let outcome = runner.run(guard).await;
                    log_outcome(runner.session, &outcome);
                });
            }
            Err(outcome) => log_outcome(runner.session, &outcome),
        }
    }
}

fn log_outcome(session: Uuid, outcome: &TickOutcome) {
    match outcome {
        TickOutcome::Published { detections } => {
            trace!("Session {} published {} detections", session, detections)
        }
        TickOutcome::Skipped(reason) => trace!("Session {} skipped tick: {:?}", session, reason),
        TickOutcome::NoFrame => debug!("Session {} captured no frame", session),
        TickOutcome::CaptureFailed(e) => debug!("Session {} capture failed: {}", session, e),
        TickOutcome::Discarded(e) => debug!("Session {} dropped detection: {}", session, e),
        TickOutcome::Stale => debug!("Session {} result arrived after stop", session),
        TickOutcome::Inactive => {}
    }
}
