use super::Detector;
use crate::detection::DetectionBatch;
use crate::error::DetectError;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};
use tower::{timeout::error::Elapsed, timeout::Timeout, Service, ServiceBuilder, ServiceExt};

/// One encoded image to run through the detector.
#[derive(Clone, Debug)]
pub struct DetectRequest {
    pub image: Vec<u8>,
    pub confidence: f32,
}

impl DetectRequest {
    pub fn new(image: Vec<u8>, confidence: f32) -> Self {
        Self { image, confidence }
    }
}

#[derive(Clone)]
pub struct DetectionService {
    detector: Arc<dyn Detector>,
}

impl DetectionService {
    pub fn new(detector: Arc<dyn Detector>) -> Self {
        Self { detector }
    }
}

impl Service<DetectRequest> for DetectionService {
    type Response = DetectionBatch;
    type Error = DetectError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: DetectRequest) -> Self::Future {
        let detector = self.detector.clone();
        Box::pin(async move { detector.detect(&request.image, request.confidence).await })
    }
}

/// [`DetectionService`] bounded by a per-request timeout.
#[derive(Clone)]
pub struct TimedDetection {
    inner: Timeout<DetectionService>,
    timeout: Duration,
}

impl TimedDetection {
    pub fn new(detector: Arc<dyn Detector>, timeout: Duration) -> Self {
        let inner = ServiceBuilder::new()
            .timeout(timeout)
            .service(DetectionService::new(detector));
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn detect(&mut self, request: DetectRequest) -> Result<DetectionBatch, DetectError> {
        let timeout_ms = self.timeout.as_millis() as u64;
        let result = match self.inner.ready().await {
            Ok(service) => service.call(request).await,
            Err(e) => Err(e),
        };
        result.map_err(|e| match e.downcast::<DetectError>() {
            Ok(e) => *e,
            Err(e) if e.is::<Elapsed>() => DetectError::Timeout(timeout_ms),
            Err(e) => DetectError::Service(e.to_string()),
        })
    }
}
