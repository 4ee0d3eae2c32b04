use super::{DisplayTransform, FitStrategy, Viewport};
use crate::detection::{Detection, ImageSize, ScrewClass};

/// Overlay parameters for one kind of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    pub strategy: FitStrategy,
    pub narrow_label_width: f32,
}

impl MapOptions {
    pub fn new(strategy: FitStrategy) -> Self {
        Self {
            strategy,
            narrow_label_width: strategy.default_narrow_label_width(),
        }
    }

    /// Camera preview overlay.
    pub fn live() -> Self {
        Self::new(FitStrategy::Cover)
    }

    /// Captured photo overlay.
    pub fn result() -> Self {
        Self::new(FitStrategy::Contain)
    }

    pub fn with_narrow_label_width(mut self, width: f32) -> Self {
        self.narrow_label_width = width;
        self
    }
}

/// A detection placed in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub class: ScrewClass,
    pub confidence: f32,
    /// The label should be centered over the rect instead of left-aligned.
    pub narrow: bool,
}

impl ScreenRect {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// Maps detections using the default label policy for `strategy`.
pub fn map_detections(
    detections: &[Detection],
    source: ImageSize,
    viewport: Viewport,
    strategy: FitStrategy,
) -> Vec<ScreenRect> {
    map_detections_with(detections, source, viewport, &MapOptions::new(strategy))
}

/// Maps detections into `viewport`, preserving input order.
///
/// Returns an empty list when `source` is unknown. Boxes are not validated
/// or clipped; cover-fitted rects may extend past the viewport edges.
pub fn map_detections_with(
    detections: &[Detection],
    source: ImageSize,
    viewport: Viewport,
    options: &MapOptions,
) -> Vec<ScreenRect> {
    let Some(transform) = DisplayTransform::compute(source, viewport, options.strategy) else {
        return Vec::new();
    };

    detections
        .iter()
        .map(|detection| {
            let x1 = transform.map_x(detection.bbox.x1);
            let x2 = transform.map_x(detection.bbox.x2);
            ScreenRect {
                x1,
                y1: transform.map_y(detection.bbox.y1),
                x2,
                y2: transform.map_y(detection.bbox.y2),
                class: detection.class,
                confidence: detection.confidence,
                narrow: x2 - x1 < options.narrow_label_width,
            }
        })
        .collect()
}
