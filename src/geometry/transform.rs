use serde::{Deserialize, Serialize};

use super::{Viewport, LIVE_NARROW_LABEL_WIDTH, RESULT_NARROW_LABEL_WIDTH};
use crate::detection::ImageSize;

/// How a source image is fitted into a viewport.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FitStrategy {
    /// Fill the viewport, cropping overflow. Used by the live preview.
    Cover,
    /// Show the whole image, padding the rest. Used by the result view.
    Contain,
}

impl FitStrategy {
    pub fn default_narrow_label_width(&self) -> f32 {
        match self {
            FitStrategy::Cover => LIVE_NARROW_LABEL_WIDTH,
            FitStrategy::Contain => RESULT_NARROW_LABEL_WIDTH,
        }
    }
}

/// Placement of the scaled source image inside a viewport.
///
/// Scaling is uniform; offsets may be negative under [`FitStrategy::Cover`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub scale: f32,
    pub display_width: f32,
    pub display_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl DisplayTransform {
    /// Returns `None` when the source size is unknown or the viewport is empty.
    pub fn compute(source: ImageSize, viewport: Viewport, strategy: FitStrategy) -> Option<Self> {
        if !source.is_known() || viewport.is_empty() {
            return None;
        }

        let source_width = source.width as f32;
        let source_height = source.height as f32;
        let source_is_wider = source_width / source_height > viewport.aspect();

        // Cover fits the dominant axis to the viewport, contain the other one.
        let fit_height = match strategy {
            FitStrategy::Cover => source_is_wider,
            FitStrategy::Contain => !source_is_wider,
        };

        let transform = if fit_height {
            let scale = viewport.height / source_height;
            let display_width = source_width * scale;
            Self {
                scale,
                display_width,
                display_height: viewport.height,
                offset_x: (viewport.width - display_width) / 2.0,
                offset_y: 0.0,
            }
        } else {
            let scale = viewport.width / source_width;
            let display_height = source_height * scale;
            Self {
                scale,
                display_width: viewport.width,
                display_height,
                offset_x: 0.0,
                offset_y: (viewport.height - display_height) / 2.0,
            }
        };

        Some(transform)
    }

    pub fn map_x(&self, x: f32) -> f32 {
        x * self.scale + self.offset_x
    }

    pub fn map_y(&self, y: f32) -> f32 {
        y * self.scale + self.offset_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn cover_crops_a_wide_source_horizontally() {
        let t = DisplayTransform::compute(
            ImageSize::new(800, 600),
            Viewport::new(400.0, 400.0),
            FitStrategy::Cover,
        )
        .unwrap();
        assert!(close(t.scale, 400.0 / 600.0));
        assert!(close(t.display_width, 533.333));
        assert!(close(t.display_height, 400.0));
        assert!(close(t.offset_x, -66.667));
        assert_eq!(t.offset_y, 0.0);
    }

    #[test]
    fn contain_pads_a_wide_source_vertically() {
        let t = DisplayTransform::compute(
            ImageSize::new(800, 600),
            Viewport::new(400.0, 400.0),
            FitStrategy::Contain,
        )
        .unwrap();
        assert!(close(t.scale, 0.5));
        assert!(close(t.display_width, 400.0));
        assert!(close(t.display_height, 300.0));
        assert_eq!(t.offset_x, 0.0);
        assert!(close(t.offset_y, 50.0));
    }

    #[test]
    fn tall_source_inverts_both_strategies() {
        let source = ImageSize::new(720, 1280);
        let viewport = Viewport::new(400.0, 400.0);

        let cover = DisplayTransform::compute(source, viewport, FitStrategy::Cover).unwrap();
        assert!(close(cover.scale, 400.0 / 720.0));
        assert_eq!(cover.offset_x, 0.0);
        assert!(cover.offset_y < 0.0);

        let contain = DisplayTransform::compute(source, viewport, FitStrategy::Contain).unwrap();
        assert!(close(contain.scale, 400.0 / 1280.0));
        assert!(close(contain.offset_x, (400.0 - 225.0) / 2.0));
        assert_eq!(contain.offset_y, 0.0);
    }

    #[test]
    fn matching_aspect_needs_no_offset() {
        let t = DisplayTransform::compute(
            ImageSize::new(1280, 720),
            Viewport::new(640.0, 360.0),
            FitStrategy::Cover,
        )
        .unwrap();
        assert!(close(t.scale, 0.5));
        assert_eq!(t.offset_x, 0.0);
        assert!(close(t.offset_y, 0.0));
    }

    #[test]
    fn unknown_source_or_empty_viewport_has_no_transform() {
        let viewport = Viewport::new(400.0, 400.0);
        assert!(DisplayTransform::compute(ImageSize::UNKNOWN, viewport, FitStrategy::Cover).is_none());
        assert!(
            DisplayTransform::compute(ImageSize::new(800, 0), viewport, FitStrategy::Contain)
                .is_none()
        );
        assert!(DisplayTransform::compute(
            ImageSize::new(800, 600),
            Viewport::new(0.0, 400.0),
            FitStrategy::Cover
        )
        .is_none());
    }
}
