use serde::{Deserialize, Serialize};

/// Height reserved below the live preview for the capture controls.
const CONTROLS_HEIGHT: f32 = 180.0;
/// Horizontal padding of the result card, in reference-width points.
const RESULT_PADDING: f32 = 32.0;
/// Screen width the padding above is expressed against.
const REFERENCE_WIDTH: f32 = 375.0;
/// Share of the available height given to the result image.
const RESULT_HEIGHT_SHARE: f32 = 0.45;

/// Size of an on-screen display area, in screen points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Area covered by the camera preview on a screen of the given size.
    pub fn live_preview(screen: Viewport) -> Self {
        Self {
            width: screen.width.max(0.0),
            height: (screen.height - CONTROLS_HEIGHT).max(0.0),
        }
    }

    /// Area the captured photo is fitted into on the result screen.
    pub fn result_panel(screen: Viewport) -> Self {
        let padding = RESULT_PADDING * (screen.width / REFERENCE_WIDTH);
        Self {
            width: (screen.width - padding).max(0.0),
            height: ((screen.height - CONTROLS_HEIGHT) * RESULT_HEIGHT_SHARE).max(0.0),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_preview_leaves_room_for_controls() {
        let preview = Viewport::live_preview(Viewport::new(375.0, 812.0));
        assert_eq!(preview, Viewport::new(375.0, 632.0));
    }

    #[test]
    fn result_panel_scales_padding_with_screen_width() {
        let panel = Viewport::result_panel(Viewport::new(750.0, 1180.0));
        assert_eq!(panel.width, 750.0 - 64.0);
        assert!((panel.height - 450.0).abs() < 1e-3);
    }

    #[test]
    fn tiny_screens_never_go_negative() {
        let preview = Viewport::live_preview(Viewport::new(100.0, 100.0));
        assert_eq!(preview.height, 0.0);
        assert!(preview.is_empty());
    }
}
