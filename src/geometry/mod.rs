//! Mapping of detector geometry onto on-screen display areas.
//!
//! Everything here is pure: the same detections, source size, viewport and
//! strategy always produce the same rectangles.

mod mapper;
mod transform;
mod viewport;

pub use mapper::{map_detections, map_detections_with, MapOptions, ScreenRect};
pub use transform::{DisplayTransform, FitStrategy};
pub use viewport::Viewport;

/// Rect width under which the live overlay recenters its label.
pub const LIVE_NARROW_LABEL_WIDTH: f32 = 80.0;
/// Rect width under which the result overlay recenters its label.
pub const RESULT_NARROW_LABEL_WIDTH: f32 = 90.0;
