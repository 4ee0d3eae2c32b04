mod batch;
mod confidence;
mod screw_class;
mod snapshot;

pub use batch::{BoundingBox, Detection, DetectionBatch, ImageSize};
pub use confidence::ConfidenceTier;
pub use screw_class::ScrewClass;
pub use snapshot::DetectionSnapshot;
