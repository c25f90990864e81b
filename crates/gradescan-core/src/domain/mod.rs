//! Core domain types for scanned pages.

mod edge;
mod quality;
mod region;
mod report;
mod stage;

pub use edge::{Corner, DetectedEdge, NormalizedPoint};
pub use quality::{BlurAssessment, Quality};
pub use region::{Point, Region};
pub use report::{ImageDimensions, ScanReport};
pub use stage::{CornerDetector, DocumentFilter};
