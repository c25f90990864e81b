//! Page-processing algorithms.
//!
//! Each stage is usable on its own; [`crate::pipeline::ScanPipeline`] chains them.

mod blur;
mod corners;
pub mod perspective;
mod photocopy;

pub use blur::{laplacian_variance, BlurConfig, BlurScorer};
pub use corners::{CornerConfig, HoughCornerDetector};
pub use photocopy::{PhotocopyConfig, PhotocopyFilter};
