//! Traits for swappable page-processing stages.

use image::DynamicImage;

use super::DetectedEdge;

/// Normalizes a page image before scoring (e.g. shadow removal).
pub trait DocumentFilter: Send + Sync {
    /// Returns the name of this filter.
    fn name(&self) -> &'static str;

    /// Returns the filtered image. Dimensions are preserved.
    fn apply(&self, image: &DynamicImage) -> DynamicImage;
}

/// Locates the page boundary inside a photo.
pub trait CornerDetector: Send + Sync {
    /// Returns the name of this detector.
    fn name(&self) -> &'static str;

    /// Returns the page quadrilateral, or `None` if no clean boundary is found.
    fn detect(&self, image: &DynamicImage) -> Option<DetectedEdge>;
}
