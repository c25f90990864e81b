//! Per-page scan report.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DetectedEdge, Quality};
use crate::batch::BatchImage;

/// Outcome of scanning a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Path to the scanned file.
    pub path: String,
    /// Batch image id.
    pub id: Uuid,
    /// Capture time (RFC 3339).
    pub timestamp: String,
    /// Page dimensions. Absent when the page could not be decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<ImageDimensions>,
    pub quality: Quality,
    pub blur_score: f64,
    /// Detected page boundary, when corner detection ran and succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<DetectedEdge>,
}

impl ScanReport {
    /// Builds the report for a captured page.
    #[must_use]
    pub fn new(path: impl Into<String>, image: &BatchImage) -> Self {
        Self {
            path: path.into(),
            id: image.id,
            timestamp: image.timestamp.clone(),
            dimensions: image.dimensions,
            quality: image.quality,
            blur_score: image.blur_score,
            edges: image.edges,
        }
    }

    /// Whether the page should be rescanned before grading.
    #[must_use]
    pub fn is_poor(&self) -> bool {
        self.quality == Quality::Poor
    }
}

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
