//! Captured pages awaiting extraction.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{BlurAssessment, DetectedEdge, ImageDimensions, Quality};
use crate::error::{Result, ScanError};
use crate::pipeline::ScanPipeline;
use crate::raster::{DataUrl, JPEG_QUALITY};

/// One captured or uploaded page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchImage {
    pub id: Uuid,
    /// Page as stored for extraction; the filtered JPEG when a filter ran.
    pub data_url: DataUrl,
    /// Page exactly as captured. Rescans start from here.
    pub source: DataUrl,
    /// Capture time (RFC 3339, UTC).
    pub timestamp: String,
    pub quality: Quality,
    pub blur_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<DetectedEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<ImageDimensions>,
}

/// Fields recomputed every time a page is (re)scanned.
struct Scan {
    data_url: DataUrl,
    assessment: BlurAssessment,
    edges: Option<DetectedEdge>,
    dimensions: Option<ImageDimensions>,
}

fn scan(data_url: DataUrl, pipeline: &ScanPipeline) -> Scan {
    let image = match data_url.decode() {
        Ok(image) => image,
        Err(e) => {
            warn!("Page could not be decoded, using neutral quality: {e}");
            return Scan {
                data_url,
                assessment: BlurAssessment::NEUTRAL,
                edges: None,
                dimensions: None,
            };
        }
    };

    let analysis = pipeline.analyze(&image);
    let data_url = if analysis.is_filtered() {
        match DataUrl::jpeg(&analysis.image, JPEG_QUALITY) {
            Ok(filtered) => filtered,
            Err(e) => {
                warn!("Keeping unfiltered page: {e}");
                data_url
            }
        }
    } else {
        data_url
    };

    Scan {
        data_url,
        assessment: analysis.assessment,
        edges: analysis.edges,
        dimensions: Some(ImageDimensions::new(image.width(), image.height())),
    }
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

impl BatchImage {
    fn apply(&mut self, scan: Scan) {
        self.data_url = scan.data_url;
        self.quality = scan.assessment.quality;
        self.blur_score = scan.assessment.blur_score;
        self.edges = scan.edges;
        self.dimensions = scan.dimensions;
    }
}

/// Ordered collection of pages for one extraction pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Batch {
    images: Vec<BatchImage>,
}

impl Batch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans a page and appends it.
    ///
    /// An undecodable page is still added, with the neutral assessment and
    /// no edges.
    pub fn capture(&mut self, data_url: DataUrl, pipeline: &ScanPipeline) -> &BatchImage {
        let scan = scan(data_url.clone(), pipeline);
        let image = BatchImage {
            id: Uuid::new_v4(),
            data_url: scan.data_url,
            source: data_url,
            timestamp: now_rfc3339(),
            quality: scan.assessment.quality,
            blur_score: scan.assessment.blur_score,
            edges: scan.edges,
            dimensions: scan.dimensions,
        };
        debug!(id = %image.id, quality = %image.quality, "Page captured");
        let index = self.images.len();
        self.images.push(image);
        &self.images[index]
    }

    /// Recomputes quality and edges for a stored page, keeping its id and
    /// timestamp. The pipeline runs on the captured source, so filtering is
    /// never applied twice.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::UnknownImage`] if no page has this id.
    pub fn rescan(&mut self, id: Uuid, pipeline: &ScanPipeline) -> Result<&BatchImage> {
        let image = self
            .images
            .iter_mut()
            .find(|image| image.id == id)
            .ok_or(ScanError::UnknownImage(id))?;
        let scan = scan(image.source.clone(), pipeline);
        image.apply(scan);
        debug!(%id, quality = %image.quality, "Page rescanned");
        Ok(image)
    }

    /// Removes a page, returning it.
    pub fn remove(&mut self, id: Uuid) -> Option<BatchImage> {
        let index = self.images.iter().position(|image| image.id == id)?;
        Some(self.images.remove(index))
    }

    /// Drops every page, as after a successful extraction.
    pub fn clear(&mut self) {
        info!(count = self.images.len(), "Batch cleared");
        self.images.clear();
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&BatchImage> {
        self.images.iter().find(|image| image.id == id)
    }

    /// Mutable access, for editing a page's corners.
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut BatchImage> {
        self.images.iter_mut().find(|image| image.id == id)
    }

    /// Pages in capture order.
    #[must_use]
    pub fn images(&self) -> &[BatchImage] {
        &self.images
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Whether any page is too blurry to grade.
    #[must_use]
    pub fn has_poor_pages(&self) -> bool {
        self.images.iter().any(|image| image.quality == Quality::Poor)
    }
}
