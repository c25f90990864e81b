//! Page analysis pipeline: optional filter, blur scoring, optional corner
//! detection.

use std::borrow::Cow;

use image::DynamicImage;
use tracing::debug;

use crate::domain::{BlurAssessment, CornerDetector, DetectedEdge, DocumentFilter};
use crate::modules::BlurScorer;

/// Result of analyzing one page.
#[derive(Debug, Clone)]
pub struct PageAnalysis<'a> {
    /// The page as scored. Owned when a filter rewrote it.
    pub image: Cow<'a, DynamicImage>,
    pub assessment: BlurAssessment,
    /// Page boundary, if a detector is configured and found one.
    pub edges: Option<DetectedEdge>,
}

impl PageAnalysis<'_> {
    /// Whether a document filter produced a new image.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        matches!(self.image, Cow::Owned(_))
    }
}

/// Configured set of page-processing stages.
#[derive(Default)]
pub struct ScanPipeline {
    filter: Option<Box<dyn DocumentFilter>>,
    scorer: BlurScorer,
    detector: Option<Box<dyn CornerDetector>>,
}

impl ScanPipeline {
    /// Creates a pipeline that only scores blur.
    #[must_use]
    pub fn new(scorer: BlurScorer) -> Self {
        Self {
            filter: None,
            scorer,
            detector: None,
        }
    }

    /// Adds a filter that runs before scoring.
    #[must_use]
    pub fn with_filter(mut self, filter: impl DocumentFilter + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Adds a corner detector.
    #[must_use]
    pub fn with_detector(mut self, detector: impl CornerDetector + 'static) -> Self {
        self.detector = Some(Box::new(detector));
        self
    }

    #[must_use]
    pub const fn scorer(&self) -> &BlurScorer {
        &self.scorer
    }

    /// Runs every configured stage over `image`.
    ///
    /// Corners are detected on the unfiltered page, where the page and
    /// background still contrast.
    #[must_use]
    pub fn analyze<'a>(&self, image: &'a DynamicImage) -> PageAnalysis<'a> {
        let page = match &self.filter {
            Some(filter) => {
                debug!(filter = filter.name(), "Applying document filter");
                Cow::Owned(filter.apply(image))
            }
            None => Cow::Borrowed(image),
        };

        let assessment = self.scorer.score_image(&page);

        let edges = self.detector.as_ref().and_then(|detector| {
            let edges = detector.detect(image);
            debug!(
                detector = detector.name(),
                found = edges.is_some(),
                "Corner detection finished"
            );
            edges
        });

        PageAnalysis {
            image: page,
            assessment,
            edges,
        }
    }
}

impl std::fmt::Debug for ScanPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanPipeline")
            .field("filter", &self.filter.as_ref().map(|s| s.name()))
            .field("scorer", &self.scorer)
            .field("detector", &self.detector.as_ref().map(|s| s.name()))
            .finish()
    }
}
