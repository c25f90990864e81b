//! gradescan core: domain logic and image algorithms
//!
//! This crate contains the domain types, the blur scorer, the manual region
//! drawer, the photocopy filter, corner detection with perspective
//! rectification, the page batch, and the port traits adapters implement.

pub mod batch;
pub mod domain;
pub mod drawer;
pub mod error;
pub mod extraction;
pub mod modules;
pub mod pipeline;
pub mod ports;
pub mod raster;

pub use batch::{Batch, BatchImage};
pub use domain::{
    BlurAssessment, Corner, CornerDetector, DetectedEdge, DocumentFilter, ImageDimensions,
    NormalizedPoint, Point, Quality, Region, ScanReport,
};
pub use drawer::{crop_regions, Confirmation, DrawState, DrawerConfig, RegionDrawer};
pub use error::{Result, ScanError};
pub use extraction::{ExtractionResponse, FractionalRect, StudentRegion};
pub use pipeline::{PageAnalysis, ScanPipeline};
pub use ports::{PageLoadError, PageSource, ProgressEvent, ProgressSink, ReportOutput, SourcePage};
pub use raster::DataUrl;
