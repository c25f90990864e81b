//! Test support utilities for gradescan.
//!
//! Provides mocks, synthetic page builders, and file helpers for testing
//! the scan pipeline.
//!
//! # Example
//!
//! ```
//! use gradescan_test_support::{MockPageSource, SyntheticImageBuilder};
//!
//! // Create synthetic test pages
//! let sharp = SyntheticImageBuilder::checkerboard(128, 128);
//! let blurry = SyntheticImageBuilder::uniform_gray(128, 128, 128);
//!
//! // Create mock page source
//! let source = MockPageSource::from_images(vec![("sharp.png", sharp), ("blurry.png", blurry)]);
//! ```

mod builders;
mod mocks;

pub use builders::{png_data_url, write_image, SyntheticImageBuilder};
pub use mocks::{MockPageSource, MockProgressSink, MockReportOutput};
