//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external adapters.

mod page_source;
mod progress;
mod report_output;

pub use page_source::{PageLoadError, PageSource, SourcePage};
pub use progress::{ProgressEvent, ProgressSink};
pub use report_output::ReportOutput;
