//! Progress reporting port for UI integration.

use crate::domain::ScanReport;

/// Events emitted while scanning a set of pages.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Scanning started for a page.
    Started {
        /// Path to the page.
        path: String,
        /// Index in the run (0-based).
        index: usize,
        /// Total pages, if known.
        total: Option<usize>,
    },
    /// A page was scanned.
    Completed {
        /// The scan report.
        report: ScanReport,
    },
    /// A page was skipped because it could not be loaded.
    Skipped {
        /// Path to the page.
        path: String,
        /// Reason for skipping.
        reason: String,
    },
    /// All pages have been processed.
    Finished {
        /// Pages scanned.
        processed: usize,
        /// Pages skipped.
        skipped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
