//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use gradescan_core::domain::ScanReport;
use gradescan_core::ports::{
    PageLoadError, PageSource, ProgressEvent, ProgressSink, ReportOutput, SourcePage,
};
use image::DynamicImage;

use crate::builders::png_data_url;

/// Mock implementation of `PageSource` for testing.
///
/// Yields pre-built pages (or load failures) and tracks iteration for
/// assertions.
pub struct MockPageSource {
    pages: Vec<Result<SourcePage, (String, String)>>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockPageSource {
    /// Creates a new mock source with the given pages.
    #[must_use]
    pub fn new(pages: Vec<SourcePage>) -> Self {
        Self {
            pages: pages.into_iter().map(Ok).collect(),
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates a source from labelled images, each encoded as PNG.
    #[must_use]
    pub fn from_images(images: Vec<(&str, DynamicImage)>) -> Self {
        Self::new(
            images
                .into_iter()
                .map(|(path, image)| SourcePage {
                    path: path.to_owned(),
                    data_url: png_data_url(&image),
                })
                .collect(),
        )
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Appends an entry at `path` that fails to load with `reason`.
    #[must_use]
    pub fn with_failure(mut self, path: &str, reason: &str) -> Self {
        self.pages.push(Err((path.to_owned(), reason.to_owned())));
        self
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl PageSource for MockPageSource {
    fn pages(&self) -> Box<dyn Iterator<Item = Result<SourcePage, PageLoadError>> + Send + '_> {
        let count = Arc::clone(&self.iteration_count);
        if let Ok(mut c) = count.lock() {
            *c += 1;
        }
        Box::new(self.pages.iter().map(|page| match page {
            Ok(page) => Ok(page.clone()),
            Err((path, reason)) => Err(PageLoadError::new(
                path.clone(),
                anyhow::anyhow!("{reason}"),
            )),
        }))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.pages.len())
    }
}

/// Mock implementation of `ReportOutput` for testing.
///
/// Captures reports for later assertions.
pub struct MockReportOutput {
    reports: Arc<Mutex<Vec<ScanReport>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockReportOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured reports.
    #[must_use]
    pub fn reports(&self) -> Vec<ScanReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockReportOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportOutput for MockReportOutput {
    fn write(&self, report: &ScanReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Skipped { .. }))
            .count()
    }

    /// Returns the paths of `Skipped` events, in order.
    #[must_use]
    pub fn skipped_paths(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Skipped { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns whether a `Finished` event was received.
    #[must_use]
    pub fn has_finished(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::Finished { .. }))
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::SyntheticImageBuilder;
    use gradescan_core::domain::Quality;
    use gradescan_core::{Batch, ScanPipeline};

    #[test]
    fn test_mock_page_source_empty() {
        let source = MockPageSource::empty();
        assert_eq!(source.count_hint(), Some(0));
        assert_eq!(source.pages().count(), 0);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_page_source_with_pages_and_failure() {
        let source =
            MockPageSource::from_images(vec![("page.png", SyntheticImageBuilder::sharp_image())])
                .with_failure("torn.png", "unreadable");

        assert_eq!(source.count_hint(), Some(2));
        let pages: Vec<_> = source.pages().collect();
        assert_eq!(pages[0].as_ref().unwrap().path, "page.png");
        let err = pages[1].as_ref().unwrap_err();
        assert_eq!(err.path, "torn.png");
        assert_eq!(err.to_string(), "torn.png: unreadable");
    }

    #[test]
    fn test_mock_report_output() {
        let output = MockReportOutput::new();

        let mut batch = Batch::new();
        let page = batch.capture(
            png_data_url(&SyntheticImageBuilder::sharp_image()),
            &ScanPipeline::default(),
        );
        let report = ScanReport::new("page.jpg", page);
        assert_eq!(report.quality, Quality::Good);

        output.write(&report).unwrap();
        output.flush().unwrap();

        assert_eq!(output.reports().len(), 1);
        assert_eq!(output.reports()[0].path, "page.jpg");
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();

        sink.on_event(ProgressEvent::Started {
            path: "page.jpg".into(),
            index: 0,
            total: Some(1),
        });

        sink.on_event(ProgressEvent::Finished {
            processed: 1,
            skipped: 0,
        });

        assert_eq!(sink.started_count(), 1);
        assert!(sink.has_finished());
        assert_eq!(sink.finished_counts(), Some((1, 0)));
    }
}
