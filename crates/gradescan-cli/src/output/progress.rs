//! Per-page feedback on stderr: an indicatif bar, or plain notices for pages
//! that need rescanning.

use gradescan_core::{ProgressEvent, ProgressSink, ScanReport};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

/// Progress reporter for the check command.
pub struct ProgressBar {
    bar: Option<IndicatifBar>,
    quiet: bool,
}

impl ProgressBar {
    /// Creates a reporter.
    ///
    /// `total` sizes the bar when known. `quiet` silences everything;
    /// otherwise `show_bar` picks the bar over plain notices.
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        if quiet || !show_bar {
            return Self { bar: None, quiet };
        }

        let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
        {
            bar.set_style(style.progress_chars("=> "));
        }

        Self {
            bar: Some(bar),
            quiet,
        }
    }

    fn notice(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }
}

/// Line printed for a page that should be rescanned.
fn rescan_notice(report: &ScanReport) -> String {
    format!(
        "{}: poor quality (blur score {:.1}), rescan recommended",
        report.path, report.blur_score
    )
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::Started { path, index, total } => {
                if let Some(bar) = &self.bar {
                    if let Some(t) = total {
                        bar.set_length(t as u64);
                    }
                    bar.set_position(index as u64);
                    bar.set_message(path);
                }
            }
            ProgressEvent::Completed { report } => {
                if report.is_poor() {
                    self.notice(&rescan_notice(&report));
                }
                if let Some(bar) = &self.bar {
                    bar.set_message(format!("{} [{}]", report.path, report.quality));
                    bar.inc(1);
                }
            }
            ProgressEvent::Skipped { path, reason } => {
                self.notice(&format!("WARN: Skipping {path}: {reason}"));
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }
            ProgressEvent::Finished { processed, skipped } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!("{processed} scanned, {skipped} skipped"));
                }
            }
        }
    }
}
