//! Check command - score pages for blur.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use gradescan_adapters::FsPageSource;
use gradescan_core::modules::{
    BlurConfig, BlurScorer, CornerConfig, HoughCornerDetector, PhotocopyConfig, PhotocopyFilter,
};
use gradescan_core::{
    Batch, PageSource, ProgressEvent, ProgressSink, ReportOutput, ScanPipeline, ScanReport,
};
use tracing::{debug, info};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Parse and validate a quality threshold (0-100).
fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0..=100"))
    }
}

/// Shared arguments for page scoring.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Files or directories to check
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Run the photocopy filter before scoring
    #[arg(long)]
    pub photocopy: bool,

    /// Detect page corners and include them in reports
    #[arg(long)]
    pub corners: bool,

    /// Minimum blur score for `good` (0-100)
    #[arg(long, value_parser = parse_threshold)]
    pub good_threshold: Option<f64>,

    /// Minimum blur score for `medium` (0-100)
    #[arg(long, value_parser = parse_threshold)]
    pub medium_threshold: Option<f64>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl CheckArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in the core config types)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    ///
    /// Boolean flags can only be switched on from the command line; config
    /// applies when the flag was not passed.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }
        if !args.photocopy {
            args.photocopy = config.photocopy.enabled.unwrap_or(false);
        }
        if !args.corners {
            args.corners = config.corners.enabled.unwrap_or(false);
        }

        args.good_threshold = args.good_threshold.or(config.blur.good_threshold);
        args.medium_threshold = args.medium_threshold.or(config.blur.medium_threshold);

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        // Kept for build_pipeline's advanced settings
        args.config = Some(config.clone());

        args
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }

    /// Blur settings: CLI thresholds over config over defaults.
    fn blur_config(&self) -> Result<BlurConfig> {
        let defaults = BlurConfig::default();
        let blur = self.config.as_ref().map(|c| &c.blur);
        let config = BlurConfig {
            max_dimension: blur
                .and_then(|b| b.max_dimension)
                .unwrap_or(defaults.max_dimension),
            variance_divisor: blur
                .and_then(|b| b.variance_divisor)
                .unwrap_or(defaults.variance_divisor),
            good_threshold: self.good_threshold.unwrap_or(defaults.good_threshold),
            medium_threshold: self.medium_threshold.unwrap_or(defaults.medium_threshold),
        };
        if config.medium_threshold > config.good_threshold {
            anyhow::bail!(
                "medium threshold ({}) must not exceed good threshold ({})",
                config.medium_threshold,
                config.good_threshold
            );
        }
        Ok(config)
    }
}

/// Result of running the check command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct CheckResult {
    /// Number of pages scored.
    pub processed: usize,
    /// Number of pages skipped.
    pub skipped: usize,
    /// Number of pages scored `poor`.
    pub poor: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the check command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &CheckArgs) -> Result<CheckResult> {
    info!("Running check command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let pipeline = build_pipeline(args)?;

    let source = FsPageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let output = JsonOutput::stdout(args.format(), args.pretty);

    process_pages(&source, &pipeline, &output, &progress_bar)
}

/// Build the scan pipeline from merged args (CLI + config).
fn build_pipeline(args: &CheckArgs) -> Result<ScanPipeline> {
    let config = args.config.as_ref();
    let mut pipeline = ScanPipeline::new(BlurScorer::new(args.blur_config()?));

    if args.photocopy {
        let defaults = PhotocopyConfig::default();
        let filter_config = PhotocopyConfig {
            block_radius: config
                .and_then(|c| c.photocopy.block_radius)
                .unwrap_or(defaults.block_radius),
            ..defaults
        };
        pipeline = pipeline.with_filter(PhotocopyFilter::new(filter_config));
        debug!("Enabled photocopy filter");
    }

    if args.corners {
        let defaults = CornerConfig::default();
        let detector_config = CornerConfig {
            max_dimension: config
                .and_then(|c| c.corners.max_dimension)
                .unwrap_or(defaults.max_dimension),
            ..defaults
        };
        pipeline = pipeline.with_detector(HoughCornerDetector::new(detector_config));
        debug!("Enabled corner detection");
    }

    Ok(pipeline)
}

/// Score every page from `source`, reporting as it goes.
fn process_pages(
    source: &dyn PageSource,
    pipeline: &ScanPipeline,
    output: &dyn ReportOutput,
    progress: &dyn ProgressSink,
) -> Result<CheckResult> {
    let total = source.count_hint();
    let mut skipped = 0usize;
    let mut poor = 0usize;
    let mut batch = Batch::new();

    for (index, page) in source.pages().enumerate() {
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                debug!(path = %e.path, "Page could not be loaded");
                progress.on_event(ProgressEvent::Skipped {
                    path: e.path,
                    reason: format!("{:#}", e.error),
                });
                skipped += 1;
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            path: page.path.clone(),
            index,
            total,
        });

        let report = ScanReport::new(page.path, batch.capture(page.data_url, pipeline));
        if report.is_poor() {
            poor += 1;
        }

        output.write(&report)?;
        progress.on_event(ProgressEvent::Completed { report });
    }

    output.flush()?;

    let processed = batch.len();
    progress.on_event(ProgressEvent::Finished { processed, skipped });

    let exit_code = if batch.has_poor_pages() {
        ExitCode::IssuesFound
    } else {
        ExitCode::Success
    };
    info!(processed, skipped, poor, "Check finished");

    Ok(CheckResult {
        processed,
        skipped,
        poor,
        exit_code,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gradescan_core::Quality;
    use gradescan_test_support::{
        MockPageSource, MockProgressSink, MockReportOutput, SyntheticImageBuilder,
    };

    fn args() -> CheckArgs {
        CheckArgs {
            paths: vec![],
            recursive: false,
            photocopy: false,
            corners: false,
            good_threshold: None,
            medium_threshold: None,
            progress: false,
            quiet: true,
            format: None,
            pretty: false,
            config: None,
        }
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("40"), Ok(40.0));
        assert!(parse_threshold("101").is_err());
        assert!(parse_threshold("sharp").is_err());
    }

    #[test]
    fn test_sharp_and_blurry_pages() {
        let source = MockPageSource::from_images(vec![
            ("sharp.png", SyntheticImageBuilder::sharp_image()),
            ("blurry.png", SyntheticImageBuilder::blurry_image()),
        ]);
        let output = MockReportOutput::new();
        let progress = MockProgressSink::new();

        let result =
            process_pages(&source, &ScanPipeline::default(), &output, &progress).unwrap();

        assert_eq!(result.processed, 2);
        assert_eq!(result.poor, 1);
        assert_eq!(result.exit_code, ExitCode::IssuesFound);

        let reports = output.reports();
        assert_eq!(reports[0].path, "sharp.png");
        assert_eq!(reports[0].quality, Quality::Good);
        assert_eq!(reports[1].quality, Quality::Poor);
        assert_eq!(output.flush_count(), 1);
        assert_eq!(progress.completed_count(), 2);
        assert_eq!(progress.finished_counts(), Some((2, 0)));
    }

    #[test]
    fn test_load_failure_is_skipped() {
        let source =
            MockPageSource::from_images(vec![("sharp.png", SyntheticImageBuilder::sharp_image())])
                .with_failure("scans/missing.png", "permission denied");
        let output = MockReportOutput::new();
        let progress = MockProgressSink::new();

        let result =
            process_pages(&source, &ScanPipeline::default(), &output, &progress).unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(result.exit_code, ExitCode::Success);
        assert_eq!(progress.skipped_count(), 1);
        assert_eq!(progress.skipped_paths(), vec!["scans/missing.png".to_owned()]);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_empty_source_succeeds() {
        let output = MockReportOutput::new();
        let progress = MockProgressSink::new();
        let result = process_pages(
            &MockPageSource::empty(),
            &ScanPipeline::default(),
            &output,
            &progress,
        )
        .unwrap();
        assert_eq!(result.processed, 0);
        assert_eq!(result.exit_code, ExitCode::Success);
        assert!(progress.has_finished());
    }

    #[test]
    fn test_corner_detection_reaches_reports() {
        let page = SyntheticImageBuilder::page_on_desk(400, 300, (60, 50, 280, 200));
        let source = MockPageSource::from_images(vec![("desk.png", page)]);
        let output = MockReportOutput::new();

        let mut with_corners = args();
        with_corners.corners = true;
        let pipeline = build_pipeline(&with_corners).unwrap();
        process_pages(&source, &pipeline, &output, &MockProgressSink::new()).unwrap();

        assert!(output.reports()[0].edges.is_some());
    }

    #[test]
    fn test_config_layering() {
        let config: AppConfig = toml::from_str(
            r"
[general]
recursive = true

[blur]
good_threshold = 70.0
medium_threshold = 30.0

[output]
format = 'json'
",
        )
        .unwrap();

        let mut cli = args();
        cli.good_threshold = Some(60.0);
        let merged = CheckArgs::with_config(cli, &config);

        assert!(merged.recursive);
        assert_eq!(merged.format(), OutputFormat::Json);
        let blur = merged.blur_config().unwrap();
        assert!((blur.good_threshold - 60.0).abs() < f64::EPSILON);
        assert!((blur.medium_threshold - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut cli = args();
        cli.good_threshold = Some(10.0);
        cli.medium_threshold = Some(50.0);
        assert!(build_pipeline(&cli).is_err());
    }
}
