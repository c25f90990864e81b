//! Configuration file support for gradescan.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/gradescan/config.toml` (lowest priority)
//! - Project-local: `.gradescan.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Blur scoring settings.
    pub blur: BlurConfig,
    /// Photocopy filter settings.
    pub photocopy: PhotocopyConfig,
    /// Corner detection settings.
    pub corners: CornersConfig,
    /// Region drawing and cropping settings.
    pub regions: RegionsConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Blur scoring configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Longer side of the scoring copy, in pixels.
    pub max_dimension: Option<u32>,
    /// Laplacian variance divisor.
    pub variance_divisor: Option<f64>,
    /// Minimum score for `good` (0-100).
    pub good_threshold: Option<f64>,
    /// Minimum score for `medium` (0-100).
    pub medium_threshold: Option<f64>,
}

/// Photocopy filter configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PhotocopyConfig {
    /// Run the filter before scoring.
    pub enabled: Option<bool>,
    /// Minimum background window radius in pixels.
    pub block_radius: Option<u32>,
}

/// Corner detection configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CornersConfig {
    /// Detect page corners during `check`.
    pub enabled: Option<bool>,
    /// Longer side of the detection copy, in pixels.
    pub max_dimension: Option<u32>,
}

/// Region drawing configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RegionsConfig {
    /// Both sides of a drawn region must exceed this many pixels.
    pub min_size: Option<u32>,
    /// Display zoom the region rectangles are given in.
    pub zoom: Option<f64>,
    /// JPEG quality for crops (1-100).
    pub jpeg_quality: Option<u8>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/gradescan/config.toml`
    /// 2. Project-local: `.gradescan.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are dropped with a
    /// warning.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        for message in config.sanitize() {
            eprintln!("warning: {message}, using the default");
        }

        config
    }

    /// Drops every out-of-range value so the built-in default applies
    /// instead, returning one message per dropped key.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut dropped = Vec::new();

        for (name, value) in [
            ("blur.good_threshold", &mut self.blur.good_threshold),
            ("blur.medium_threshold", &mut self.blur.medium_threshold),
        ] {
            drop_invalid(value, name, "0-100", |t| (0.0..=100.0).contains(&t), &mut dropped);
        }
        if let (Some(medium), Some(good)) = (self.blur.medium_threshold, self.blur.good_threshold) {
            if medium > good {
                dropped.push(format!(
                    "blur.medium_threshold ({medium}) must not exceed blur.good_threshold ({good})"
                ));
                self.blur.medium_threshold = None;
                self.blur.good_threshold = None;
            }
        }
        drop_invalid(
            &mut self.blur.variance_divisor,
            "blur.variance_divisor",
            "positive",
            |d| d.is_finite() && d > 0.0,
            &mut dropped,
        );
        for (name, value) in [
            ("blur.max_dimension", &mut self.blur.max_dimension),
            ("corners.max_dimension", &mut self.corners.max_dimension),
        ] {
            drop_invalid(value, name, "at least 3", |d| d >= 3, &mut dropped);
        }

        drop_invalid(
            &mut self.regions.zoom,
            "regions.zoom",
            "0.3-2.0",
            |z| (0.3..=2.0).contains(&z),
            &mut dropped,
        );
        drop_invalid(
            &mut self.regions.jpeg_quality,
            "regions.jpeg_quality",
            "1-100",
            |q| (1..=100).contains(&q),
            &mut dropped,
        );

        if let Some(f) = self
            .output
            .format
            .take_if(|f| f.as_str() != "json" && f.as_str() != "jsonl")
        {
            dropped.push(format!("output.format must be 'json' or 'jsonl', got '{f}'"));
        }

        dropped
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // General
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        // Blur
        self.blur.max_dimension = other.blur.max_dimension.or(self.blur.max_dimension);
        self.blur.variance_divisor = other.blur.variance_divisor.or(self.blur.variance_divisor);
        self.blur.good_threshold = other.blur.good_threshold.or(self.blur.good_threshold);
        self.blur.medium_threshold = other.blur.medium_threshold.or(self.blur.medium_threshold);

        // Photocopy
        self.photocopy.enabled = other.photocopy.enabled.or(self.photocopy.enabled);
        self.photocopy.block_radius = other.photocopy.block_radius.or(self.photocopy.block_radius);

        // Corners
        self.corners.enabled = other.corners.enabled.or(self.corners.enabled);
        self.corners.max_dimension = other.corners.max_dimension.or(self.corners.max_dimension);

        // Regions
        self.regions.min_size = other.regions.min_size.or(self.regions.min_size);
        self.regions.zoom = other.regions.zoom.or(self.regions.zoom);
        self.regions.jpeg_quality = other.regions.jpeg_quality.or(self.regions.jpeg_quality);

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gradescan").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.gradescan.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".gradescan.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Clears `field` when its value breaks `valid`.
fn drop_invalid<T: Copy + std::fmt::Display>(
    field: &mut Option<T>,
    name: &str,
    expected: &str,
    valid: impl Fn(T) -> bool,
    dropped: &mut Vec<String>,
) {
    if let Some(value) = field.take_if(|v| !valid(*v)) {
        dropped.push(format!("{name} must be {expected}, got {value}"));
    }
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
