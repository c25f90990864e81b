//! Rectify command - straighten a photographed page.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gradescan_adapters::{load_image, save_image};
use gradescan_core::modules::{perspective, CornerConfig, HoughCornerDetector};
use gradescan_core::{Corner, CornerDetector, DetectedEdge, ImageDimensions};
use serde::Serialize;
use tracing::{debug, info};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::to_json;

/// A manual corner placement, in fractions of the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerOverride {
    pub corner: Corner,
    pub x: f64,
    pub y: f64,
}

/// Parse `NAME=X,Y`, e.g. `top-left=0.1,0.05`.
fn parse_corner(s: &str) -> Result<CornerOverride, String> {
    let (name, position) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=X,Y, got '{s}'"))?;
    let corner = name.trim().parse::<Corner>()?;
    let (x, y) = position
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y after '=', got '{position}'"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| (0.0..=1.0).contains(v))
            .ok_or_else(|| format!("'{v}' is not a number in 0..=1"))
    };
    Ok(CornerOverride {
        corner,
        x: coord(x)?,
        y: coord(y)?,
    })
}

/// Arguments for the rectify command.
#[derive(Args, Clone)]
pub struct RectifyArgs {
    /// Page photo to straighten
    pub image: PathBuf,

    /// Output image path (format from extension)
    #[arg(long, value_name = "FILE")]
    pub out: PathBuf,

    /// Place a corner manually as NAME=X,Y in 0-1 fractions (repeatable)
    #[arg(long = "corner", value_name = "NAME=X,Y", value_parser = parse_corner)]
    pub corners: Vec<CornerOverride>,

    /// Skip automatic detection and start from the full frame
    #[arg(long)]
    pub no_detect: bool,

    /// Pretty-print the JSON summary
    #[arg(long)]
    pub pretty: bool,
}

/// Summary printed after rectifying.
#[derive(Debug, Serialize)]
struct RectifySummary {
    /// Whether corners came from detection rather than the full frame.
    detected: bool,
    edges: DetectedEdge,
    dimensions: ImageDimensions,
    out: PathBuf,
}

/// Run the rectify command.
pub fn run(args: &RectifyArgs, config: &AppConfig) -> Result<ExitCode> {
    let image = load_image(&args.image)?;

    let detected = if args.no_detect {
        None
    } else {
        let defaults = CornerConfig::default();
        let detector = HoughCornerDetector::new(CornerConfig {
            max_dimension: config
                .corners
                .max_dimension
                .unwrap_or(defaults.max_dimension),
            ..defaults
        });
        detector.detect(&image)
    };
    if detected.is_none() && !args.no_detect {
        info!("No page boundary found, using the full frame");
    }

    let mut edges = detected.unwrap_or_default();
    for placement in &args.corners {
        debug!(?placement, "Applying manual corner");
        edges.move_corner(placement.corner, placement.x, placement.y);
    }

    let rectified = perspective::rectify(&image, &edges)
        .with_context(|| format!("Cannot rectify {}", args.image.display()))?;
    save_image(&rectified, &args.out)?;

    let summary = RectifySummary {
        detected: detected.is_some(),
        edges,
        dimensions: ImageDimensions::new(rectified.width(), rectified.height()),
        out: args.out.clone(),
    };
    println!("{}", to_json(&summary, args.pretty)?);

    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_corner() {
        assert_eq!(
            parse_corner("top-left=0.1,0.25"),
            Ok(CornerOverride {
                corner: Corner::TopLeft,
                x: 0.1,
                y: 0.25,
            })
        );
        assert_eq!(parse_corner("br=1,1").map(|c| c.corner), Ok(Corner::BottomRight));
        assert!(parse_corner("middle=0.5,0.5").is_err());
        assert!(parse_corner("tl=0.5").is_err());
        assert!(parse_corner("tl=1.5,0").is_err());
        assert!(parse_corner("tl").is_err());
    }
}
