//! Crop command - cut regions out of a page into separate JPEGs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use gradescan_adapters::{load_image, CropWriter};
use gradescan_core::raster::JPEG_QUALITY;
use gradescan_core::{
    crop_regions, DataUrl, DrawerConfig, ExtractionResponse, Point, Region, RegionDrawer,
    ScanError,
};
use image::DynamicImage;
use serde::Serialize;
use tracing::{info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::to_json;

/// A drag gesture in screen coordinates: start point plus signed extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Parse `X,Y,W,H`. Negative extents describe a drag up or to the left.
fn parse_screen_rect(s: &str) -> Result<ScreenRect, String> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("'{part}' is not a valid number"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    match values[..] {
        [x, y, width, height] => Ok(ScreenRect {
            x,
            y,
            width,
            height,
        }),
        _ => Err(format!("expected X,Y,W,H, got '{s}'")),
    }
}

/// Parse a zoom factor. Range clamping happens in the drawer.
fn parse_zoom(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|z| z.is_finite() && *z > 0.0)
        .ok_or_else(|| format!("'{s}' is not a positive number"))
}

/// Arguments for the crop command.
#[derive(Args, Clone)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["regions", "response"])
))]
pub struct CropArgs {
    /// Page image to crop from
    pub image: PathBuf,

    /// Region drawn on screen as X,Y,W,H (repeatable)
    #[arg(long = "region", value_name = "X,Y,W,H", value_parser = parse_screen_rect)]
    pub regions: Vec<ScreenRect>,

    /// Extraction response JSON with per-student regions
    #[arg(long, value_name = "FILE")]
    pub response: Option<PathBuf>,

    /// Display zoom the --region rectangles were drawn at (0.3-2.0)
    #[arg(long, value_parser = parse_zoom)]
    pub zoom: Option<f64>,

    /// Directory to write `<region-id>.jpg` files into
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Pretty-print the JSON summary
    #[arg(long)]
    pub pretty: bool,
}

/// Summary printed after cropping.
#[derive(Debug, Serialize)]
struct CropSummary {
    regions: Vec<Region>,
    files: Vec<PathBuf>,
    /// Student names, for regions taken from an extraction response.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    students: Vec<String>,
}

/// Run the crop command.
pub fn run(args: &CropArgs, config: &AppConfig) -> Result<ExitCode> {
    let image = load_image(&args.image)?;
    let quality = config.regions.jpeg_quality.unwrap_or(JPEG_QUALITY);

    let (regions, crops, students) = match &args.response {
        Some(path) => crop_from_response(&image, path, quality)?,
        None => {
            let (regions, crops) = crop_from_gestures(&image, args, config, quality)?;
            (regions, crops, Vec::new())
        }
    };

    let writer = CropWriter::create(&args.out)?;
    let files = writer.write_all(&regions, &crops)?;
    info!(
        count = files.len(),
        dir = %writer.dir().display(),
        "Crops written"
    );

    let summary = CropSummary {
        regions,
        files,
        students,
    };
    println!("{}", to_json(&summary, args.pretty)?);

    Ok(ExitCode::Success)
}

/// Replays each screen rectangle as a drag through the region drawer.
fn crop_from_gestures(
    image: &DynamicImage,
    args: &CropArgs,
    config: &AppConfig,
    quality: u8,
) -> Result<(Vec<Region>, Vec<DataUrl>)> {
    let defaults = DrawerConfig::default();
    let drawer_config = DrawerConfig {
        min_size: config.regions.min_size.unwrap_or(defaults.min_size),
        jpeg_quality: quality,
    };
    let mut drawer = RegionDrawer::with_config(image.width(), image.height(), drawer_config);
    if let Some(zoom) = args.zoom.or(config.regions.zoom) {
        drawer.set_zoom(zoom);
    }

    for rect in &args.regions {
        drawer.pointer_down(Point::new(rect.x, rect.y));
        drawer.pointer_move(Point::new(
            rect.x + rect.width / 2.0,
            rect.y + rect.height / 2.0,
        ));
        let end = Point::new(rect.x + rect.width, rect.y + rect.height);
        if drawer.pointer_up(end).is_none() {
            warn!(
                "Region {},{},{},{} is too small at zoom {}, skipped",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                drawer.zoom()
            );
        }
    }

    let confirmation = drawer
        .confirm(image)
        .with_context(|| format!("Cannot crop {}", args.image.display()))?;
    Ok((confirmation.regions, confirmation.images))
}

/// Crops the student regions named in an extraction response.
fn crop_from_response(
    image: &DynamicImage,
    path: &Path,
    quality: u8,
) -> Result<(Vec<Region>, Vec<DataUrl>, Vec<String>)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read response: {}", path.display()))?;
    let response = ExtractionResponse::parse(&text)
        .with_context(|| format!("Invalid extraction response: {}", path.display()))?;

    let regions = response.to_regions(image.width(), image.height());
    if regions.is_empty() {
        return Err(ScanError::NoRegions)
            .with_context(|| format!("Cannot crop {}", path.display()));
    }
    let crops = crop_regions(image, &regions, quality)?;
    let students = response.students.into_iter().map(|s| s.name).collect();
    Ok((regions, crops, students))
}
