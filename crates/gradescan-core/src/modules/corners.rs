//! Document corner detection.
//!
//! Finds the page quadrilateral in a photo from its four dominant straight
//! edges:
//!
//! 1. Downscale, convert to grayscale, Gaussian blur (sigma 2.0)
//! 2. Canny edge detection
//! 3. Hough line detection
//! 4. Split lines into roughly horizontal and roughly vertical
//! 5. Take the outermost line on each side of the page
//! 6. Intersect neighbouring sides to get the corners
//!
//! Anything that fails to produce a plausible quadrilateral returns `None`
//! and the caller keeps the full frame.

use image::imageops::FilterType;
use image::DynamicImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};
use tracing::{debug, warn};

use crate::domain::{CornerDetector, DetectedEdge, NormalizedPoint};

/// Configuration for corner detection.
#[derive(Debug, Clone)]
pub struct CornerConfig {
    /// Longer side of the working copy, in pixels.
    pub max_dimension: u32,
    /// Minimum quadrilateral area as a fraction of the image area.
    pub min_area_fraction: f32,
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            max_dimension: 512,
            min_area_fraction: 0.10,
        }
    }
}

/// Edge + Hough-line page boundary detector.
#[derive(Debug, Clone, Default)]
pub struct HoughCornerDetector {
    config: CornerConfig,
}

impl HoughCornerDetector {
    #[must_use]
    pub const fn new(config: CornerConfig) -> Self {
        Self { config }
    }
}

impl CornerDetector for HoughCornerDetector {
    fn name(&self) -> &'static str {
        "hough"
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn detect(&self, image: &DynamicImage) -> Option<DetectedEdge> {
        let longer = image.width().max(image.height());
        if longer < 8 {
            return None;
        }
        let working = if longer > self.config.max_dimension {
            image.resize(
                self.config.max_dimension,
                self.config.max_dimension,
                FilterType::Triangle,
            )
        } else {
            image.clone()
        };
        let (w, h) = (working.width(), working.height());

        let blurred = gaussian_blur_f32(&working.to_luma8(), 2.0);
        let edges = canny(&blurred, 50.0, 150.0);

        let diagonal = f64::from(w).hypot(f64::from(h));
        let vote_threshold = (diagonal * 0.25).max(40.0) as u32;
        let lines = detect_lines(
            &edges,
            LineDetectionOptions {
                vote_threshold,
                suppression_radius: 8,
            },
        );
        debug!(line_count = lines.len(), vote_threshold, "Hough lines detected");

        let (horizontal, vertical) = classify_lines(&lines);
        if horizontal.len() < 2 || vertical.len() < 2 {
            debug!(
                horizontal = horizontal.len(),
                vertical = vertical.len(),
                "Not enough page edges"
            );
            return None;
        }

        let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
        let (top, bottom) = extremes(&horizontal, |l| y_at(l, cx))?;
        let (left, right) = extremes(&vertical, |l| x_at(l, cy))?;

        let quad = [
            intersect(&top, &left)?,
            intersect(&top, &right)?,
            intersect(&bottom, &right)?,
            intersect(&bottom, &left)?,
        ];

        let area = shoelace_area(&quad);
        let min_area = (w as f32) * (h as f32) * self.config.min_area_fraction;
        if area < min_area {
            warn!(area, min_area, "Detected page quadrilateral too small");
            return None;
        }

        let norm = |(x, y): (f32, f32)| {
            NormalizedPoint::new(f64::from(x) / f64::from(w), f64::from(y) / f64::from(h))
        };
        Some(DetectedEdge {
            top_left: norm(quad[0]),
            top_right: norm(quad[1]),
            bottom_right: norm(quad[2]),
            bottom_left: norm(quad[3]),
        })
    }
}

/// Splits lines by their normal angle: within 30 degrees of 90 is horizontal,
/// within 30 degrees of 0 or 180 is vertical. Diagonals are dropped.
fn classify_lines(lines: &[PolarLine]) -> (Vec<PolarLine>, Vec<PolarLine>) {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();

    for line in lines {
        let angle = line.angle_in_degrees;
        if (60..=120).contains(&angle) {
            horizontal.push(*line);
        } else if angle <= 30 || angle >= 150 {
            vertical.push(*line);
        }
    }

    (horizontal, vertical)
}

/// Lines with the smallest and largest `position`.
fn extremes(
    lines: &[PolarLine],
    position: impl Fn(&PolarLine) -> Option<f32>,
) -> Option<(PolarLine, PolarLine)> {
    let mut placed: Vec<(f32, PolarLine)> = lines
        .iter()
        .filter_map(|l| position(l).map(|p| (p, *l)))
        .collect();
    if placed.len() < 2 {
        return None;
    }
    placed.sort_by(|a, b| a.0.total_cmp(&b.0));
    Some((placed[0].1, placed[placed.len() - 1].1))
}

/// `y` where a (near-horizontal) line crosses the vertical `x = at`.
fn y_at(line: &PolarLine, at: f32) -> Option<f32> {
    let theta = (line.angle_in_degrees as f32).to_radians();
    let sin = theta.sin();
    (sin.abs() > 1e-3).then(|| (line.r - at * theta.cos()) / sin)
}

/// `x` where a (near-vertical) line crosses the horizontal `y = at`.
fn x_at(line: &PolarLine, at: f32) -> Option<f32> {
    let theta = (line.angle_in_degrees as f32).to_radians();
    let cos = theta.cos();
    (cos.abs() > 1e-3).then(|| (line.r - at * theta.sin()) / cos)
}

/// Intersection of two lines `x cos(t) + y sin(t) = r`. `None` if parallel.
#[allow(clippy::cast_possible_truncation)]
fn intersect(a: &PolarLine, b: &PolarLine) -> Option<(f32, f32)> {
    let (ta, tb) = (
        f64::from(a.angle_in_degrees).to_radians(),
        f64::from(b.angle_in_degrees).to_radians(),
    );
    let denom = ta.cos() * tb.sin() - ta.sin() * tb.cos();
    if denom.abs() < 1e-6 {
        return None;
    }
    let (ra, rb) = (f64::from(a.r), f64::from(b.r));
    let x = (ra * tb.sin() - rb * ta.sin()) / denom;
    let y = (rb * ta.cos() - ra * tb.cos()) / denom;
    Some((x as f32, y as f32))
}

/// Area of a simple polygon given its vertices in order.
fn shoelace_area(corners: &[(f32, f32); 4]) -> f32 {
    let mut area = 0.0f32;
    for i in 0..corners.len() {
        let j = (i + 1) % corners.len();
        area += corners[i].0 * corners[j].1 - corners[j].0 * corners[i].1;
    }
    area.abs() / 2.0
}
