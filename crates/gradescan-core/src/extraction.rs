//! Typed form of the grading service's per-student region payload.
//!
//! ```json
//! { "students": [ { "name": "Ana", "region": { "x": 0.0, "y": 0.0, "width": 0.5, "height": 1.0 } } ] }
//! ```
//!
//! Region coordinates are fractions of the source image. The payload is
//! validated as a whole: one bad entry rejects all of it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Region;
use crate::error::{Result, ScanError};

const TOLERANCE: f64 = 1e-6;

/// A validated extraction response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResponse {
    pub students: Vec<StudentRegion>,
}

/// One student's area of the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRegion {
    pub name: String,
    /// `None` when the student occupies the whole page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<FractionalRect>,
}

/// Rectangle in fractions of image width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FractionalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Deserialize)]
struct WireResponse {
    students: Vec<WireStudent>,
}

#[derive(Deserialize)]
struct WireStudent {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    region: Option<WireRect>,
}

#[derive(Deserialize)]
struct WireRect {
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
}

impl ExtractionResponse {
    /// Parses and validates a JSON payload.
    ///
    /// # Errors
    ///
    /// - [`ScanError::Json`] if the text is not JSON of the expected shape
    /// - [`ScanError::MalformedPayload`] naming the first invalid student
    pub fn parse(json: &str) -> Result<Self> {
        let wire: WireResponse = serde_json::from_str(json)?;
        let students = wire
            .students
            .into_iter()
            .enumerate()
            .map(|(index, student)| {
                validate(student).map_err(|reason| ScanError::MalformedPayload { index, reason })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(count = students.len(), "Extraction response validated");
        Ok(Self { students })
    }

    /// Pixel regions for a `width` x `height` image, one per student in
    /// order, with ids `student-1`, `student-2`, ...
    ///
    /// Each region is at least 1x1 and clipped to the image. An empty image
    /// yields no regions.
    #[must_use]
    pub fn to_regions(&self, width: u32, height: u32) -> Vec<Region> {
        if width == 0 || height == 0 {
            return Vec::new();
        }
        self.students
            .iter()
            .enumerate()
            .map(|(i, student)| {
                let rect = student.region.unwrap_or(FractionalRect::FULL);
                let (x, w) = to_span(rect.x, rect.width, width);
                let (y, h) = to_span(rect.y, rect.height, height);
                Region {
                    id: format!("student-{}", i + 1),
                    x,
                    y,
                    width: w,
                    height: h,
                }
            })
            .collect()
    }
}

impl FractionalRect {
    /// The whole image.
    pub const FULL: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };
}

/// Converts a fractional `(start, length)` to whole pixels inside `0..limit`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_span(start: f64, length: f64, limit: u32) -> (u32, u32) {
    let total = f64::from(limit);
    let start = ((start * total).round() as u32).min(limit - 1);
    let length = ((length * total).round() as u32).max(1).min(limit - start);
    (start, length)
}

fn validate(student: WireStudent) -> std::result::Result<StudentRegion, String> {
    let name = student
        .name
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| "name is missing or empty".to_owned())?;

    let region = student.region.map(validate_rect).transpose()?;
    Ok(StudentRegion { name, region })
}

fn validate_rect(rect: WireRect) -> std::result::Result<FractionalRect, String> {
    let field = |value: Option<f64>, label: &str| {
        value
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("region.{label} is missing or not a number"))
    };
    let rect = FractionalRect {
        x: field(rect.x, "x")?,
        y: field(rect.y, "y")?,
        width: field(rect.width, "width")?,
        height: field(rect.height, "height")?,
    };

    if rect.x < -TOLERANCE || rect.y < -TOLERANCE {
        return Err("region origin is negative".into());
    }
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return Err("region width and height must be positive".into());
    }
    if rect.x + rect.width > 1.0 + TOLERANCE || rect.y + rect.height > 1.0 + TOLERANCE {
        return Err("region extends past the image".into());
    }
    Ok(FractionalRect {
        x: rect.x.max(0.0),
        y: rect.y.max(0.0),
        ..rect
    })
}
