//! Document boundary quadrilaterals in normalized image coordinates.

use serde::{Deserialize, Serialize};

/// A point with both coordinates in `0.0..=1.0`, relative to image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    /// Creates a point, clamping both coordinates into `0.0..=1.0`.
    ///
    /// Non-finite coordinates collapse to `0.0`.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    /// Pixel position inside a `width` x `height` image.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn to_pixels(self, width: u32, height: u32) -> (f32, f32) {
        (
            (self.x * f64::from(width)) as f32,
            (self.y * f64::from(height)) as f32,
        )
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// One corner of a [`DetectedEdge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl std::str::FromStr for Corner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-left" | "top_left" | "tl" => Ok(Self::TopLeft),
            "top-right" | "top_right" | "tr" => Ok(Self::TopRight),
            "bottom-left" | "bottom_left" | "bl" => Ok(Self::BottomLeft),
            "bottom-right" | "bottom_right" | "br" => Ok(Self::BottomRight),
            other => Err(format!("unknown corner '{other}'")),
        }
    }
}

/// Four-corner document boundary, each corner normalized to the image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedEdge {
    pub top_left: NormalizedPoint,
    pub top_right: NormalizedPoint,
    pub bottom_left: NormalizedPoint,
    pub bottom_right: NormalizedPoint,
}

impl DetectedEdge {
    /// Boundary covering the whole image.
    #[must_use]
    pub fn full_frame() -> Self {
        Self {
            top_left: NormalizedPoint::new(0.0, 0.0),
            top_right: NormalizedPoint::new(1.0, 0.0),
            bottom_left: NormalizedPoint::new(0.0, 1.0),
            bottom_right: NormalizedPoint::new(1.0, 1.0),
        }
    }

    #[must_use]
    pub const fn corner(&self, corner: Corner) -> NormalizedPoint {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomLeft => self.bottom_left,
            Corner::BottomRight => self.bottom_right,
        }
    }

    /// Moves one corner, as when the user drags it. The position is clamped
    /// into the image.
    pub fn move_corner(&mut self, corner: Corner, x: f64, y: f64) {
        let point = NormalizedPoint::new(x, y);
        match corner {
            Corner::TopLeft => self.top_left = point,
            Corner::TopRight => self.top_right = point,
            Corner::BottomLeft => self.bottom_left = point,
            Corner::BottomRight => self.bottom_right = point,
        }
    }

    /// Corners in `[top_left, top_right, bottom_right, bottom_left]` order,
    /// converted to pixels of a `width` x `height` image.
    #[must_use]
    pub fn to_pixel_quad(&self, width: u32, height: u32) -> [(f32, f32); 4] {
        [
            self.top_left.to_pixels(width, height),
            self.top_right.to_pixels(width, height),
            self.bottom_right.to_pixels(width, height),
            self.bottom_left.to_pixels(width, height),
        ]
    }
}

impl Default for DetectedEdge {
    fn default() -> Self {
        Self::full_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_corner_clamps() {
        let mut edge = DetectedEdge::full_frame();
        edge.move_corner(Corner::TopLeft, -0.2, 0.3);
        assert_eq!(edge.top_left, NormalizedPoint { x: 0.0, y: 0.3 });

        edge.move_corner(Corner::BottomRight, 1.5, f64::NAN);
        assert_eq!(edge.bottom_right, NormalizedPoint { x: 1.0, y: 0.0 });
    }

    #[test]
    fn test_pixel_quad_order() {
        let quad = DetectedEdge::full_frame().to_pixel_quad(200, 100);
        assert_eq!(quad, [(0.0, 0.0), (200.0, 0.0), (200.0, 100.0), (0.0, 100.0)]);
    }

    #[test]
    fn test_corner_from_str() {
        assert_eq!("top-left".parse::<Corner>(), Ok(Corner::TopLeft));
        assert_eq!("br".parse::<Corner>(), Ok(Corner::BottomRight));
        assert!("middle".parse::<Corner>().is_err());
    }

    #[test]
    fn test_serializes_with_corner_names() {
        let json = serde_json::to_value(DetectedEdge::full_frame()).unwrap_or_default();
        assert_eq!(json["bottom_right"]["x"], 1.0);
        assert_eq!(json["top_left"]["y"], 0.0);
    }
}
