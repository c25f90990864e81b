//! Pixel-space rectangles over a source image.

use serde::{Deserialize, Serialize};

/// A point in screen (display) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangular sub-area of a source image, in source pixels.
///
/// Regions produced by the drawer or by extraction always have a non-zero
/// width and height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Builds a region from two opposite corners in any order.
    ///
    /// Returns `None` if the corners share a row or column.
    #[must_use]
    pub fn from_corners(id: impl Into<String>, a: (u32, u32), b: (u32, u32)) -> Option<Self> {
        let x = a.0.min(b.0);
        let y = a.1.min(b.1);
        let width = a.0.abs_diff(b.0);
        let height = a.1.abs_diff(b.1);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            id: id.into(),
            x,
            y,
            width,
            height,
        })
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Whether the region lies entirely inside a `width` x `height` image.
    #[must_use]
    pub const fn fits_within(&self, width: u32, height: u32) -> bool {
        match (self.x.checked_add(self.width), self.y.checked_add(self.height)) {
            (Some(right), Some(bottom)) => right <= width && bottom <= height,
            _ => false,
        }
    }

    /// Display-space rectangle `(x, y, width, height)` at the given zoom.
    #[must_use]
    pub fn scaled(&self, zoom: f64) -> (f64, f64, f64, f64) {
        (
            f64::from(self.x) * zoom,
            f64::from(self.y) * zoom,
            f64::from(self.width) * zoom,
            f64::from(self.height) * zoom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_flips_negative_deltas() {
        let region = Region::from_corners("r", (120, 80), (20, 10));
        assert_eq!(
            region,
            Some(Region {
                id: "r".into(),
                x: 20,
                y: 10,
                width: 100,
                height: 70,
            })
        );
    }

    #[test]
    fn test_from_corners_rejects_flat() {
        assert!(Region::from_corners("r", (5, 5), (5, 40)).is_none());
        assert!(Region::from_corners("r", (5, 5), (40, 5)).is_none());
    }

    #[test]
    fn test_fits_within() {
        let region = Region::from_corners("r", (0, 0), (100, 50));
        let region = region.unwrap_or_else(|| panic!("valid region"));
        assert!(region.fits_within(100, 50));
        assert!(!region.fits_within(99, 50));
    }

    #[test]
    fn test_fits_within_near_u32_max() {
        let region = Region {
            id: "r".into(),
            x: u32::MAX - 1,
            y: 0,
            width: 5,
            height: 5,
        };
        assert!(!region.fits_within(10, 10));
        assert!(!region.fits_within(u32::MAX, u32::MAX));
        assert_eq!(region.right(), u32::MAX);
    }

    #[test]
    fn test_scaled() {
        let region = Region {
            id: "r".into(),
            x: 10,
            y: 20,
            width: 30,
            height: 40,
        };
        assert_eq!(region.scaled(0.5), (5.0, 10.0, 15.0, 20.0));
    }
}
