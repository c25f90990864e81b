//! Photocopy filter.
//!
//! Flattens uneven lighting on photographed pages: each pixel is divided by a
//! local background estimate (summed-area-table mean) so paper goes to white,
//! then the distance from white is amplified to darken ink.

use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

use crate::domain::DocumentFilter;

/// Configuration for the photocopy filter.
#[derive(Debug, Clone)]
pub struct PhotocopyConfig {
    /// Minimum radius of the background window, in pixels.
    pub block_radius: u32,
    /// Multiplier on each pixel's distance from white after flattening.
    pub ink_gain: f64,
}

impl Default for PhotocopyConfig {
    fn default() -> Self {
        Self {
            block_radius: 15,
            ink_gain: 1.5,
        }
    }
}

/// Shadow-removing document filter.
#[derive(Debug, Clone, Default)]
pub struct PhotocopyFilter {
    config: PhotocopyConfig,
}

impl PhotocopyFilter {
    #[must_use]
    pub const fn new(config: PhotocopyConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &PhotocopyConfig {
        &self.config
    }

    /// Runs the filter on a grayscale buffer.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    #[must_use]
    pub fn apply_luma(&self, gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return gray.clone();
        }

        // Window grows with the page: about 1/40 of the longer side.
        let radius = self.config.block_radius.max(width.max(height) / 40).max(1);
        let integral = integral_image(gray);

        let gain = self.config.ink_gain.max(0.0);
        debug!(radius, gain, "Applying photocopy filter");

        GrayImage::from_fn(width, height, |x, y| {
            let background = region_mean(&integral, width, height, x, y, radius).max(1.0);
            let flat = (f64::from(gray.get_pixel(x, y).0[0]) * 255.0 / background).min(255.0);
            let value = 255.0 - (255.0 - flat) * gain;
            Luma([value.clamp(0.0, 255.0).round() as u8])
        })
    }
}

impl DocumentFilter for PhotocopyFilter {
    fn name(&self) -> &'static str {
        "photocopy"
    }

    fn apply(&self, image: &DynamicImage) -> DynamicImage {
        DynamicImage::ImageLuma8(self.apply_luma(&image.to_luma8()))
    }
}

/// Summed-area table with a zero border: `(width + 1) x (height + 1)` entries,
/// where entry `(x, y)` sums all pixels strictly above and left of it.
fn integral_image(gray: &GrayImage) -> Vec<u64> {
    let (w, h) = gray.dimensions();
    let stride = (w + 1) as usize;
    let mut table = vec![0u64; stride * (h + 1) as usize];

    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += u64::from(gray.get_pixel(x, y).0[0]);
            let idx = (y + 1) as usize * stride + (x + 1) as usize;
            let above = y as usize * stride + (x + 1) as usize;
            table[idx] = row_sum + table[above];
        }
    }

    table
}

/// Mean of the square window of `radius` around `(cx, cy)`, clipped to the image.
#[allow(clippy::cast_precision_loss)]
fn region_mean(integral: &[u64], width: u32, height: u32, cx: u32, cy: u32, radius: u32) -> f64 {
    let stride = (width + 1) as usize;
    let x1 = cx.saturating_sub(radius) as usize;
    let y1 = cy.saturating_sub(radius) as usize;
    let x2 = (cx.saturating_add(radius).saturating_add(1)).min(width) as usize;
    let y2 = (cy.saturating_add(radius).saturating_add(1)).min(height) as usize;

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    let sum = integral[y2 * stride + x2] + integral[y1 * stride + x1]
        - integral[y1 * stride + x2]
        - integral[y2 * stride + x1];
    sum as f64 / area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_mean_matches_brute_force() {
        let img = GrayImage::from_fn(9, 7, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            Luma([(x * 13 + y * 7) as u8])
        });
        let integral = integral_image(&img);

        let mean = region_mean(&integral, 9, 7, 4, 3, 1);
        let mut sum = 0u32;
        for y in 2..=4 {
            for x in 3..=5 {
                sum += u32::from(img.get_pixel(x, y).0[0]);
            }
        }
        assert!((mean - f64::from(sum) / 9.0).abs() < 1e-9);

        // Window clipped at the corner.
        let corner = region_mean(&integral, 9, 7, 0, 0, 1);
        let expected = f64::from(
            u32::from(img.get_pixel(0, 0).0[0])
                + u32::from(img.get_pixel(1, 0).0[0])
                + u32::from(img.get_pixel(0, 1).0[0])
                + u32::from(img.get_pixel(1, 1).0[0]),
        ) / 4.0;
        assert!((corner - expected).abs() < 1e-9);
    }

    #[test]
    fn test_removes_lighting_gradient() {
        // Paper lit from the left: 240 fading to 120, with a dark ink stroke.
        let img = GrayImage::from_fn(200, 100, |x, y| {
            if (48..52).contains(&y) && (20..180).contains(&x) {
                Luma([20u8])
            } else {
                #[allow(clippy::cast_possible_truncation)]
                Luma([(240 - x * 120 / 200) as u8])
            }
        });
        let out = PhotocopyFilter::default().apply_luma(&img);

        let left_paper = out.get_pixel(10, 10).0[0];
        let right_paper = out.get_pixel(190, 10).0[0];
        assert!(
            left_paper.abs_diff(right_paper) < 30,
            "paper should be evened out: {left_paper} vs {right_paper}"
        );
        assert!(out.get_pixel(100, 50).0[0] < 80, "ink should stay dark");
    }

    #[test]
    fn test_keeps_dimensions_and_goes_gray() {
        let img = DynamicImage::new_rgb8(31, 17);
        let out = PhotocopyFilter::default().apply(&img);
        assert_eq!((out.width(), out.height()), (31, 17));
        assert!(matches!(out, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_single_pixel() {
        let img = GrayImage::from_pixel(1, 1, Luma([200u8]));
        let out = PhotocopyFilter::default().apply_luma(&img);
        assert_eq!(out.dimensions(), (1, 1));
    }
}
