//! Synthetic page builders for testing.

use std::path::{Path, PathBuf};

use gradescan_core::DataUrl;
use image::{DynamicImage, GrayImage, Luma, RgbImage};

/// Builder for creating synthetic test pages.
///
/// Provides convenience methods for generating images with specific
/// characteristics (sharp, blurry, unevenly lit, photographed on a desk).
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    // === Sharp/High-Contrast Images ===

    /// Creates a high-contrast checkerboard pattern (very sharp edges).
    ///
    /// Should score as `good`.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> DynamicImage {
        Self::checkerboard_with_cell_size(width, height, 8)
    }

    /// Creates a checkerboard with custom cell size.
    #[must_use]
    pub fn checkerboard_with_cell_size(width: u32, height: u32, cell_size: u32) -> DynamicImage {
        let cell = cell_size.max(1);
        let img = GrayImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        DynamicImage::ImageLuma8(img)
    }

    /// Creates vertical bars pattern (sharp edges).
    #[must_use]
    pub fn vertical_bars(width: u32, height: u32, bar_width: u32) -> DynamicImage {
        let bar = bar_width.max(1);
        let img = GrayImage::from_fn(width, height, |x, _| {
            if (x / bar) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        DynamicImage::ImageLuma8(img)
    }

    // === Blurry Images ===

    /// Creates a uniform gray image (no edges, simulates severe blur).
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
    }

    /// Creates a smooth horizontal gradient (low variance, simulates defocus).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn horizontal_gradient(width: u32, height: u32) -> DynamicImage {
        let img = GrayImage::from_fn(width, height, |x, _| {
            let val = ((u32::from(u8::MAX) * x) / width.max(1)) as u8;
            Luma([val])
        });
        DynamicImage::ImageLuma8(img)
    }

    // === Document Images ===

    /// Paper lit from the left (240 fading to 120) with a dark ink stroke
    /// across the middle.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn unevenly_lit_page(width: u32, height: u32) -> DynamicImage {
        let mid = height / 2;
        let img = GrayImage::from_fn(width, height, |x, y| {
            if y.abs_diff(mid) < 2 && x > width / 10 && x < width - width / 10 {
                Luma([20u8])
            } else {
                Luma([(240 - x * 120 / width.max(1)) as u8])
            }
        });
        DynamicImage::ImageLuma8(img)
    }

    /// A bright page covering `(x, y, width, height)` on a dark desk.
    #[must_use]
    pub fn page_on_desk(width: u32, height: u32, page: (u32, u32, u32, u32)) -> DynamicImage {
        let (px, py, pw, ph) = page;
        let img = GrayImage::from_fn(width, height, |x, y| {
            if (px..px + pw).contains(&x) && (py..py + ph).contains(&y) {
                Luma([235u8])
            } else {
                Luma([25u8])
            }
        });
        DynamicImage::ImageLuma8(img)
    }

    // === Special Test Images ===

    /// Creates a 1x1 pixel image (edge case).
    #[must_use]
    pub fn single_pixel(value: u8) -> DynamicImage {
        Self::uniform_gray(1, 1, value)
    }

    /// Creates an RGB image whose pixels encode their own coordinates, so
    /// crops can be checked by position.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn coordinate_rgb(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        DynamicImage::ImageRgb8(img)
    }
}

/// Convenience functions for common test images.
impl SyntheticImageBuilder {
    /// Returns a standard sharp test page (128x128 checkerboard).
    #[must_use]
    pub fn sharp_image() -> DynamicImage {
        Self::checkerboard(128, 128)
    }

    /// Returns a standard blurry test page (128x128 uniform gray).
    #[must_use]
    pub fn blurry_image() -> DynamicImage {
        Self::uniform_gray(128, 128, 128)
    }
}

/// Encodes an image as a PNG `data:` URL.
///
/// # Panics
///
/// Panics if encoding fails, which only happens for zero-sized images.
#[must_use]
pub fn png_data_url(image: &DynamicImage) -> DataUrl {
    DataUrl::png(image).unwrap_or_else(|e| panic!("encode test image: {e}"))
}

/// Saves an image under `dir` and returns its path. The format follows the
/// extension of `name`.
///
/// # Panics
///
/// Panics if the file cannot be written.
#[must_use]
pub fn write_image(dir: &Path, name: &str, image: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    let to_save = if name.ends_with(".jpg") || name.ends_with(".jpeg") {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        image.clone()
    };
    to_save
        .save(&path)
        .unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
    path
}
