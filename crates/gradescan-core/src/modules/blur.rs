//! Blur scoring.
//!
//! Rates scan sharpness by the variance of the discrete Laplacian over a
//! downscaled grayscale copy of the page. The result is a heuristic used to
//! warn before a blurry page goes to grading; it makes no accuracy claim.

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, warn};

use crate::domain::{BlurAssessment, Quality};
use crate::raster::DataUrl;

/// Configuration for blur scoring.
#[derive(Debug, Clone)]
pub struct BlurConfig {
    /// Longer side of the working copy, in pixels. Larger pages are downscaled.
    pub max_dimension: u32,
    /// Laplacian variance is divided by this to get the 0-100 score.
    pub variance_divisor: f64,
    /// Scores at or above this are `good`.
    pub good_threshold: f64,
    /// Scores at or above this (and below `good_threshold`) are `medium`.
    pub medium_threshold: f64,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            max_dimension: 200,
            variance_divisor: 10.0,
            good_threshold: 40.0,
            medium_threshold: 20.0,
        }
    }
}

/// Laplacian-variance blur scorer.
#[derive(Debug, Clone, Default)]
pub struct BlurScorer {
    config: BlurConfig,
}

impl BlurScorer {
    /// Creates a scorer with the given configuration.
    #[must_use]
    pub const fn new(config: BlurConfig) -> Self {
        Self { config }
    }

    /// Returns the scorer configuration.
    #[must_use]
    pub const fn config(&self) -> &BlurConfig {
        &self.config
    }

    /// Scores an image carried as a `data:` URL.
    ///
    /// Never fails: a URL that does not parse or decode yields
    /// [`BlurAssessment::NEUTRAL`].
    #[must_use]
    pub fn score_data_url(&self, data_url: &str) -> BlurAssessment {
        match data_url.parse::<DataUrl>().and_then(|url| url.decode()) {
            Ok(image) => self.score_image(&image),
            Err(e) => {
                warn!("Blur scoring fell back to neutral: {e}");
                BlurAssessment::NEUTRAL
            }
        }
    }

    /// Scores a decoded image.
    #[must_use]
    pub fn score_image(&self, image: &DynamicImage) -> BlurAssessment {
        let working = downscale(image, self.config.max_dimension);
        let (width, height) = (working.width(), working.height());
        let gray = luminance(&working);

        let variance = laplacian_variance(&gray, width, height);
        let blur_score = normalize(variance, self.config.variance_divisor);
        let quality = self.classify(blur_score);

        debug!(
            width,
            height,
            variance,
            blur_score,
            quality = quality.as_str(),
            "Blur score computed"
        );

        BlurAssessment {
            quality,
            blur_score,
        }
    }

    /// Maps a 0-100 score to its quality bucket.
    #[must_use]
    pub fn classify(&self, blur_score: f64) -> Quality {
        if blur_score >= self.config.good_threshold {
            Quality::Good
        } else if blur_score >= self.config.medium_threshold {
            Quality::Medium
        } else {
            Quality::Poor
        }
    }
}

/// Shrinks `image` so its longer side is at most `max_dimension`. Never upscales.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn downscale(image: &DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    let longer = width.max(height);
    if longer <= max_dimension || longer == 0 {
        return image.clone();
    }

    let scale = f64::from(max_dimension) / f64::from(longer);
    let new_width = ((f64::from(width) * scale).round() as u32).max(1);
    let new_height = ((f64::from(height) * scale).round() as u32).max(1);
    image.resize_exact(new_width, new_height, FilterType::Triangle)
}

/// Row-major luminance buffer using 0.299 R + 0.587 G + 0.114 B.
fn luminance(image: &DynamicImage) -> Vec<f64> {
    image
        .to_rgb8()
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
        })
        .collect()
}

/// Maps a variance onto `0.0..=100.0`. A non-finite ratio (zero or
/// non-finite divisor) scores 0.
fn normalize(variance: f64, divisor: f64) -> f64 {
    let score = variance / divisor;
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Variance of the response to `[[0,-1,0],[-1,4,-1],[0,-1,0]]` over the
/// interior pixels of a row-major `width` x `height` buffer.
///
/// Buffers with no interior pixels (either side under 3) have variance 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn laplacian_variance(gray: &[f64], width: u32, height: u32) -> f64 {
    let (w, h) = (width as usize, height as usize);
    if w < 3 || h < 3 || gray.len() < w * h {
        return 0.0;
    }

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let response = 4.0 * gray[i] - gray[i - 1] - gray[i + 1] - gray[i - w] - gray[i + w];
            sum += response;
            sum_sq += response * response;
        }
    }

    let n = ((w - 2) * (h - 2)) as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn checkerboard(size: u32, cell: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(size, size, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        }))
    }

    #[test]
    fn test_default_config() {
        let config = BlurConfig::default();
        assert_eq!(config.max_dimension, 200);
        assert!((config.variance_divisor - 10.0).abs() < f64::EPSILON);
        assert!((config.good_threshold - 40.0).abs() < f64::EPSILON);
        assert!((config.medium_threshold - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_divisor_scores_zero() {
        let scorer = BlurScorer::new(BlurConfig {
            variance_divisor: 0.0,
            ..Default::default()
        });
        let flat = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, Luma([128u8])));
        let assessment = scorer.score_image(&flat);
        assert_eq!(assessment.quality, Quality::Poor);
        assert!(assessment.blur_score.abs() < f64::EPSILON);

        let sharp = scorer.score_image(&checkerboard(64, 4));
        assert!((0.0..=100.0).contains(&sharp.blur_score));
    }

    #[test]
    fn test_classify_boundaries() {
        let scorer = BlurScorer::default();
        assert_eq!(scorer.classify(100.0), Quality::Good);
        assert_eq!(scorer.classify(40.0), Quality::Good);
        assert_eq!(scorer.classify(39.99), Quality::Medium);
        assert_eq!(scorer.classify(20.0), Quality::Medium);
        assert_eq!(scorer.classify(19.99), Quality::Poor);
        assert_eq!(scorer.classify(0.0), Quality::Poor);
    }

    #[test]
    fn test_laplacian_of_flat_buffer_is_zero() {
        let gray = vec![77.0; 25];
        assert!(laplacian_variance(&gray, 5, 5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_laplacian_single_spike() {
        // 3x3 with a bright centre: one interior sample of 4 * 10 = 40,
        // so the variance of a single sample is zero.
        let mut gray = vec![0.0; 9];
        gray[4] = 10.0;
        assert!(laplacian_variance(&gray, 3, 3).abs() < f64::EPSILON);

        // 4x3: two interior samples, 40 and -10. Mean 15, variance 625.
        let mut gray = vec![0.0; 12];
        gray[5] = 10.0;
        let variance = laplacian_variance(&gray, 4, 3);
        assert!((variance - 625.0).abs() < 1e-9, "got {variance}");
    }

    #[test]
    fn test_laplacian_of_linear_ramp_is_zero() {
        let (w, h) = (10u32, 6u32);
        let gray: Vec<f64> = (0..h)
            .flat_map(|_| (0..w).map(|x| f64::from(x) * 7.0))
            .collect();
        assert!(laplacian_variance(&gray, w, h) < 1e-9);
    }

    #[test]
    fn test_checkerboard_is_good() {
        let assessment = BlurScorer::default().score_image(&checkerboard(128, 8));
        assert_eq!(assessment.quality, Quality::Good);
        assert!((assessment.blur_score - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_large_checkerboard_is_good_after_downscale() {
        let assessment = BlurScorer::default().score_image(&checkerboard(800, 16));
        assert_eq!(assessment.quality, Quality::Good);
    }

    #[test]
    fn test_gradient_is_never_good() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(256, 256, |x, _| {
            #[allow(clippy::cast_possible_truncation)]
            Luma([x as u8])
        }));
        let assessment = BlurScorer::default().score_image(&img);
        assert_ne!(assessment.quality, Quality::Good);
    }

    #[test]
    fn test_uniform_is_poor() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([120, 40, 200])));
        let assessment = BlurScorer::default().score_image(&img);
        assert_eq!(assessment.quality, Quality::Poor);
        assert!(assessment.blur_score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_pixel_does_not_panic() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([9u8])));
        let assessment = BlurScorer::default().score_image(&img);
        assert_eq!(assessment.quality, Quality::Poor);
        assert!(assessment.blur_score.is_finite());
    }

    #[test]
    fn test_downscale_caps_longer_side() {
        let img = DynamicImage::new_rgb8(1000, 400);
        let small = downscale(&img, 200);
        assert_eq!((small.width(), small.height()), (200, 80));

        let tall = DynamicImage::new_rgb8(3, 5000);
        let small = downscale(&tall, 200);
        assert_eq!((small.width(), small.height()), (1, 200));
    }

    #[test]
    fn test_downscale_never_upscales() {
        let img = DynamicImage::new_rgb8(50, 20);
        let same = downscale(&img, 200);
        assert_eq!((same.width(), same.height()), (50, 20));
    }

    #[test]
    fn test_luminance_weights() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([100, 200, 50])));
        let gray = luminance(&img);
        let expected = 0.299 * 100.0 + 0.587 * 200.0 + 0.114 * 50.0;
        assert!((gray[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bad_data_url_is_neutral() {
        let scorer = BlurScorer::default();
        assert_eq!(scorer.score_data_url("not a url"), BlurAssessment::NEUTRAL);
        assert_eq!(
            scorer.score_data_url("data:image/png;base64,AAAA"),
            BlurAssessment::NEUTRAL
        );
    }

    #[test]
    fn test_data_url_is_scored() {
        let url = DataUrl::png(&checkerboard(64, 4)).unwrap_or_else(|e| panic!("{e}"));
        let assessment = BlurScorer::default().score_data_url(&url.to_string());
        assert_eq!(assessment.quality, Quality::Good);
    }
}
