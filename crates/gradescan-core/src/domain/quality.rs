//! Scan quality buckets.

use serde::{Deserialize, Serialize};

/// Discrete quality label derived from the blur score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Sharp enough to send for grading.
    Good,
    /// Usable, but the user should consider rescanning.
    Medium,
    /// Too blurry; rescan before grading.
    Poor,
}

impl Quality {
    /// Returns the lowercase label used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Medium => "medium",
            Self::Poor => "poor",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the blur scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurAssessment {
    /// Quality bucket.
    pub quality: Quality,
    /// Sharpness score in `0.0..=100.0`; higher is sharper.
    pub blur_score: f64,
}

impl BlurAssessment {
    /// Assessment reported when an image cannot be decoded.
    pub const NEUTRAL: Self = Self {
        quality: Quality::Medium,
        blur_score: 50.0,
    };
}
