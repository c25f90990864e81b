//! Error type for gradescan library operations.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by the image pipeline, region drawer, and payload parsing.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The input is not a `data:<mime>;base64,<payload>` URL.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    /// Confirmation was requested with no committed regions.
    #[error("no regions to confirm")]
    NoRegions,

    /// A region does not fit inside the image it is being cropped from.
    #[error("region {id} lies outside the source image")]
    RegionOutOfBounds {
        /// Id of the offending region.
        id: String,
    },

    /// The remote extraction payload failed validation.
    #[error("malformed extraction payload at student {index}: {reason}")]
    MalformedPayload {
        /// Zero-based index of the offending student entry.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no batch image with id {0}")]
    UnknownImage(Uuid),

    /// Geometry that admits no usable transform (collapsed quad, zero-size output).
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScanError>;
