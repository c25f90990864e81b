//! Raster encoding: `data:` URLs and JPEG/PNG codecs.

pub mod codec;
mod data_url;

pub use data_url::DataUrl;

/// JPEG quality used for every crop and re-encoded page (canvas quality 0.9).
pub const JPEG_QUALITY: u8 = 90;
