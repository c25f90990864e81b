//! `data:` URL parsing and rendering.

use std::fmt;
use std::str::FromStr;

use base64::prelude::{Engine, BASE64_STANDARD};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::codec;
use crate::error::{Result, ScanError};

/// An encoded raster carried as `data:<mime>;base64,<payload>`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataUrl {
    mime: String,
    bytes: Vec<u8>,
}

impl DataUrl {
    /// Wraps already-encoded bytes.
    #[must_use]
    pub fn from_bytes(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Encodes an image as JPEG at `quality` (1-100).
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Encode`] if the encoder fails.
    pub fn jpeg(image: &DynamicImage, quality: u8) -> Result<Self> {
        Ok(Self::from_bytes("image/jpeg", codec::encode_jpeg(image, quality)?))
    }

    /// Encodes an image as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Encode`] if the encoder fails.
    pub fn png(image: &DynamicImage) -> Result<Self> {
        Ok(Self::from_bytes("image/png", codec::encode_png(image)?))
    }

    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Decodes the payload into an image, sniffing the format from the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Decode`] if the payload is not a decodable raster.
    pub fn decode(&self) -> Result<DynamicImage> {
        codec::decode(&self.bytes)
    }
}

impl FromStr for DataUrl {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| ScanError::InvalidDataUrl("missing 'data:' prefix".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ScanError::InvalidDataUrl("missing ',' separator".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| ScanError::InvalidDataUrl("only base64 payloads are supported".into()))?;
        let bytes = BASE64_STANDARD
            .decode(payload)
            .map_err(|e| ScanError::InvalidDataUrl(format!("bad base64 payload: {e}")))?;

        let mime = if mime.is_empty() {
            "application/octet-stream"
        } else {
            mime
        };
        Ok(Self::from_bytes(mime, bytes))
    }
}

impl TryFrom<String> for DataUrl {
    type Error = ScanError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DataUrl> for String {
    fn from(value: DataUrl) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "data:{};base64,{}",
            self.mime,
            BASE64_STANDARD.encode(&self.bytes)
        )
    }
}

// Payloads can be megabytes; keep Debug output short.
impl fmt::Debug for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataUrl")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}
