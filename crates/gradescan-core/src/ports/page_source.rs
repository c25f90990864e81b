//! Page source port for loading scanned pages.

use std::fmt;

use crate::raster::DataUrl;

/// An encoded page together with where it came from.
#[derive(Debug, Clone)]
pub struct SourcePage {
    /// Path or other label identifying the page.
    pub path: String,
    /// The page bytes as a `data:` URL.
    pub data_url: DataUrl,
}

/// A page that could not be loaded, with the path it was expected at.
#[derive(Debug)]
pub struct PageLoadError {
    /// Path or other label identifying the page.
    pub path: String,
    /// Why loading failed.
    pub error: anyhow::Error,
}

impl PageLoadError {
    #[must_use]
    pub fn new(path: impl Into<String>, error: anyhow::Error) -> Self {
        Self {
            path: path.into(),
            error,
        }
    }
}

impl fmt::Display for PageLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.path, self.error)
    }
}

impl std::error::Error for PageLoadError {}

/// Port for loading pages from a source.
pub trait PageSource: Send + Sync {
    /// Returns an iterator over pages from this source.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a page fails to load; each error
    /// carries the page's path.
    fn pages(&self) -> Box<dyn Iterator<Item = Result<SourcePage, PageLoadError>> + Send + '_>;

    /// Returns the total number of pages, if known.
    fn count_hint(&self) -> Option<usize>;
}
