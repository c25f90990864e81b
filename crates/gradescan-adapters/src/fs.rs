//! Filesystem adapter for loading and saving pages.

use anyhow::{Context, Result};
use gradescan_core::{DataUrl, PageLoadError, PageSource, SourcePage};
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Supported page extensions and the MIME type each is carried as.
const PAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("gif", "image/gif"),
];

/// Filesystem page source adapter.
pub struct FsPageSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsPageSource {
    /// Creates a new filesystem page source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    /// Collects all page files from the configured paths, sorted per directory.
    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                if mime_for(path).is_some() {
                    files.push(path.clone());
                } else {
                    warn!("Unsupported file type: {}", path.display());
                }
            } else if path.is_dir() {
                self.collect_from_dir(path, &mut files);
            } else {
                warn!("Path does not exist: {}", path.display());
            }
        }

        files
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_file() && mime_for(&path).is_some() {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }
}

impl PageSource for FsPageSource {
    fn pages(&self) -> Box<dyn Iterator<Item = Result<SourcePage, PageLoadError>> + Send + '_> {
        let files = self.collect_files();
        debug!("Found {} page files", files.len());

        Box::new(files.into_iter().map(|path| {
            load_page(&path)
                .map_err(|e| PageLoadError::new(path.to_string_lossy().into_owned(), e))
        }))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files().len())
    }
}

/// MIME type for a supported page extension.
fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    PAGE_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Reads a page file into a `data:` URL without decoding it.
fn load_page(path: &Path) -> Result<SourcePage> {
    let mime = mime_for(path).unwrap_or("application/octet-stream");
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read page: {}", path.display()))?;

    Ok(SourcePage {
        path: path.to_string_lossy().into_owned(),
        data_url: DataUrl::from_bytes(mime, bytes),
    })
}

/// Opens and decodes a single image file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).with_context(|| format!("Failed to open image: {}", path.display()))
}

/// Writes an image, choosing the format from the extension (PNG if unknown).
///
/// JPEG output drops alpha.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or encoding fails.
pub fn save_image(image: &DynamicImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    let result = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(image.to_rgb8()).save_with_format(path, format)
    } else {
        image.save_with_format(path, format)
    };
    result.with_context(|| format!("Failed to write image: {}", path.display()))?;

    info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("scan.jpg")), Some("image/jpeg"));
        assert_eq!(mime_for(Path::new("scan.JPEG")), Some("image/jpeg"));
        assert_eq!(mime_for(Path::new("scan.png")), Some("image/png"));
        assert_eq!(mime_for(Path::new("scan.tif")), Some("image/tiff"));
        assert_eq!(mime_for(Path::new("scan.cr2")), None);
        assert_eq!(mime_for(Path::new("notes.txt")), None);
        assert_eq!(mime_for(Path::new("scan")), None);
    }
}
