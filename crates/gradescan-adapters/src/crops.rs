//! Writes confirmed region crops to a directory.

use anyhow::{Context, Result};
use gradescan_core::{DataUrl, Region};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes each crop as `<region-id>.jpg` under one directory.
pub struct CropWriter {
    dir: PathBuf,
}

impl CropWriter {
    /// Creates the output directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes one crop, returning its path. Existing files are replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, region: &Region, crop: &DataUrl) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.jpg", region.id));
        std::fs::write(&path, crop.bytes())
            .with_context(|| format!("Failed to write crop: {}", path.display()))?;
        debug!(id = %region.id, path = %path.display(), "Crop written");
        Ok(path)
    }

    /// Writes every crop in order.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    pub fn write_all(&self, regions: &[Region], crops: &[DataUrl]) -> Result<Vec<PathBuf>> {
        regions
            .iter()
            .zip(crops)
            .map(|(region, crop)| self.write(region, crop))
            .collect()
    }
}
