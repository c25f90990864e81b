//! Manual region drawing.
//!
//! A [`RegionDrawer`] turns pointer gestures over a zoomed image into
//! pixel-space [`Region`]s, then crops each one out of the full-resolution
//! source. All size checks and crops use source pixels; only pointer input
//! is in screen space.

use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{Point, Region};
use crate::error::{Result, ScanError};
use crate::raster::{DataUrl, JPEG_QUALITY};

/// Smallest zoom factor the drawer accepts.
pub const MIN_ZOOM: f64 = 0.3;
/// Largest zoom factor the drawer accepts.
pub const MAX_ZOOM: f64 = 2.0;

/// Settings for a drawing session.
#[derive(Debug, Clone)]
pub struct DrawerConfig {
    /// Both sides of a region must exceed this many source pixels.
    pub min_size: u32,
    /// JPEG quality for confirmed crops.
    pub jpeg_quality: u8,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            min_size: 20,
            jpeg_quality: JPEG_QUALITY,
        }
    }
}

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawState {
    Idle,
    /// A drag is in progress. Both points are in source pixels.
    Drawing {
        anchor: (u32, u32),
        current: (u32, u32),
    },
}

/// Result of confirming a drawing session.
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    /// Regions in creation order.
    pub regions: Vec<Region>,
    /// One JPEG per region, same order.
    pub images: Vec<DataUrl>,
}

/// Interactive rectangle drawing over one source image.
#[derive(Debug, Clone)]
pub struct RegionDrawer {
    width: u32,
    height: u32,
    zoom: f64,
    config: DrawerConfig,
    state: DrawState,
    regions: Vec<Region>,
    next_id: usize,
}

impl RegionDrawer {
    /// Starts a session over a `width` x `height` source at zoom 1.0.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(width, height, DrawerConfig::default())
    }

    #[must_use]
    pub const fn with_config(width: u32, height: u32, config: DrawerConfig) -> Self {
        Self {
            width,
            height,
            zoom: 1.0,
            config,
            state: DrawState::Idle,
            regions: Vec::new(),
            next_id: 1,
        }
    }

    /// Source dimensions the session was sized for.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the display zoom, clamped to `MIN_ZOOM..=MAX_ZOOM`.
    ///
    /// Non-finite values are ignored. Returns the zoom now in effect.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
        self.zoom
    }

    #[must_use]
    pub const fn state(&self) -> DrawState {
        self.state
    }

    /// Committed regions in creation order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Converts a screen point to source pixels (`screen / zoom`), rounded
    /// and clamped to the image.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn to_image_coords(&self, point: Point) -> (u32, u32) {
        let convert = |v: f64, limit: u32| {
            let v = v / self.zoom;
            if v.is_finite() {
                v.round().clamp(0.0, f64::from(limit)) as u32
            } else {
                0
            }
        };
        (convert(point.x, self.width), convert(point.y, self.height))
    }

    /// Starts a drag. A drag already in progress is restarted.
    pub fn pointer_down(&mut self, point: Point) {
        let anchor = self.to_image_coords(point);
        self.state = DrawState::Drawing {
            anchor,
            current: anchor,
        };
    }

    /// Updates the rubber band. Ignored when idle.
    pub fn pointer_move(&mut self, point: Point) {
        if let DrawState::Drawing { anchor, .. } = self.state {
            self.state = DrawState::Drawing {
                anchor,
                current: self.to_image_coords(point),
            };
        }
    }

    /// Ends a drag, committing the rectangle if both sides exceed the
    /// minimum size. Returns the committed region.
    pub fn pointer_up(&mut self, point: Point) -> Option<&Region> {
        let DrawState::Drawing { anchor, .. } = self.state else {
            return None;
        };
        self.state = DrawState::Idle;

        let end = self.to_image_coords(point);
        let id = format!("region-{}", self.next_id);
        let min = self.config.min_size;
        match Region::from_corners(id, anchor, end) {
            Some(region) if region.width > min && region.height > min => {
                debug!(
                    id = %region.id,
                    x = region.x,
                    y = region.y,
                    width = region.width,
                    height = region.height,
                    "Region committed"
                );
                self.next_id += 1;
                self.regions.push(region);
                self.regions.last()
            }
            _ => {
                debug!(?anchor, ?end, min, "Region below minimum size, discarded");
                None
            }
        }
    }

    /// Abandons a drag in progress.
    pub fn cancel(&mut self) {
        self.state = DrawState::Idle;
    }

    /// The rectangle being dragged, if any and if it has non-zero area.
    #[must_use]
    pub fn preview(&self) -> Option<Region> {
        match self.state {
            DrawState::Drawing { anchor, current } => {
                Region::from_corners("preview", anchor, current)
            }
            DrawState::Idle => None,
        }
    }

    /// Deletes a committed region.
    pub fn remove(&mut self, id: &str) -> Option<Region> {
        let index = self.regions.iter().position(|r| r.id == id)?;
        Some(self.regions.remove(index))
    }

    #[must_use]
    pub fn can_confirm(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Crops every committed region out of `source`.
    ///
    /// # Errors
    ///
    /// - [`ScanError::NoRegions`] if nothing has been committed
    /// - [`ScanError::RegionOutOfBounds`] if `source` is smaller than a region
    /// - [`ScanError::Encode`] if JPEG encoding fails
    pub fn confirm(&self, source: &DynamicImage) -> Result<Confirmation> {
        if !self.can_confirm() {
            return Err(ScanError::NoRegions);
        }
        let images = crop_regions(source, &self.regions, self.config.jpeg_quality)?;
        info!(count = images.len(), "Regions confirmed");
        Ok(Confirmation {
            regions: self.regions.clone(),
            images,
        })
    }
}

/// Crops each region from `source` into its own same-size JPEG.
///
/// # Errors
///
/// Returns [`ScanError::RegionOutOfBounds`] for a region that does not fit
/// `source`, or [`ScanError::Encode`] if encoding fails.
pub fn crop_regions(source: &DynamicImage, regions: &[Region], quality: u8) -> Result<Vec<DataUrl>> {
    regions
        .iter()
        .map(|region| {
            if !region.fits_within(source.width(), source.height()) {
                return Err(ScanError::RegionOutOfBounds {
                    id: region.id.clone(),
                });
            }
            let crop = source.crop_imm(region.x, region.y, region.width, region.height);
            DataUrl::jpeg(&crop, quality)
        })
        .collect()
}
