//! gradescan adapters - filesystem adapters for gradescan.
//!
//! This crate provides adapters for:
//! - Filesystem page source
//! - Image loading and saving
//! - Writing region crops

pub mod crops;
pub mod fs;

pub use crops::CropWriter;
pub use fs::{load_image, save_image, FsPageSource};
