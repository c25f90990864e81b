//! Perspective rectification from a page quadrilateral.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use tracing::{debug, info};

use crate::domain::DetectedEdge;
use crate::error::{Result, ScanError};

/// Warps the quadrilateral `edge` of `image` onto an upright rectangle.
///
/// The output is as wide as the longer of the top and bottom edges and as tall
/// as the longer of the left and right edges, in source pixels. Pixels that
/// map outside the source are filled white.
///
/// # Errors
///
/// Returns [`ScanError::Degenerate`] if the quad collapses to a line or point.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rectify(image: &DynamicImage, edge: &DetectedEdge) -> Result<DynamicImage> {
    let src = edge.to_pixel_quad(image.width(), image.height());
    let [tl, tr, br, bl] = src;

    let out_w = distance(tl, tr).max(distance(bl, br)).round() as u32;
    let out_h = distance(tl, bl).max(distance(tr, br)).round() as u32;
    if out_w == 0 || out_h == 0 {
        return Err(ScanError::Degenerate(format!(
            "quadrilateral maps to {out_w}x{out_h}"
        )));
    }

    let dest = [
        (0.0, 0.0),
        (out_w as f32, 0.0),
        (out_w as f32, out_h as f32),
        (0.0, out_h as f32),
    ];
    let projection = Projection::from_control_points(src, dest)
        .ok_or_else(|| ScanError::Degenerate("no projective transform for quad".into()))?;
    debug!(?src, out_w, out_h, "Rectifying page");

    let mut output = RgbaImage::new(out_w, out_h);
    warp_into(
        &image.to_rgba8(),
        &projection,
        Interpolation::Bilinear,
        Rgba([255, 255, 255, 255]),
        &mut output,
    );

    info!(out_w, out_h, "Perspective correction applied");
    Ok(DynamicImage::ImageRgba8(output))
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}
