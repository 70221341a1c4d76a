//! Garment silhouette detection.
//!
//! Finds the rectangle a garment occupies in a photograph taken against
//! a light backdrop:
//!
//! luminance -> 5×5 Gaussian -> inverse threshold at 240 ->
//! external contours -> largest enclosed area -> bounding rectangle.
//!
//! A photograph with no foreground at all is a normal outcome and
//! yields `None`; callers fall back to the full image.

use image::GrayImage;
use imageproc::contours::{BorderType, Contour};

use crate::types::{BoundingBox, RgbImage};

/// Luminance above which a pixel is considered backdrop.
pub const BACKGROUND_THRESHOLD: u8 = 240;

/// Detect the garment's bounding rectangle.
///
/// Returns `None` when no foreground pixel survives the threshold.
#[must_use]
pub fn detect(garment: &RgbImage) -> Option<BoundingBox> {
    let gray = crate::grayscale::luminance(garment);
    let smoothed = crate::blur::smooth(&gray);
    let mask = foreground_mask(&smoothed);
    largest_external_bounds(&mask)
}

/// Inverse binary threshold: 255 for garment, 0 for backdrop.
///
/// Pixels strictly brighter than [`BACKGROUND_THRESHOLD`] are backdrop.
#[must_use = "returns the foreground mask"]
pub fn foreground_mask(gray: &GrayImage) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] > BACKGROUND_THRESHOLD {
            image::Luma([0])
        } else {
            image::Luma([255])
        }
    })
}

/// Bounding rectangle of the outermost contour with the largest area.
///
/// Only top-level outer borders are considered; holes and anything
/// nested inside them are ignored. On equal areas the first contour in
/// tracing order wins.
#[must_use]
pub fn largest_external_bounds(mask: &GrayImage) -> Option<BoundingBox> {
    if mask.width() == 0 || mask.height() == 0 {
        return None;
    }

    let contours: Vec<Contour<u32>> = imageproc::contours::find_contours(mask);

    let mut best: Option<(f64, &Contour<u32>)> = None;
    for contour in contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter(|c| !c.points.is_empty())
    {
        let area = enclosed_area(contour);
        if best.is_none_or(|(best_area, _)| area > best_area) {
            best = Some((area, contour));
        }
    }

    best.and_then(|(_, contour)| bounding_rect(contour))
}

/// Absolute polygon area of a contour (shoelace formula).
fn enclosed_area(contour: &Contour<u32>) -> f64 {
    let points = &contour.points;
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let twice_signed: f64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            f64::from(a.x).mul_add(f64::from(b.y), -(f64::from(b.x) * f64::from(a.y)))
        })
        .sum();
    twice_signed.abs() / 2.0
}

/// Inclusive axis-aligned bounds of a contour's points.
fn bounding_rect(contour: &Contour<u32>) -> Option<BoundingBox> {
    let min_x = contour.points.iter().map(|p| p.x).min()?;
    let max_x = contour.points.iter().map(|p| p.x).max()?;
    let min_y = contour.points.iter().map(|p| p.y).min()?;
    let max_y = contour.points.iter().map(|p| p.y).max()?;
    Some(BoundingBox::new(
        min_x,
        min_y,
        max_x - min_x + 1,
        max_y - min_y + 1,
    ))
}
