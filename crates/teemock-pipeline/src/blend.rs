//! Photometric compositing of the warped graphic onto the garment.
//!
//! Two policies are available through [`BlendMode`]:
//!
//! - [`BlendMode::MultiplyPaste`]: multiply garment and graphic colour,
//!   then paste the product through the graphic's alpha channel. Fabric
//!   shading shows through the ink; opacity is not applied.
//! - [`BlendMode::Auto`]: choose multiply on bright regions and screen
//!   on dark ones (multiply would crush a dark shirt to black), then mix
//!   with the garment by `alpha * opacity`.
//!
//! The graphic is clipped to the garment on every side. Colour math runs
//! in normalized `f64` and is rounded back to 8 bits once per channel,
//! so identical inputs always produce identical bytes.

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, Dimensions, RgbImage, RgbaImage};

/// Mean region brightness above which [`BlendMode::Auto`] multiplies.
pub const AUTO_MULTIPLY_THRESHOLD: f64 = 0.6;

/// Photometric blend policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Channel-wise multiply, pasted through the graphic's alpha.
    #[default]
    MultiplyPaste,
    /// Multiply or screen by region brightness, mixed by
    /// `alpha * opacity`.
    Auto,
}

/// Output of [`composite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    /// The finished mockup, same size as the garment.
    pub image: RgbImage,
    /// `true` when part (or all) of the graphic fell outside the garment
    /// and was cut off.
    pub truncated: bool,
}

/// Overlap between a placed graphic and the garment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Overlap {
    /// Visible rectangle in garment coordinates.
    dest: BoundingBox,
    /// Top-left of the visible part in graphic coordinates.
    src_x: u32,
    src_y: u32,
}

/// Composite `graphic` onto `garment` with its top-left at `(x, y)`.
///
/// Inputs are not modified. `opacity` is clamped to `[0, 1]`.
#[must_use]
pub fn composite(
    garment: &RgbImage,
    graphic: &RgbaImage,
    x: i64,
    y: i64,
    opacity: f64,
    mode: BlendMode,
) -> Composite {
    let mut image = garment.clone();
    let graphic_dims = Dimensions::of(graphic);

    let Some(overlap) = overlap(Dimensions::of(garment), graphic_dims, x, y) else {
        return Composite {
            image,
            truncated: !graphic_dims.is_empty(),
        };
    };
    let truncated = overlap.dest.width != graphic_dims.width
        || overlap.dest.height != graphic_dims.height;

    match mode {
        BlendMode::MultiplyPaste => multiply_paste(&mut image, graphic, overlap),
        BlendMode::Auto => auto_blend(&mut image, graphic, overlap, opacity.clamp(0.0, 1.0)),
    }

    Composite { image, truncated }
}

/// Intersect the graphic rectangle at `(x, y)` with the garment.
fn overlap(garment: Dimensions, graphic: Dimensions, x: i64, y: i64) -> Option<Overlap> {
    let (dest_x, src_x, width) = clip_axis(x, graphic.width, garment.width)?;
    let (dest_y, src_y, height) = clip_axis(y, graphic.height, garment.height)?;
    Some(Overlap {
        dest: BoundingBox::new(dest_x, dest_y, width, height),
        src_x,
        src_y,
    })
}

/// Clip one axis: returns `(dest_start, src_start, length)`.
fn clip_axis(start: i64, len: u32, bound: u32) -> Option<(u32, u32, u32)> {
    let lo = start.max(0);
    let hi = start.saturating_add(i64::from(len)).min(i64::from(bound));
    if hi <= lo {
        return None;
    }
    let dest = u32::try_from(lo).ok()?;
    let src = u32::try_from(lo - start).ok()?;
    let length = u32::try_from(hi - lo).ok()?;
    Some((dest, src, length))
}

fn multiply_paste(image: &mut RgbImage, graphic: &RgbaImage, overlap: Overlap) {
    for_each_overlap_pixel(image, graphic, overlap, |garment, ink, alpha| {
        std::array::from_fn(|c| {
            let g = unit(garment[c]);
            let product = g * unit(ink[c]);
            alpha.mul_add(product - g, g)
        })
    });
}

fn auto_blend(image: &mut RgbImage, graphic: &RgbaImage, overlap: Overlap, opacity: f64) {
    let multiply = mean_brightness(image, overlap.dest) > AUTO_MULTIPLY_THRESHOLD;
    for_each_overlap_pixel(image, graphic, overlap, |garment, ink, alpha| {
        let weight = alpha * opacity;
        std::array::from_fn(|c| {
            let g = unit(garment[c]);
            let d = unit(ink[c]);
            let blended = if multiply {
                g * d
            } else {
                1.0 - (1.0 - g) * (1.0 - d)
            };
            weight.mul_add(blended - g, g)
        })
    });
}

/// Apply `blend(garment_rgb, graphic_rgb, graphic_alpha)` over the
/// overlap and write the quantized result back into `image`.
fn for_each_overlap_pixel<F>(image: &mut RgbImage, graphic: &RgbaImage, overlap: Overlap, blend: F)
where
    F: Fn([u8; 3], [u8; 3], f64) -> [f64; 3],
{
    let dest = overlap.dest;
    for dy in 0..dest.height {
        for dx in 0..dest.width {
            let ink = graphic.get_pixel(overlap.src_x + dx, overlap.src_y + dy).0;
            if ink[3] == 0 {
                continue;
            }
            let pixel = image.get_pixel_mut(dest.x + dx, dest.y + dy);
            let out = blend(pixel.0, [ink[0], ink[1], ink[2]], unit(ink[3]));
            pixel.0 = out.map(quantize);
        }
    }
}

/// Mean of all RGB channels over `region`, in `[0, 1]`.
fn mean_brightness(image: &RgbImage, region: BoundingBox) -> f64 {
    let mut sum = 0_u64;
    for y in region.y..region.bottom() {
        for x in region.x..region.right() {
            let p = image.get_pixel(x, y).0;
            sum += u64::from(p[0]) + u64::from(p[1]) + u64::from(p[2]);
        }
    }
    let samples = u64::from(region.width) * u64::from(region.height) * 3;
    if samples == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = sum as f64 / samples as f64;
    mean / 255.0
}

fn unit(v: u8) -> f64 {
    f64::from(v) / 255.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
