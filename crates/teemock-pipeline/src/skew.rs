//! 2-D shear (skew) of the placed graphic.
//!
//! Inverse mapping with the affine matrix
//! `[[1, tan(skew_x), 0], [tan(skew_y), 1, 0]]` evaluated at pixel
//! centres: output pixel `(x, y)` samples the source at
//!
//! ```text
//! src_x = x + tan(skew_x) * (y + 0.5)
//! src_y = y + tan(skew_y) * (x + 0.5)
//! ```
//!
//! Positive `skew_x` slants lower rows to the left, positive `skew_y`
//! slants right-hand columns upwards. The canvas keeps its size, so
//! large angles clip corners. Samples that land outside the source are
//! fully transparent.

use image::Rgba;

use crate::types::RgbaImage;

/// Catmull-Rom cubic convolution parameter.
const CUBIC_A: f64 = -0.5;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Shear `graphic` by the given angles in degrees.
///
/// The output has the same dimensions as the input. Zero angles return
/// an exact copy.
#[must_use = "returns the skewed graphic"]
pub fn skew(graphic: &RgbaImage, skew_x_deg: f64, skew_y_deg: f64) -> RgbaImage {
    if skew_x_deg == 0.0 && skew_y_deg == 0.0 {
        return graphic.clone();
    }

    let shear_x = skew_x_deg.to_radians().tan();
    let shear_y = skew_y_deg.to_radians().tan();

    RgbaImage::from_fn(graphic.width(), graphic.height(), |x, y| {
        let src_x = shear_x.mul_add(f64::from(y) + 0.5, f64::from(x));
        let src_y = shear_y.mul_add(f64::from(x) + 0.5, f64::from(y));
        sample_bicubic(graphic, src_x, src_y)
    })
}

/// Bicubic sample at pixel coordinates `(x, y)`.
///
/// Returns transparent when the sample's centre lies outside the
/// source. Neighbour taps beyond the edge are clamped.
#[allow(clippy::cast_possible_truncation)]
fn sample_bicubic(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = image.dimensions();
    let (wf, hf) = (f64::from(w), f64::from(h));
    if !(x >= -0.5 && x < wf - 0.5 && y >= -0.5 && y < hf - 0.5) {
        return TRANSPARENT;
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let wx = weights(x - x0);
    let wy = weights(y - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut acc = [0.0_f64; 4];
    for (j, wyj) in wy.iter().enumerate() {
        let sy = clamp_index(y0 - 1 + j as i64, h);
        let mut row = [0.0_f64; 4];
        for (i, wxi) in wx.iter().enumerate() {
            let sx = clamp_index(x0 - 1 + i as i64, w);
            let p = image.get_pixel(sx, sy).0;
            for (c, value) in row.iter_mut().enumerate() {
                *value = wxi.mul_add(f64::from(p[c]), *value);
            }
        }
        for (c, value) in acc.iter_mut().enumerate() {
            *value = wyj.mul_add(row[c], *value);
        }
    }

    Rgba(acc.map(quantize))
}

/// Kernel weights for the four taps at offsets -1, 0, 1, 2 from the
/// floor coordinate, given the fractional part `t`.
fn weights(t: f64) -> [f64; 4] {
    [cubic(1.0 + t), cubic(t), cubic(1.0 - t), cubic(2.0 - t)]
}

fn cubic(d: f64) -> f64 {
    let d = d.abs();
    if d <= 1.0 {
        ((CUBIC_A + 2.0) * d - (CUBIC_A + 3.0)) * d * d + 1.0
    } else if d < 2.0 {
        (((d - 5.0) * d + 8.0) * d - 4.0) * CUBIC_A
    } else {
        0.0
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_index(i: i64, len: u32) -> u32 {
    i.clamp(0, i64::from(len) - 1) as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
