//! Wrinkle warp: displace graphic pixels along the garment's folds.
//!
//! The garment's luminance under the graphic's footprint stands in for
//! surface height. Each graphic pixel is resampled from
//!
//! ```text
//! (x + d, y + d),  d = (luminance / 255 - 0.5) * intensity
//! ```
//!
//! so mid-gray fabric leaves the print in place while highlights and
//! shadows push it in opposite directions. Sampling is bilinear with
//! mirrored borders, which keeps the graphic's edges from fringing into
//! transparent black.
//!
//! The displacement needs one luminance sample per graphic pixel. When
//! the footprint is not fully inside the garment the graphic is returned
//! unwarped as [`WarpOutcome::Misaligned`].

use image::{GrayImage, Rgba};

use crate::types::{Dimensions, RgbImage, RgbaImage};

/// Result of [`warp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarpOutcome {
    /// The footprint was fully inside the garment and the graphic was
    /// resampled along the displacement field.
    Displaced(RgbaImage),
    /// The footprint ran off the garment (or the graphic was empty); the
    /// graphic is returned unchanged.
    Misaligned(RgbaImage),
}

impl WarpOutcome {
    /// Whether the displacement was applied.
    #[must_use]
    pub const fn is_displaced(&self) -> bool {
        matches!(self, Self::Displaced(_))
    }

    /// Borrow the resulting graphic.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        match self {
            Self::Displaced(image) | Self::Misaligned(image) => image,
        }
    }

    /// Consume the outcome, returning the graphic either way.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        match self {
            Self::Displaced(image) | Self::Misaligned(image) => image,
        }
    }
}

/// Warp `graphic`, placed with its top-left at `(x, y)` on `garment`.
#[must_use = "returns the warped graphic"]
pub fn warp(garment: &RgbImage, graphic: &RgbaImage, x: i64, y: i64, intensity: f64) -> WarpOutcome {
    let footprint = Dimensions::of(graphic);
    let Some((left, top)) = aligned_origin(Dimensions::of(garment), footprint, x, y) else {
        return WarpOutcome::Misaligned(graphic.clone());
    };

    let patch = image::imageops::crop_imm(garment, left, top, footprint.width, footprint.height)
        .to_image();
    let heights = crate::grayscale::luminance(&patch);
    WarpOutcome::Displaced(displace(graphic, &heights, intensity))
}

/// The footprint's origin as unsigned coordinates, if it lies entirely
/// inside the garment.
fn aligned_origin(garment: Dimensions, footprint: Dimensions, x: i64, y: i64) -> Option<(u32, u32)> {
    if footprint.is_empty() {
        return None;
    }
    let left = u32::try_from(x).ok()?;
    let top = u32::try_from(y).ok()?;
    let fits_x = u64::from(left) + u64::from(footprint.width) <= u64::from(garment.width);
    let fits_y = u64::from(top) + u64::from(footprint.height) <= u64::from(garment.height);
    (fits_x && fits_y).then_some((left, top))
}

/// Resample `graphic` using `heights` (same size) as the displacement
/// field.
fn displace(graphic: &RgbaImage, heights: &GrayImage, intensity: f64) -> RgbaImage {
    let (w, h) = graphic.dimensions();
    RgbaImage::from_fn(w, h, |gx, gy| {
        let height = f64::from(heights.get_pixel(gx, gy).0[0]) / 255.0;
        let d = (height - 0.5) * intensity;
        sample_bilinear_reflect(graphic, f64::from(gx) + d, f64::from(gy) + d)
    })
}

/// Bilinear sample with mirrored (`fedcba|abcdef|fedcba`) borders.
#[allow(clippy::cast_possible_truncation)]
fn sample_bilinear_reflect(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = image.dimensions();
    // Mirroring repeats every 2 * len, so fold into one period before
    // converting to integers.
    let x = x.rem_euclid(2.0 * f64::from(w));
    let y = y.rem_euclid(2.0 * f64::from(h));
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let xa = reflect(x0, w);
    let xb = reflect(x0 + 1, w);
    let ya = reflect(y0, h);
    let yb = reflect(y0 + 1, h);

    let p00 = image.get_pixel(xa, ya).0;
    let p10 = image.get_pixel(xb, ya).0;
    let p01 = image.get_pixel(xa, yb).0;
    let p11 = image.get_pixel(xb, yb).0;

    let mut out = [0_u8; 4];
    for (c, value) in out.iter_mut().enumerate() {
        let top = f64::from(p00[c]).mul_add(1.0 - fx, f64::from(p10[c]) * fx);
        let bottom = f64::from(p01[c]).mul_add(1.0 - fx, f64::from(p11[c]) * fx);
        *value = quantize(top.mul_add(1.0 - fy, bottom * fy));
    }
    Rgba(out)
}

/// Mirror an index into `0..len`, repeating the edge pixel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn reflect(i: i64, len: u32) -> u32 {
    let len = i64::from(len);
    if len <= 1 {
        return 0;
    }
    let period = 2 * len;
    let m = i.rem_euclid(period);
    let mirrored = if m < len { m } else { period - 1 - m };
    mirrored as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_possible_truncation)]
    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([
                ((x * 29) % 256) as u8,
                ((y * 41) % 256) as u8,
                (((x * y) * 7) % 256) as u8,
                255 - ((x + y) % 50) as u8,
            ])
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn wrinkled_garment(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            let v = ((x * 13 + y * 7) % 256) as u8;
            image::Rgb([v, v, v])
        })
    }

    #[test]
    fn zero_intensity_is_identity() {
        let garment = wrinkled_garment(50, 50);
        let graphic = gradient(20, 15);
        let outcome = warp(&garment, &graphic, 10, 12, 0.0);
        assert!(outcome.is_displaced());
        assert_eq!(outcome.into_image(), graphic);
    }

    #[test]
    fn mid_gray_garment_produces_no_displacement() {
        // 128 is as close to mid-gray as 8 bits get; over a uniform
        // graphic the residual 0.04 px shift is invisible.
        let garment = RgbImage::from_pixel(40, 40, image::Rgb([128, 128, 128]));
        let graphic = RgbaImage::from_pixel(10, 10, Rgba([50, 100, 150, 255]));
        let outcome = warp(&garment, &graphic, 5, 5, 20.0);
        assert!(outcome.is_displaced());
        assert_eq!(outcome.image(), &graphic);
    }

    #[test]
    fn footprint_off_the_right_edge_is_misaligned() {
        let garment = wrinkled_garment(30, 30);
        let graphic = gradient(10, 10);
        let outcome = warp(&garment, &graphic, 25, 0, 8.0);
        assert!(!outcome.is_displaced());
        assert_eq!(outcome.into_image(), graphic);
    }

    #[test]
    fn negative_origin_is_misaligned() {
        let garment = wrinkled_garment(30, 30);
        let graphic = gradient(10, 10);
        assert!(matches!(
            warp(&garment, &graphic, -1, 5, 8.0),
            WarpOutcome::Misaligned(_)
        ));
        assert!(matches!(
            warp(&garment, &graphic, 5, -1, 8.0),
            WarpOutcome::Misaligned(_)
        ));
    }

    #[test]
    fn footprint_touching_far_edges_is_aligned() {
        let garment = wrinkled_garment(30, 20);
        let graphic = gradient(10, 5);
        assert!(warp(&garment, &graphic, 20, 15, 8.0).is_displaced());
    }

    #[test]
    fn empty_graphic_is_misaligned() {
        let garment = wrinkled_garment(10, 10);
        let graphic = RgbaImage::new(0, 0);
        assert!(!warp(&garment, &graphic, 0, 0, 8.0).is_displaced());
    }

    #[test]
    fn white_fabric_shifts_sampling_forward() {
        // Pure white: d = 0.5 * 4 = 2 pixels in both axes.
        let garment = RgbImage::from_pixel(20, 20, image::Rgb([255, 255, 255]));
        let graphic = gradient(10, 10);
        let warped = warp(&garment, &graphic, 0, 0, 4.0).into_image();
        assert_eq!(warped.get_pixel(3, 4), graphic.get_pixel(5, 6));
    }

    #[test]
    fn black_fabric_shifts_sampling_backward_with_reflection() {
        // Pure black: d = -0.5 * 4 = -2 pixels; (0, 0) mirrors to (1, 1).
        let garment = RgbImage::from_pixel(20, 20, image::Rgb([0, 0, 0]));
        let graphic = gradient(10, 10);
        let warped = warp(&garment, &graphic, 0, 0, 4.0).into_image();
        assert_eq!(warped.get_pixel(5, 5), graphic.get_pixel(3, 3));
        assert_eq!(warped.get_pixel(0, 0), graphic.get_pixel(1, 1));
    }

    #[test]
    fn output_dimensions_match_graphic() {
        let garment = wrinkled_garment(64, 64);
        let graphic = gradient(17, 9);
        let warped = warp(&garment, &graphic, 3, 4, 12.0).into_image();
        assert_eq!(warped.dimensions(), (17, 9));
    }

    #[test]
    fn huge_intensity_stays_in_bounds() {
        let garment = RgbImage::from_pixel(20, 20, image::Rgb([255, 255, 255]));
        let graphic = gradient(10, 10);
        for intensity in [1e20, 1e300] {
            let warped = warp(&garment, &graphic, 0, 0, intensity).into_image();
            assert_eq!(warped.dimensions(), (10, 10));
        }
        let black = RgbImage::from_pixel(20, 20, image::Rgb([0, 0, 0]));
        assert!(warp(&black, &graphic, 5, 5, 1e20).is_displaced());
    }

    #[test]
    fn folding_matches_mirrored_sampling() {
        // One full period away samples the same pixel.
        let graphic = gradient(10, 10);
        assert_eq!(
            sample_bilinear_reflect(&graphic, 3.0 + 20.0, 4.0 - 40.0),
            *graphic.get_pixel(3, 4)
        );
        assert_eq!(
            sample_bilinear_reflect(&graphic, -1.0, 0.0),
            *graphic.get_pixel(0, 0)
        );
    }

    #[test]
    fn reflect_mirrors_edges() {
        assert_eq!(reflect(-1, 5), 0);
        assert_eq!(reflect(-2, 5), 1);
        assert_eq!(reflect(5, 5), 4);
        assert_eq!(reflect(6, 5), 3);
        assert_eq!(reflect(2, 5), 2);
        assert_eq!(reflect(-7, 1), 0);
    }
}
