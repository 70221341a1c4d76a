//! Fixed 5×5 Gaussian smoothing for silhouette detection.
//!
//! Suppresses sensor noise and fabric texture so the near-white
//! threshold in [`crate::silhouette`] sees a clean background.
//!
//! The kernel is separable: a 5-tap 1-D Gaussian applied horizontally
//! then vertically via [`imageproc::filter::separable_filter_equal`].

use image::GrayImage;

/// Kernel width and height in pixels.
pub const KERNEL_SIZE: usize = 5;

/// Standard deviation implied by a 5-tap kernel when no sigma is given:
/// `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub const KERNEL_SIGMA: f32 = 1.1;

/// Normalized 1-D Gaussian weights for [`KERNEL_SIZE`] taps.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn kernel() -> [f32; KERNEL_SIZE] {
    let radius = (KERNEL_SIZE / 2) as f32;
    let denom = 2.0 * KERNEL_SIGMA * KERNEL_SIGMA;
    let mut weights: [f32; KERNEL_SIZE] = std::array::from_fn(|i| {
        let d = i as f32 - radius;
        (-(d * d) / denom).exp()
    });
    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Smooth a grayscale image with the fixed 5×5 Gaussian.
///
/// Edges are handled by clamping to the nearest border pixel.
#[must_use = "returns the smoothed image"]
pub fn smooth(image: &GrayImage) -> GrayImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }

    imageproc::filter::separable_filter_equal(image, &kernel())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let k = kernel();
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "kernel sum {sum}");
        assert!((k[0] - k[4]).abs() < f32::EPSILON);
        assert!((k[1] - k[3]).abs() < f32::EPSILON);
        assert!(k[2] > k[1] && k[1] > k[0]);
    }

    #[test]
    fn output_dimensions_preserved() {
        let img = GrayImage::new(17, 31);
        let smoothed = smooth(&img);
        assert_eq!(smoothed.dimensions(), (17, 31));
    }

    #[test]
    fn empty_image_is_returned_as_is() {
        let img = GrayImage::new(0, 0);
        assert_eq!(smooth(&img).dimensions(), (0, 0));
    }

    #[test]
    fn uniform_image_stays_near_value() {
        let img = GrayImage::from_pixel(12, 12, image::Luma([128]));
        for pixel in smooth(&img).pixels() {
            let diff = i16::from(pixel.0[0]) - 128;
            assert!(diff.abs() <= 2, "expected ~128, got {}", pixel.0[0]);
        }
    }

    #[test]
    fn sharp_edge_is_softened() {
        let img = GrayImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                image::Luma([0])
            } else {
                image::Luma([255])
            }
        });
        let smoothed = smooth(&img);
        assert!(smoothed.get_pixel(4, 5).0[0] > 0);
        assert!(smoothed.get_pixel(5, 5).0[0] < 255);
        // Three columns away from the boundary is outside the kernel.
        assert!(smoothed.get_pixel(8, 5).0[0] >= 250);
    }
}
