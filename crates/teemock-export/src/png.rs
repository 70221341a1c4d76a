//! PNG encoding for finished mockups.

use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use teemock_pipeline::RgbImage;

use crate::ExportError;

/// Encode an RGB mockup as PNG bytes.
///
/// PNG is lossless, so decoding the result reproduces `image` exactly.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the encoder rejects the buffer.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn output_has_png_signature() {
        let img = RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3]));
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn decodes_to_same_pixels() {
        let img = RgbImage::from_fn(5, 4, |x, y| {
            image::Rgb([u8::try_from(x * 50).unwrap(), u8::try_from(y * 60).unwrap(), 7])
        });
        let bytes = encode_png(&img).unwrap();
        let back = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(back, img);
    }
}
