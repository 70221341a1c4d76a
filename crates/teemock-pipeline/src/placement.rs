//! Placement: where and how large the graphic is drawn on the garment.
//!
//! With a detected silhouette the graphic is scaled uniformly to fit
//! `padding_ratio` of the silhouette (never upscaled), centred
//! horizontally, and anchored at the silhouette's top edge plus a
//! percentage offset. Printed designs sit below the collar, so a zero
//! vertical offset means "at the top edge", not "centred".
//!
//! Without a silhouette the graphic keeps its size and is centred in
//! the whole photograph; offsets are ignored.
//!
//! Coordinates are not clamped to the garment. Downstream stages
//! tolerate out-of-range placements.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, Dimensions, PlacementConfig, RgbaImage};

/// Resolved top-left corner and size of the drawn graphic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Left edge on the garment (may be negative or past the right edge).
    pub x: i64,
    /// Top edge on the garment (may be negative or past the bottom edge).
    pub y: i64,
    /// Scaled graphic width in pixels.
    pub width: u32,
    /// Scaled graphic height in pixels.
    pub height: u32,
    /// Uniform scale factor applied to the source graphic.
    pub scale: f64,
}

impl Placement {
    /// Replace the resolved origin, keeping size and scale.
    ///
    /// Used when an interactive canvas supplies an explicit position.
    #[must_use]
    pub const fn with_origin(self, x: i64, y: i64) -> Self {
        Self { x, y, ..self }
    }

    /// Scaled size as [`Dimensions`].
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// Resolve a placement for one (graphic, garment) pair.
#[must_use]
pub fn solve(
    silhouette: Option<BoundingBox>,
    garment: Dimensions,
    graphic: Dimensions,
    config: &PlacementConfig,
) -> Placement {
    let Some(bounds) = silhouette else {
        return centred_unscaled(garment, graphic);
    };

    if graphic.is_empty() {
        return Placement {
            x: i64::from(bounds.x),
            y: i64::from(bounds.y),
            width: graphic.width,
            height: graphic.height,
            scale: 1.0,
        };
    }

    let box_w = f64::from(bounds.width);
    let box_h = f64::from(bounds.height);
    let scale = (box_w / f64::from(graphic.width))
        .min(box_h / f64::from(graphic.height))
        .min(1.0)
        * config.padding_ratio;

    let width = scaled_extent(graphic.width, scale);
    let height = scaled_extent(graphic.height, scale);

    let x_offset = round_to_i64(box_w * config.horizontal_offset_pct / 100.0);
    let y_offset = round_to_i64(box_h * config.vertical_offset_pct / 100.0);

    let slack = i64::from(bounds.width) - i64::from(width);
    let x = i64::from(bounds.x) + slack.div_euclid(2) + x_offset;
    let y = i64::from(bounds.y) + y_offset;

    Placement {
        x,
        y,
        width,
        height,
        scale,
    }
}

/// Fallback when no silhouette was found: original size, centred.
fn centred_unscaled(garment: Dimensions, graphic: Dimensions) -> Placement {
    let x = (i64::from(garment.width) - i64::from(graphic.width)).div_euclid(2);
    let y = (i64::from(garment.height) - i64::from(graphic.height)).div_euclid(2);
    Placement {
        x,
        y,
        width: graphic.width,
        height: graphic.height,
        scale: 1.0,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_extent(extent: u32, scale: f64) -> u32 {
    let scaled = (f64::from(extent) * scale).round();
    (scaled as u32).clamp(1, extent.max(1))
}

#[allow(clippy::cast_possible_truncation)]
fn round_to_i64(value: f64) -> i64 {
    value.round() as i64
}

/// Resample the graphic to the placement's size.
///
/// Uses a bicubic (Catmull-Rom) filter. A placement that keeps the
/// original size returns an unmodified copy.
#[must_use = "returns the resized graphic"]
pub fn resize(graphic: &RgbaImage, placement: &Placement) -> RgbaImage {
    if graphic.dimensions() == (placement.width, placement.height) {
        return graphic.clone();
    }

    image::imageops::resize(
        graphic,
        placement.width,
        placement.height,
        FilterType::CatmullRom,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    #[test]
    fn fallback_centres_without_scaling() {
        let p = solve(None, dims(100, 80), dims(40, 20), &PlacementConfig::plain());
        assert_eq!((p.x, p.y, p.width, p.height), (30, 30, 40, 20));
        assert!((p.scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fallback_ignores_offsets() {
        let config = PlacementConfig {
            vertical_offset_pct: 50.0,
            horizontal_offset_pct: -20.0,
            ..PlacementConfig::plain()
        };
        let p = solve(None, dims(100, 100), dims(10, 10), &config);
        assert_eq!((p.x, p.y), (45, 45));
    }

    #[test]
    fn fallback_with_oversized_graphic_goes_negative() {
        let p = solve(None, dims(10, 10), dims(15, 13), &PlacementConfig::plain());
        assert_eq!((p.x, p.y), (-3, -2));
    }

    #[test]
    fn large_graphic_is_scaled_to_padding_of_box() {
        let bounds = BoundingBox::new(100, 50, 400, 600);
        let config = PlacementConfig {
            padding_ratio: 0.5,
            vertical_offset_pct: 0.0,
            ..PlacementConfig::plain()
        };
        let p = solve(Some(bounds), dims(800, 800), dims(1000, 1000), &config);
        // min(400/1000, 600/1000, 1) * 0.5 = 0.2
        assert!((p.scale - 0.2).abs() < 1e-12);
        assert_eq!((p.width, p.height), (200, 200));
        // Centred in the box width, anchored at the box top.
        assert_eq!((p.x, p.y), (200, 50));
    }

    #[test]
    fn small_graphic_is_never_upscaled() {
        let bounds = BoundingBox::new(0, 0, 1000, 1000);
        let config = PlacementConfig {
            padding_ratio: 1.0,
            ..PlacementConfig::plain()
        };
        let p = solve(Some(bounds), dims(1000, 1000), dims(50, 40), &config);
        assert!((p.scale - 1.0).abs() < f64::EPSILON);
        assert_eq!((p.width, p.height), (50, 40));
    }

    #[test]
    fn scale_never_exceeds_padding_ratio() {
        let graphics = [dims(1, 1), dims(10, 300), dims(640, 480), dims(3000, 20)];
        let boxes = [
            BoundingBox::new(0, 0, 1, 1),
            BoundingBox::new(5, 5, 200, 100),
            BoundingBox::new(0, 0, 5000, 5000),
        ];
        for padding in [0.1, 0.45, 1.0] {
            let config = PlacementConfig {
                padding_ratio: padding,
                ..PlacementConfig::plain()
            };
            for graphic in graphics {
                for bounds in boxes {
                    let p = solve(Some(bounds), dims(5000, 5000), graphic, &config);
                    assert!(p.scale <= padding + 1e-12, "scale {} > {padding}", p.scale);
                    assert!(p.width <= graphic.width && p.height <= graphic.height);
                    assert!(p.width >= 1 && p.height >= 1);
                }
            }
        }
    }

    #[test]
    fn offsets_are_percentages_of_box() {
        let bounds = BoundingBox::new(10, 20, 200, 300);
        let config = PlacementConfig {
            padding_ratio: 0.5,
            vertical_offset_pct: 23.0,
            horizontal_offset_pct: -10.0,
            ..PlacementConfig::plain()
        };
        let p = solve(Some(bounds), dims(400, 400), dims(100, 100), &config);
        // scale = min(2, 3, 1) * 0.5 = 0.5 -> 50x50
        assert_eq!((p.width, p.height), (50, 50));
        // x = 10 + (200 - 50) / 2 + round(200 * -0.1) = 10 + 75 - 20
        assert_eq!(p.x, 65);
        // y = 20 + round(300 * 0.23) = 20 + 69
        assert_eq!(p.y, 89);
    }

    #[test]
    fn scaled_size_is_rounded() {
        let bounds = BoundingBox::new(0, 0, 100, 100);
        let config = PlacementConfig {
            padding_ratio: 0.45,
            ..PlacementConfig::plain()
        };
        // min(100/300, 100/200, 1) * 0.45 = 0.15 -> 45 x 30
        let p = solve(Some(bounds), dims(100, 100), dims(300, 200), &config);
        assert_eq!((p.width, p.height), (45, 30));
    }

    #[test]
    fn with_origin_keeps_size() {
        let p = solve(None, dims(100, 100), dims(10, 20), &PlacementConfig::plain());
        let moved = p.with_origin(-5, 7);
        assert_eq!((moved.x, moved.y), (-5, 7));
        assert_eq!(moved.dimensions(), p.dimensions());
    }

    #[test]
    fn resize_same_size_is_copy() {
        let img = RgbaImage::from_fn(4, 3, |x, y| {
            image::Rgba([u8::try_from(x * 10 + y).unwrap_or(0), 0, 0, 255])
        });
        let p = solve(None, dims(10, 10), dims(4, 3), &PlacementConfig::plain());
        assert_eq!(resize(&img, &p), img);
    }

    #[test]
    fn resize_matches_placement() {
        let img = RgbaImage::from_pixel(100, 60, image::Rgba([9, 9, 9, 255]));
        let bounds = BoundingBox::new(0, 0, 100, 100);
        let p = solve(Some(bounds), dims(100, 100), dims(100, 60), &PlacementConfig::plain());
        let resized = resize(&img, &p);
        assert_eq!(resized.dimensions(), (p.width, p.height));
    }
}
