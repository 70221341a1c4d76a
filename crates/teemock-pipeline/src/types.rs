//! Shared types for the teemock compositing pipeline.

use serde::{Deserialize, Serialize};

use crate::blend::BlendMode;

/// Re-export `GrayImage` so downstream crates can reference luminance
/// data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage`: garments and finished mockups are opaque RGB.
pub use image::RgbImage;

/// Re-export `RgbaImage`: graphics carry an alpha channel.
pub use image::RgbaImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of any `image` buffer.
    #[must_use]
    pub fn of<I: image::GenericImageView>(image: &I) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }

    /// Returns `true` if either axis is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned rectangle in image-pixel coordinates.
///
/// Produced by the silhouette detector, so it always lies inside the
/// image it was detected in: `x + width <= image.width` and
/// `y + height <= image.height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge (inclusive).
    pub x: u32,
    /// Top edge (inclusive).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl BoundingBox {
    /// Create a new bounding box.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the right-most column.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottom-most row.
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Per-garment-class placement parameters.
///
/// Two instances normally exist, one for model-worn photographs and one
/// for flat/plain garments; see [`crate::profile::PlacementProfiles`].
///
/// # Invariants
///
/// Checked by [`validate`](Self::validate) before a batch starts:
///
/// - `padding_ratio` in `(0, 1]`
/// - `skew_x_deg` and `skew_y_deg` in `[-30, 30]`
/// - every field finite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Fraction of the detected garment area the graphic may occupy.
    pub padding_ratio: f64,

    /// Vertical offset from the garment's top edge, as a percentage of
    /// the detected height. Zero places the graphic at the top edge.
    pub vertical_offset_pct: f64,

    /// Horizontal shift from centre, as a percentage of the detected width.
    pub horizontal_offset_pct: f64,

    /// Horizontal shear in degrees.
    pub skew_x_deg: f64,

    /// Vertical shear in degrees.
    pub skew_y_deg: f64,
}

impl PlacementConfig {
    /// Default padding ratio for both garment classes.
    pub const DEFAULT_PADDING_RATIO: f64 = 0.45;

    /// Default vertical offset for plain garments (percent).
    pub const DEFAULT_PLAIN_VERTICAL_OFFSET_PCT: f64 = 23.0;

    /// Default vertical offset for model-worn garments (percent).
    ///
    /// A model's shoulders and neck push the print area further down
    /// the detected silhouette than on a flat-laid shirt.
    pub const DEFAULT_MODEL_VERTICAL_OFFSET_PCT: f64 = 38.0;

    /// Largest accepted skew magnitude in degrees.
    pub const MAX_SKEW_DEG: f64 = 30.0;

    /// Default placement for flat/plain garments.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            padding_ratio: Self::DEFAULT_PADDING_RATIO,
            vertical_offset_pct: Self::DEFAULT_PLAIN_VERTICAL_OFFSET_PCT,
            horizontal_offset_pct: 0.0,
            skew_x_deg: 0.0,
            skew_y_deg: 0.0,
        }
    }

    /// Default placement for model-worn garments.
    #[must_use]
    pub const fn model() -> Self {
        Self {
            vertical_offset_pct: Self::DEFAULT_MODEL_VERTICAL_OFFSET_PCT,
            ..Self::plain()
        }
    }

    /// Collect every invariant violation, each prefixed with `label`.
    ///
    /// Returns an empty vector when the config is valid.
    #[must_use]
    pub fn validate(&self, label: &str) -> Vec<String> {
        let mut issues = Vec::new();

        let fields = [
            ("padding_ratio", self.padding_ratio),
            ("vertical_offset_pct", self.vertical_offset_pct),
            ("horizontal_offset_pct", self.horizontal_offset_pct),
            ("skew_x_deg", self.skew_x_deg),
            ("skew_y_deg", self.skew_y_deg),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                issues.push(format!("{label}: {name} must be finite, got {value}"));
            }
        }

        if self.padding_ratio.is_finite() && !(self.padding_ratio > 0.0 && self.padding_ratio <= 1.0)
        {
            issues.push(format!(
                "{label}: padding_ratio must be in (0, 1], got {}",
                self.padding_ratio
            ));
        }

        for (name, value) in [("skew_x_deg", self.skew_x_deg), ("skew_y_deg", self.skew_y_deg)] {
            if value.is_finite() && value.abs() > Self::MAX_SKEW_DEG {
                issues.push(format!(
                    "{label}: {name} must be in [-{max}, {max}], got {value}",
                    max = Self::MAX_SKEW_DEG
                ));
            }
        }

        issues
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self::plain()
    }
}

/// Batch-wide rendering parameters shared by every pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockupSettings {
    /// Maximum wrinkle displacement in pixels (both axes). Zero disables
    /// the warp.
    pub warp_intensity: f64,

    /// Graphic opacity in `[0, 1]`. Only used by [`BlendMode::Auto`].
    pub opacity: f64,

    /// Photometric blend policy.
    pub blend_mode: BlendMode,
}

impl MockupSettings {
    /// Default wrinkle warp intensity in pixels.
    pub const DEFAULT_WARP_INTENSITY: f64 = 8.0;

    /// Default graphic opacity.
    pub const DEFAULT_OPACITY: f64 = 1.0;

    /// Collect every invariant violation.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !(self.warp_intensity.is_finite() && self.warp_intensity >= 0.0) {
            issues.push(format!(
                "warp_intensity must be a finite value >= 0, got {}",
                self.warp_intensity
            ));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            issues.push(format!("opacity must be in [0, 1], got {}", self.opacity));
        }
        issues
    }
}

impl Default for MockupSettings {
    fn default() -> Self {
        Self {
            warp_intensity: Self::DEFAULT_WARP_INTENSITY,
            opacity: Self::DEFAULT_OPACITY,
            blend_mode: BlendMode::default(),
        }
    }
}

/// Errors reported to the caller of the pipeline.
///
/// Stage-local fallbacks (no silhouette, misaligned warp region,
/// out-of-bounds placement) are not errors and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode an input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Batch-wide configuration is invalid. Carries every issue found.
    #[error("invalid mockup configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    /// The batch worker pool could not be started.
    #[error("failed to build rayon thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
