//! teemock-pipeline: garment mockup compositing engine (sans-IO).
//!
//! Puts a flat graphic onto a garment photograph through:
//! silhouette detection -> placement -> resize -> skew ->
//! wrinkle warp -> photometric blend.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and image buffers and returns structured data. Reading
//! files, naming outputs on disk and archiving live in `teemock-export`
//! and the `teemock` command-line tool.

pub mod batch;
pub mod blend;
pub mod blur;
pub mod grayscale;
pub mod placement;
pub mod profile;
pub mod silhouette;
pub mod skew;
pub mod types;
pub mod warp;

pub use batch::{BatchOptions, BatchReport, MockupResult, PairFailure, Source, output_file_name};
pub use blend::{BlendMode, Composite};
pub use placement::Placement;
pub use profile::{ConfigResolver, GarmentClass, PlacementProfiles, classify};
pub use types::{
    BoundingBox, Dimensions, MockupSettings, PipelineError, PlacementConfig, RgbImage, RgbaImage,
};
pub use warp::WarpOutcome;

/// One finished (graphic, garment) composite and how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Mockup {
    /// The composited garment photograph.
    pub image: RgbImage,
    /// Detected garment rectangle, `None` when the fallback was used.
    pub silhouette: Option<BoundingBox>,
    /// Where and how large the graphic was drawn.
    pub placement: Placement,
    /// Whether the wrinkle displacement was applied.
    pub warped: bool,
    /// Whether part of the graphic fell outside the garment.
    pub truncated: bool,
}

/// Composite one graphic onto one garment.
///
/// `origin_override` replaces the solved top-left corner (e.g. from an
/// interactive canvas) while keeping the solved size.
///
/// # Pipeline steps
///
/// 1. Silhouette detection on the garment
/// 2. Placement (scale and position)
/// 3. Resize to the placement size (Catmull-Rom)
/// 4. Skew by the config's angles
/// 5. Wrinkle warp from the garment's luminance
/// 6. Blend onto the garment
///
/// Every stage has a defined fallback, so this cannot fail.
#[must_use]
pub fn compose(
    garment: &RgbImage,
    graphic: &RgbaImage,
    config: &PlacementConfig,
    settings: &MockupSettings,
    origin_override: Option<(i64, i64)>,
) -> Mockup {
    // 1. Silhouette.
    let silhouette = silhouette::detect(garment);
    if silhouette.is_none() {
        tracing::debug!("no silhouette found, centring on the full image");
    }

    // 2. Placement.
    let mut placement = placement::solve(
        silhouette,
        Dimensions::of(garment),
        Dimensions::of(graphic),
        config,
    );
    if let Some((x, y)) = origin_override {
        placement = placement.with_origin(x, y);
    }
    tracing::debug!(
        x = placement.x,
        y = placement.y,
        width = placement.width,
        height = placement.height,
        scale = placement.scale,
        "placement resolved",
    );

    // 3-4. Resize and skew.
    let resized = placement::resize(graphic, &placement);
    let skewed = skew::skew(&resized, config.skew_x_deg, config.skew_y_deg);

    // 5. Wrinkle warp.
    let (layer, warped) = if settings.warp_intensity > 0.0 {
        let outcome = warp::warp(
            garment,
            &skewed,
            placement.x,
            placement.y,
            settings.warp_intensity,
        );
        if !outcome.is_displaced() {
            tracing::debug!("graphic footprint leaves the garment, skipping warp");
        }
        let warped = outcome.is_displaced();
        (outcome.into_image(), warped)
    } else {
        (skewed, false)
    };

    // 6. Blend.
    let Composite { image, truncated } = blend::composite(
        garment,
        &layer,
        placement.x,
        placement.y,
        settings.opacity,
        settings.blend_mode,
    );
    if truncated {
        tracing::debug!("graphic truncated at the garment edge");
    }

    Mockup {
        image,
        silhouette,
        placement,
        warped,
        truncated,
    }
}
