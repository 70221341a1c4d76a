//! Per-garment placement profiles.
//!
//! This module defines the [`ConfigResolver`] trait, which maps a garment
//! identifier to the [`PlacementConfig`] used for it, and the
//! [`GarmentClass`] enum with its name-based [`classify`] rule.
//!
//! # Strategy pattern
//!
//! Model-worn photographs and flat-laid shirts need different vertical
//! offsets. [`PlacementProfiles`] resolves by garment class; a bare
//! [`PlacementConfig`] resolves every garment to itself. Callers with
//! other rules (e.g. per-garment overrides) implement the trait.

use serde::{Deserialize, Serialize};

use crate::types::PlacementConfig;

/// Substring that marks a garment identifier as model-worn.
const MODEL_MARKER: &str = "model";

/// Coarse garment category used to pick placement defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GarmentClass {
    /// Photographed on a person.
    Model,
    /// Flat-laid or on a hanger.
    Plain,
}

impl GarmentClass {
    /// Lowercase label, as used in validation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Plain => "plain",
        }
    }
}

impl std::fmt::Display for GarmentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a garment by its identifier.
///
/// Identifiers containing `model` (any case) are model-worn; everything
/// else is plain.
#[must_use]
pub fn classify(garment_id: &str) -> GarmentClass {
    if garment_id.to_lowercase().contains(MODEL_MARKER) {
        GarmentClass::Model
    } else {
        GarmentClass::Plain
    }
}

/// Trait for placement-config resolution strategies.
///
/// Implementations are shared across worker threads during a batch, so
/// they must be [`Sync`].
pub trait ConfigResolver: Sync {
    /// The placement config to use for `garment_id`.
    fn resolve(&self, garment_id: &str) -> &PlacementConfig;

    /// Every distinct config this resolver can return, labelled for
    /// validation messages.
    fn profiles(&self) -> Vec<(&str, &PlacementConfig)>;
}

/// One [`PlacementConfig`] per [`GarmentClass`].
///
/// Deserialization fills each class's missing fields from that class's
/// own defaults, so a partial `model` entry keeps the model offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProfilesOverlay")]
pub struct PlacementProfiles {
    /// Used for garments classified as [`GarmentClass::Model`].
    pub model: PlacementConfig,
    /// Used for garments classified as [`GarmentClass::Plain`].
    pub plain: PlacementConfig,
}

impl PlacementProfiles {
    /// The config for a garment class.
    #[must_use]
    pub const fn for_class(&self, class: GarmentClass) -> &PlacementConfig {
        match class {
            GarmentClass::Model => &self.model,
            GarmentClass::Plain => &self.plain,
        }
    }
}

impl Default for PlacementProfiles {
    fn default() -> Self {
        Self {
            model: PlacementConfig::model(),
            plain: PlacementConfig::plain(),
        }
    }
}

/// Serialized form of [`PlacementProfiles`]: every field optional.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ProfilesOverlay {
    model: ConfigOverlay,
    plain: ConfigOverlay,
}

/// Fields present in a partial [`PlacementConfig`].
#[derive(Deserialize, Default)]
#[serde(default)]
struct ConfigOverlay {
    padding_ratio: Option<f64>,
    vertical_offset_pct: Option<f64>,
    horizontal_offset_pct: Option<f64>,
    skew_x_deg: Option<f64>,
    skew_y_deg: Option<f64>,
}

impl ConfigOverlay {
    fn over(self, base: PlacementConfig) -> PlacementConfig {
        PlacementConfig {
            padding_ratio: self.padding_ratio.unwrap_or(base.padding_ratio),
            vertical_offset_pct: self.vertical_offset_pct.unwrap_or(base.vertical_offset_pct),
            horizontal_offset_pct: self
                .horizontal_offset_pct
                .unwrap_or(base.horizontal_offset_pct),
            skew_x_deg: self.skew_x_deg.unwrap_or(base.skew_x_deg),
            skew_y_deg: self.skew_y_deg.unwrap_or(base.skew_y_deg),
        }
    }
}

impl From<ProfilesOverlay> for PlacementProfiles {
    fn from(overlay: ProfilesOverlay) -> Self {
        Self {
            model: overlay.model.over(PlacementConfig::model()),
            plain: overlay.plain.over(PlacementConfig::plain()),
        }
    }
}

impl ConfigResolver for PlacementProfiles {
    fn resolve(&self, garment_id: &str) -> &PlacementConfig {
        self.for_class(classify(garment_id))
    }

    fn profiles(&self) -> Vec<(&str, &PlacementConfig)> {
        vec![
            (GarmentClass::Model.label(), &self.model),
            (GarmentClass::Plain.label(), &self.plain),
        ]
    }
}

impl ConfigResolver for PlacementConfig {
    fn resolve(&self, _garment_id: &str) -> &PlacementConfig {
        self
    }

    fn profiles(&self) -> Vec<(&str, &PlacementConfig)> {
        vec![("placement", self)]
    }
}
