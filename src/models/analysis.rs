use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Overall lighting condition reported by the vision model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Lighting {
    Dark,
    Normal,
    Bright,
}

/// Scene analysis of a listing photo, as returned by the vision model.
///
/// The model is prompted to emit exactly this JSON shape; unknown room types
/// and missing fields fall back to conservative defaults rather than failing
/// the whole request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysis {
    #[serde(default = "default_lighting")]
    pub lighting: Lighting,

    /// Free-form room label ("bedroom", "living", "kitchen", "bathroom",
    /// "exterior", ...). Kept as a string since the model occasionally invents
    /// new categories.
    #[serde(default = "default_room_type")]
    pub room_type: String,

    #[serde(default)]
    pub main_issues: Vec<String>,

    #[serde(default)]
    pub needs_brightness_boost: bool,
    #[serde(default)]
    pub needs_contrast_boost: bool,
    #[serde(default)]
    pub needs_saturation_boost: bool,
    #[serde(default)]
    pub needs_sharpness: bool,

    /// Brightness adjustment in [-50, 50].
    #[serde(default)]
    pub brightness_adjustment: f64,
    /// Contrast multiplier in [0.5, 2.0].
    #[serde(default = "default_unit_factor")]
    pub contrast_adjustment: f64,
    /// Saturation multiplier in [0.5, 2.0].
    #[serde(default = "default_unit_factor")]
    pub saturation_adjustment: f64,
}

fn default_lighting() -> Lighting {
    Lighting::Normal
}

fn default_room_type() -> String {
    "unknown".to_string()
}

fn default_unit_factor() -> f64 {
    1.0
}

impl ImageAnalysis {
    /// Conservative default analysis used when the vision model's reply cannot
    /// be parsed: a mild all-around boost.
    pub fn fallback() -> Self {
        Self {
            lighting: Lighting::Normal,
            room_type: "unknown".to_string(),
            main_issues: vec!["unclear analysis".to_string()],
            needs_brightness_boost: true,
            needs_contrast_boost: true,
            needs_saturation_boost: true,
            needs_sharpness: true,
            brightness_adjustment: 20.0,
            contrast_adjustment: 1.2,
            saturation_adjustment: 1.15,
        }
    }
}
