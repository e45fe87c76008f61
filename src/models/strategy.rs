use serde::{Deserialize, Serialize};

use crate::models::analysis::{ImageAnalysis, Lighting};

/// Concrete pixel-adjustment parameters derived from an [`ImageAnalysis`].
///
/// All three multipliers are pre-clamped to safe ranges so the enhancer can
/// apply them without further checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancementStrategy {
    /// Brightness multiplier, clamped to [0.7, 1.5].
    pub brightness: f64,
    /// Saturation multiplier, clamped to [0.8, 1.5].
    pub saturation: f64,
    /// Linear contrast multiplier, clamped to [0.8, 1.5].
    pub contrast: f64,
    /// Unsharp-mask strength; 0 disables sharpening.
    pub sharpen: u32,
}

impl Default for EnhancementStrategy {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            saturation: 1.0,
            contrast: 1.0,
            sharpen: 0,
        }
    }
}

impl EnhancementStrategy {
    /// Map a scene analysis to adjustment parameters.
    ///
    /// The numeric ranges come from listing-photo tuning: over-brightening
    /// interiors or over-sharpening exteriors reads as obviously edited, so
    /// every factor is capped.
    pub fn from_analysis(analysis: &ImageAnalysis) -> Self {
        let mut strategy = Self::default();

        if analysis.needs_brightness_boost {
            // The model reports brightness in [-50, 50]; convert to a multiplier.
            let factor = 1.0 + analysis.brightness_adjustment / 100.0;
            strategy.brightness = factor.clamp(0.7, 1.5);
        }

        if analysis.needs_saturation_boost {
            strategy.saturation = analysis.saturation_adjustment.clamp(0.8, 1.5);
        }

        if analysis.needs_contrast_boost {
            strategy.contrast = analysis.contrast_adjustment.clamp(0.8, 1.5);
        }

        if analysis.needs_sharpness {
            // Moderate value to avoid over-sharpening halos.
            strategy.sharpen = 2;
        }

        match analysis.room_type.as_str() {
            "exterior" => {
                strategy.saturation = (strategy.saturation * 1.1).min(1.5);
                strategy.sharpen = 3;
            }
            "bathroom" => {
                strategy.brightness = (strategy.brightness * 1.1).min(1.4);
            }
            "kitchen" => {
                strategy.saturation = (strategy.saturation * 1.05).min(1.3);
            }
            _ => {}
        }

        match analysis.lighting {
            Lighting::Dark => {
                strategy.brightness = (strategy.brightness * 1.2).min(1.5);
                strategy.contrast = (strategy.contrast * 1.1).min(1.4);
            }
            Lighting::Bright => {
                strategy.brightness = (strategy.brightness * 0.95).max(0.9);
            }
            Lighting::Normal => {}
        }

        strategy
    }
}
