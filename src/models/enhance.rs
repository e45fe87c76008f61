use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::models::analysis::ImageAnalysis;
use crate::models::strategy::EnhancementStrategy;

/// Request to enhance a listing photo in place (analysis + local adjustments).
///
/// `image` is a base64 data URL (`data:image/jpeg;base64,...`); a bare base64
/// payload is also accepted. 50 MB body limit is enforced at the HTTP layer.
#[derive(Debug, Deserialize, Validate)]
pub struct EnhanceRequest {
    #[garde(length(min = 1))]
    pub image: String,
}

/// Response for a local enhancement: the applied analysis and strategy are
/// echoed back so the frontend can display what was done.
#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub success: bool,
    pub analysis: ImageAnalysis,
    pub strategy: EnhancementStrategy,
    /// Enhanced image as a base64 JPEG data URL.
    pub enhanced_image: String,
}

/// Request to upscale a photo via the remote prediction service.
#[derive(Debug, Deserialize, Validate)]
pub struct UpscaleRequest {
    #[garde(length(min = 1))]
    pub image: String,

    /// Upscale factor; the model supports 2x and 4x.
    #[garde(range(min = 2, max = 4))]
    #[serde(default = "default_scale")]
    pub scale: u32,
}

fn default_scale() -> u32 {
    4
}

/// Response for a completed upscale: a URL to the generated image.
#[derive(Debug, Serialize)]
pub struct UpscaleResponse {
    pub success: bool,
    pub prediction_id: String,
    pub output_url: String,
}
