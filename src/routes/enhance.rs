use axum::extract::State;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::enhance::{EnhanceRequest, EnhanceResponse};
use crate::models::strategy::EnhancementStrategy;
use crate::routes::error::{ApiError, ApiResult};
use crate::services::enhancer;

/// POST /api/v1/enhance — analyze a photo and apply local pixel adjustments.
///
/// The vision model decides what the photo needs; the adjustments themselves
/// run in-process, so this endpoint involves a single remote call.
pub async fn enhance_photo(
    State(state): State<AppState>,
    Json(request): Json<EnhanceRequest>,
) -> ApiResult<Json<EnhanceResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let image_bytes = enhancer::decode_image(&request.image)?;
    let format = image::guess_format(&image_bytes)
        .map_err(|_| ApiError::UnsupportedImage("unrecognized image format".to_string()))?;

    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        image_bytes = image_bytes.len(),
        format = ?format,
        "enhancement request received"
    );
    metrics::counter!("enhance_requests_total").increment(1);

    // Remote APIs want a proper data URL even when the client sent bare base64.
    let data_url = if request.image.starts_with("data:") {
        request.image.clone()
    } else {
        format!(
            "data:{};base64,{}",
            format.to_mime_type(),
            request.image.trim()
        )
    };

    let analysis = state.vision.analyze_photo(&data_url).await?;
    let strategy = EnhancementStrategy::from_analysis(&analysis);

    tracing::info!(
        %request_id,
        lighting = %analysis.lighting,
        room_type = %analysis.room_type,
        brightness = strategy.brightness,
        contrast = strategy.contrast,
        saturation = strategy.saturation,
        sharpen = strategy.sharpen,
        "strategy derived from analysis"
    );

    let start = std::time::Instant::now();
    let enhanced = enhancer::enhance_image(&image_bytes, &strategy)?;
    metrics::histogram!("enhance_processing_seconds").record(start.elapsed().as_secs_f64());

    tracing::info!(
        %request_id,
        output_bytes = enhanced.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "enhancement complete"
    );

    Ok(Json(EnhanceResponse {
        success: true,
        analysis,
        strategy,
        enhanced_image: enhancer::to_data_url(&enhanced),
    }))
}
