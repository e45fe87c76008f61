use axum::extract::{Path, State};
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::models::enhance::{UpscaleRequest, UpscaleResponse};
use crate::models::prediction::Prediction;
use crate::routes::error::{ApiError, ApiResult};
use crate::services::enhancer;
use crate::services::poller::{self, never_cancel};

/// POST /api/v1/upscale — submit an upscale prediction and wait for its result.
///
/// The handler blocks (cooperatively) until the remote prediction reaches a
/// terminal state or the polling deadline passes. A client disconnect drops
/// this future and with it the polling loop.
pub async fn upscale_photo(
    State(state): State<AppState>,
    Json(request): Json<UpscaleRequest>,
) -> ApiResult<Json<UpscaleResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let image_bytes = enhancer::decode_image(&request.image)?;
    let format = image::guess_format(&image_bytes)
        .map_err(|_| ApiError::UnsupportedImage("unrecognized image format".to_string()))?;

    let data_url = if request.image.starts_with("data:") {
        request.image.clone()
    } else {
        format!(
            "data:{};base64,{}",
            format.to_mime_type(),
            request.image.trim()
        )
    };

    metrics::counter!("upscale_predictions_total").increment(1);

    let initial = state.replicate.submit_upscale(&data_url, request.scale).await?;
    let prediction_id = initial.id.clone();
    tracing::info!(
        %prediction_id,
        status = %initial.status,
        scale = request.scale,
        "upscale prediction submitted"
    );

    let replicate = state.replicate.clone();
    let start = std::time::Instant::now();
    let result = poller::poll_prediction(
        initial,
        move |id| {
            let replicate = replicate.clone();
            async move { replicate.get_prediction(&id).await }
        },
        &state.poll_settings,
        never_cancel(),
    )
    .await;
    metrics::histogram!("upscale_poll_seconds").record(start.elapsed().as_secs_f64());

    match result {
        Ok(output_url) => {
            metrics::counter!("upscale_predictions_completed").increment(1);
            tracing::info!(%prediction_id, %output_url, "upscale prediction succeeded");
            Ok(Json(UpscaleResponse {
                success: true,
                prediction_id,
                output_url,
            }))
        }
        Err(err) => {
            metrics::counter!("upscale_predictions_failed").increment(1);
            Err(err.into())
        }
    }
}

/// GET /api/v1/predictions/{id} — raw status passthrough.
///
/// Lets a frontend poll on its own schedule instead of holding the upscale
/// request open.
pub async fn get_prediction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Prediction>> {
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest("no prediction id provided".to_string()));
    }

    let prediction = state.replicate.get_prediction(&id).await?;
    Ok(Json(prediction))
}
