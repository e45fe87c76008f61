//! Unified error-to-response mapping for the API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::services::enhancer::EnhanceError;
use crate::services::poller::PollError;
use crate::services::replicate::ReplicateError;
use crate::services::vision::VisionError;

/// API error type returned by route handlers.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    UnsupportedImage(String),
    Vision(VisionError),
    Enhance(EnhanceError),
    Replicate(ReplicateError),
    Poll(PollError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::UnsupportedImage(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            ApiError::Vision(err) => {
                tracing::error!(error = %err, "vision analysis failed");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            ApiError::Enhance(err) => match err {
                EnhanceError::Decode(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                EnhanceError::Image(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            },
            ApiError::Replicate(err) => {
                tracing::error!(error = %err, "prediction submission failed");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            ApiError::Poll(err) => {
                let status = match &err {
                    // Retryable by the end user: the remote never answered in time.
                    PollError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                    PollError::Transport(_) | PollError::EmptyOutput | PollError::MissingId => {
                        StatusCode::BAD_GATEWAY
                    }
                    // Not retryable without changing input.
                    PollError::RemoteFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    PollError::Canceled => StatusCode::CONFLICT,
                    PollError::Interrupted => StatusCode::REQUEST_TIMEOUT,
                };
                tracing::warn!(error = %err, "upscale polling ended without output");
                (status, err.to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<VisionError> for ApiError {
    fn from(err: VisionError) -> Self {
        ApiError::Vision(err)
    }
}

impl From<EnhanceError> for ApiError {
    fn from(err: EnhanceError) -> Self {
        ApiError::Enhance(err)
    }
}

impl From<ReplicateError> for ApiError {
    fn from(err: ReplicateError) -> Self {
        ApiError::Replicate(err)
    }
}

impl From<PollError> for ApiError {
    fn from(err: PollError) -> Self {
        ApiError::Poll(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
