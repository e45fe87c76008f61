use reqwest::Client;
use serde::Serialize;

use crate::models::prediction::Prediction;

const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";

/// Client for the Replicate predictions API.
///
/// Submitting creates an asynchronous prediction; the caller then drives it to
/// a terminal state with [`crate::services::poller::poll_prediction`].
pub struct ReplicateClient {
    http: Client,
    api_token: String,
    base_url: String,
    upscale_version: String,
}

#[derive(Serialize)]
struct PredictionRequest<'a> {
    version: &'a str,
    input: UpscaleInput<'a>,
}

#[derive(Serialize)]
struct UpscaleInput<'a> {
    image: &'a str,
    scale: u32,
    face_enhance: bool,
}

impl ReplicateClient {
    pub fn new(api_token: String, upscale_version: String) -> Self {
        Self {
            http: Client::new(),
            api_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            upscale_version,
        }
    }

    /// Override the API base URL, e.g. to point tests at a local stub server.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Submit an upscale prediction for a base64 data-URL image.
    ///
    /// Returns the initial descriptor; the prediction is almost always still
    /// `starting` at this point.
    pub async fn submit_upscale(
        &self,
        image_data_url: &str,
        scale: u32,
    ) -> Result<Prediction, ReplicateError> {
        let body = PredictionRequest {
            version: &self.upscale_version,
            input: UpscaleInput {
                image: image_data_url,
                scale,
                face_enhance: false,
            },
        };

        let response = self
            .http
            .post(format!("{}/predictions", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Fetch the current descriptor for a prediction by id.
    pub async fn get_prediction(&self, id: &str) -> Result<Prediction, ReplicateError> {
        let response = self
            .http
            .get(format!("{}/predictions/{}", self.base_url, id))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Treat non-2xx as a transport-level failure, keeping the remote error
    /// body for diagnostics. A 2xx body that fails to parse is also transport.
    async fn decode(response: reqwest::Response) -> Result<Prediction, ReplicateError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ReplicateError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<Prediction>().await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReplicateError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Replicate API returned {status}: {message}")]
    Api { status: u16, message: String },
}
