use reqwest::Client;
use serde::Deserialize;

use crate::models::analysis::ImageAnalysis;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Client for an OpenAI-compatible vision model used to analyze listing photos.
pub struct VisionClient {
    http: Client,
    api_url: String,
    api_key: String,
    organization: Option<String>,
    model: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

const ANALYSIS_PROMPT: &str = concat!(
    "Analyze this real estate photo and reply with ONLY a JSON object ",
    "(no markdown, no backticks) with this exact structure:\n",
    "{\n",
    "  \"lighting\": \"dark\" or \"normal\" or \"bright\",\n",
    "  \"room_type\": \"bedroom\" or \"living\" or \"kitchen\" or \"bathroom\" or \"exterior\",\n",
    "  \"main_issues\": [\"issue1\", \"issue2\"],\n",
    "  \"needs_brightness_boost\": true or false,\n",
    "  \"needs_contrast_boost\": true or false,\n",
    "  \"needs_saturation_boost\": true or false,\n",
    "  \"needs_sharpness\": true or false,\n",
    "  \"brightness_adjustment\": number between -50 and 50,\n",
    "  \"contrast_adjustment\": number between 0.5 and 2.0,\n",
    "  \"saturation_adjustment\": number between 0.5 and 2.0\n",
    "}"
);

impl VisionClient {
    pub fn new(api_key: String, organization: Option<String>, model: String) -> Self {
        Self {
            http: Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            api_key,
            organization,
            model,
        }
    }

    /// Analyze a photo (base64 data URL) and return adjustment hints.
    ///
    /// An unparseable model reply degrades to [`ImageAnalysis::fallback`]
    /// instead of failing the request; only transport/API errors propagate.
    pub async fn analyze_photo(&self, image_data_url: &str) -> Result<ImageAnalysis, VisionError> {
        let request_body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": ANALYSIS_PROMPT },
                    { "type": "image_url", "image_url": { "url": image_data_url } }
                ]
            }],
            "max_tokens": 500
        });

        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&request_body);
        if let Some(org) = &self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VisionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        Ok(Self::parse_analysis(content))
    }

    /// Parse the model's reply, tolerating markdown code fences around the
    /// JSON. Falls back to a conservative default when the reply is garbage.
    fn parse_analysis(content: &str) -> ImageAnalysis {
        let cleaned = content
            .replace("```json", "")
            .replace("```", "")
            .trim()
            .to_string();

        match serde_json::from_str(&cleaned) {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!(error = %e, reply = %cleaned, "unparseable vision analysis, using fallback");
                ImageAnalysis::fallback()
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vision API returned {status}: {message}")]
    Api { status: u16, message: String },
}
