use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::services::poller::PollSettings;
use crate::services::replicate::ReplicateClient;
use crate::services::vision::VisionClient;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub vision: Arc<VisionClient>,
    pub replicate: Arc<ReplicateClient>,
    pub poll_settings: PollSettings,
}

impl AppState {
    pub fn new(vision: VisionClient, replicate: ReplicateClient, poll_settings: PollSettings) -> Self {
        Self {
            vision: Arc::new(vision),
            replicate: Arc::new(replicate),
            poll_settings,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let vision = VisionClient::new(
            config.openai_api_key.clone(),
            config.openai_org_id.clone(),
            config.openai_vision_model.clone(),
        );
        let replicate = ReplicateClient::new(
            config.replicate_api_token.clone(),
            config.replicate_upscale_version.clone(),
        );
        let poll_settings = PollSettings {
            max_attempts: config.poll_max_attempts,
            interval: Duration::from_millis(config.poll_interval_ms),
        };
        Self::new(vision, replicate, poll_settings)
    }
}
