use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// OpenAI API key for the vision analysis model
    pub openai_api_key: String,

    /// Optional OpenAI organization id
    #[serde(default)]
    pub openai_org_id: Option<String>,

    /// Vision model used for photo analysis
    #[serde(default = "default_vision_model")]
    pub openai_vision_model: String,

    /// Replicate API token for upscale predictions
    pub replicate_api_token: String,

    /// Replicate model version hash for the upscaler (Real-ESRGAN)
    #[serde(default = "default_upscale_version")]
    pub replicate_upscale_version: String,

    /// Maximum status queries per upscale prediction
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,

    /// Fixed delay between status queries, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_vision_model() -> String {
    "gpt-4o".to_string()
}

fn default_upscale_version() -> String {
    // nightmareai/real-esrgan
    "f121d640bd286e1fdc67f9799164c1d5be36ff74576ee11c803ae5b665dd46aa".to_string()
}

fn default_poll_max_attempts() -> u32 {
    60
}

fn default_poll_interval_ms() -> u64 {
    2000
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
