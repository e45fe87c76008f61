use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Status of an asynchronous prediction on the Replicate API.
///
/// `Starting` and `Processing` are non-terminal; the remaining three are
/// terminal and absorbing: once reported, the prediction never changes again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// Output of a successful prediction.
///
/// The API returns either a single URL or an ordered list of URLs depending on
/// the model; both shapes are accepted and normalized to "first reference".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    One(String),
    Many(Vec<String>),
}

impl PredictionOutput {
    /// First output reference, if any non-empty one exists.
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::One(url) => Some(url.as_str()).filter(|u| !u.is_empty()),
            Self::Many(urls) => urls.iter().map(String::as_str).find(|u| !u.is_empty()),
        }
    }
}

/// A prediction descriptor as reported by the remote service.
///
/// Created once at submission, then only replaced wholesale by re-fetching;
/// nothing on our side ever mutates remote state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PredictionOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Prediction {
    /// First usable output reference, if the prediction has one.
    pub fn first_output(&self) -> Option<&str> {
        self.output.as_ref().and_then(PredictionOutput::first)
    }
}
