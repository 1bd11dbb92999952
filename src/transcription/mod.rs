use crate::config::Config;
use crate::error::EngineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod google;

pub use google::GoogleSttClient;

/// Parameters for one recognition request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionOption {
    pub language: Option<String>,
    pub sample_rate: Option<u32>,
}

impl Default for TranscriptionOption {
    fn default() -> Self {
        Self {
            language: None,
            sample_rate: None,
        }
    }
}

#[async_trait]
pub trait TranscriptionClient: Send + Sync {
    async fn transcribe(
        &self,
        audio: &[u8],
        option: &TranscriptionOption,
    ) -> Result<String, EngineError>;
}

/// Construct the recognition adapter for one request.
pub fn create_transcription_client(
    config: &Config,
) -> Result<Box<dyn TranscriptionClient>, EngineError> {
    GoogleSttClient::create(&config.google)
}
