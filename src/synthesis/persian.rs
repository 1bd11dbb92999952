use super::{AudioSegment, SynthesisClient, SynthesisOption, SynthesisType};
use crate::config::InferenceConfig;
use crate::error::EngineError;
use crate::media;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::json;
use tracing::debug;

/// Persian VITS model served by a local inference endpoint. The endpoint
/// answers with a complete WAV body, which carries its own sample rate.
pub struct PersianTtsClient {
    http_client: HttpClient,
    endpoint: String,
}

impl PersianTtsClient {
    pub fn create(config: &InferenceConfig) -> Result<Box<dyn SynthesisClient>, EngineError> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            EngineError::EngineUnavailable(
                "persian inference endpoint is not configured".to_string(),
            )
        })?;
        Ok(Box::new(Self {
            http_client: HttpClient::new(),
            endpoint,
        }))
    }
}

#[async_trait]
impl SynthesisClient for PersianTtsClient {
    fn provider(&self) -> SynthesisType {
        SynthesisType::Persian
    }

    async fn synthesize(
        &self,
        text: &str,
        option: &SynthesisOption,
    ) -> Result<AudioSegment, EngineError> {
        let url = format!("{}/tts", self.endpoint.trim_end_matches('/'));
        debug!("persian: posting {} chars to {}", text.len(), url);

        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| {
                EngineError::UpstreamFailure(format!("persian inference request: {}", e))
            })?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EngineError::UpstreamFailure(format!(
                "persian inference error {}: {}",
                status, detail
            )));
        }
        let payload = response
            .bytes()
            .await
            .map_err(|e| EngineError::UpstreamFailure(format!("persian inference body: {}", e)))?;
        let (mut samples, sample_rate) = media::decode_wav(&payload)?;

        let silence_secs = option.sentence_silence.unwrap_or(0.0);
        if silence_secs > 0.0 {
            samples.extend(media::silence(silence_secs, sample_rate));
        }
        Ok(AudioSegment {
            samples,
            sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_endpoint() {
        let err = PersianTtsClient::create(&InferenceConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::EngineUnavailable(_)));
    }
}
