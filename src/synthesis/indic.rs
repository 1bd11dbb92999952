use super::{AudioSegment, SynthesisClient, SynthesisOption, SynthesisType};
use crate::config::InferenceConfig;
use crate::error::EngineError;
use crate::media;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use tracing::debug;

/// Indic-language model served by a local inference endpoint. The endpoint
/// answers a synthesis request with raw s16le PCM at the agreed rate.
pub struct IndicTtsClient {
    http_client: HttpClient,
    endpoint: String,
    sample_rate: u32,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    text: &'a str,
    sid: i64,
    samplerate: u32,
    speed: f32,
}

impl IndicTtsClient {
    pub fn create(config: &InferenceConfig) -> Result<Box<dyn SynthesisClient>, EngineError> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            EngineError::EngineUnavailable(
                "indic inference endpoint is not configured".to_string(),
            )
        })?;
        Ok(Box::new(Self {
            http_client: HttpClient::new(),
            endpoint,
            sample_rate: config.sample_rate,
        }))
    }
}

#[async_trait]
impl SynthesisClient for IndicTtsClient {
    fn provider(&self) -> SynthesisType {
        SynthesisType::Indic
    }

    async fn synthesize(
        &self,
        text: &str,
        option: &SynthesisOption,
    ) -> Result<AudioSegment, EngineError> {
        let body = InferenceRequest {
            text,
            sid: option.speaker_id.unwrap_or(0),
            samplerate: self.sample_rate,
            speed: option.speaking_rate.unwrap_or(1.0),
        };
        let url = format!("{}/tts", self.endpoint.trim_end_matches('/'));
        debug!("indic: posting {} chars to {}", text.len(), url);

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::UpstreamFailure(format!("indic inference request: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EngineError::UpstreamFailure(format!(
                "indic inference error {}: {}",
                status, detail
            )));
        }
        let payload = response
            .bytes()
            .await
            .map_err(|e| EngineError::UpstreamFailure(format!("indic inference body: {}", e)))?;
        let mut samples = media::bytes_to_samples(&payload);

        let silence_secs = option.sentence_silence.unwrap_or(0.0);
        if silence_secs > 0.0 {
            samples.extend(media::silence(silence_secs, self.sample_rate));
        }
        Ok(AudioSegment {
            samples,
            sample_rate: self.sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_endpoint() {
        let err = IndicTtsClient::create(&InferenceConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::EngineUnavailable(_)));
    }

    #[test]
    fn test_create_with_endpoint() {
        let config = InferenceConfig {
            endpoint: Some("http://localhost:9000".to_string()),
            sample_rate: 24000,
        };
        let client = IndicTtsClient::create(&config).unwrap();
        assert_eq!(client.provider(), SynthesisType::Indic);
        assert!(client.chunk_policy().is_none());
    }
}
