use super::{TranscriptionClient, TranscriptionOption};
use crate::config::GoogleConfig;
use crate::error::EngineError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

const ENDPOINT: &str = "https://speech.googleapis.com/v1/speech:recognize";

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<SpeechRecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct SpeechRecognitionResult {
    #[serde(default)]
    alternatives: Vec<SpeechRecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct SpeechRecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

/// Google Cloud Speech over REST.
pub struct GoogleSttClient {
    http_client: HttpClient,
    api_key: String,
}

impl GoogleSttClient {
    pub fn create(config: &GoogleConfig) -> Result<Box<dyn TranscriptionClient>, EngineError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                EngineError::EngineUnavailable(
                    "Google STT is not configured: set google.api_key or GOOGLE_API_KEY"
                        .to_string(),
                )
            })?;
        Ok(Box::new(Self {
            http_client: HttpClient::new(),
            api_key,
        }))
    }
}

#[async_trait]
impl TranscriptionClient for GoogleSttClient {
    async fn transcribe(
        &self,
        audio: &[u8],
        option: &TranscriptionOption,
    ) -> Result<String, EngineError> {
        let language = option.language.as_deref().unwrap_or("en-US");
        let sample_rate = option.sample_rate.unwrap_or(16000);
        info!(
            "transcribing {} bytes with Google STT ({}, {} Hz)",
            audio.len(),
            language,
            sample_rate
        );

        let body = json!({
            "config": {
                "encoding": "LINEAR16",
                "sampleRateHertz": sample_rate,
                "languageCode": language,
            },
            "audio": {
                "content": BASE64_STANDARD.encode(audio),
            },
        });

        let response = self
            .http_client
            .post(ENDPOINT)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::UpstreamFailure(format!("Google STT request: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EngineError::UpstreamFailure(format!(
                "Google STT API error {}: {}",
                status, detail
            )));
        }
        let response: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| EngineError::UpstreamFailure(format!("Google STT response: {}", e)))?;

        let transcription = response
            .results
            .iter()
            .filter_map(|result| result.alternatives.first())
            .map(|alternative| alternative.transcript.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(transcription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_without_credentials() {
        std::env::remove_var("GOOGLE_API_KEY");
        let err = GoogleSttClient::create(&GoogleConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::EngineUnavailable(_)));
    }

    #[test]
    fn test_response_parsing_joins_transcripts() {
        let raw = r#"{
            "results": [
                {"alternatives": [{"transcript": "hello there", "confidence": 0.92}]},
                {"alternatives": [{"transcript": "general kenobi"}]}
            ]
        }"#;
        let response: RecognizeResponse = serde_json::from_str(raw).unwrap();
        let text = response
            .results
            .iter()
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(text, "hello there general kenobi");
    }

    #[test]
    fn test_empty_response_parses() {
        let response: RecognizeResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
    }
}
