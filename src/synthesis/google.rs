use super::{AudioSegment, SynthesisClient, SynthesisOption, SynthesisType};
use crate::config::GoogleConfig;
use crate::error::EngineError;
use crate::media;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const ENDPOINT: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Text beyond this length is passed through unsplit; the remote API owns
/// truncation and failure from there on.
const TEXT_WARN_CHARS: usize = 5000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelectionParams,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelectionParams {
    language_code: String,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
    pitch: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// Google Cloud TTS over REST. The adapter always requests LINEAR16 and
/// hands decoded samples to the pipeline, which owns container encoding.
pub struct GoogleTtsClient {
    http_client: HttpClient,
    api_key: String,
    default_voice: String,
}

impl GoogleTtsClient {
    pub fn create(config: &GoogleConfig) -> Result<Box<dyn SynthesisClient>, EngineError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                EngineError::EngineUnavailable(
                    "Google TTS is not configured: set google.api_key or GOOGLE_API_KEY"
                        .to_string(),
                )
            })?;
        Ok(Box::new(Self {
            http_client: HttpClient::new(),
            api_key,
            default_voice: config.default_voice.clone(),
        }))
    }

    /// "en-US-Standard-A" carries its language code in the first two parts.
    fn deduce_language_code(voice_name: &str) -> String {
        let parts: Vec<&str> = voice_name.split('-').collect();
        if parts.len() >= 2 {
            format!("{}-{}", parts[0], parts[1])
        } else {
            "en-US".to_string()
        }
    }
}

#[async_trait]
impl SynthesisClient for GoogleTtsClient {
    fn provider(&self) -> SynthesisType {
        SynthesisType::Google
    }

    async fn synthesize(
        &self,
        text: &str,
        option: &SynthesisOption,
    ) -> Result<AudioSegment, EngineError> {
        if text.len() > TEXT_WARN_CHARS {
            warn!(
                "text exceeds {} characters ({}) for Google TTS; this may fail or incur higher costs",
                TEXT_WARN_CHARS,
                text.len()
            );
        }
        let voice_name = option
            .voice
            .clone()
            .unwrap_or_else(|| self.default_voice.clone());
        let language_code = Self::deduce_language_code(&voice_name);
        info!(
            "synthesizing with Google TTS, voice {} ({})",
            voice_name, language_code
        );

        let body = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelectionParams {
                language_code,
                name: voice_name,
            },
            audio_config: AudioConfig {
                audio_encoding: "LINEAR16",
                speaking_rate: option.speaking_rate.unwrap_or(1.0),
                pitch: option.pitch.unwrap_or(0.0),
            },
        };

        let response = self
            .http_client
            .post(ENDPOINT)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::UpstreamFailure(format!("Google TTS request: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EngineError::UpstreamFailure(format!(
                "Google TTS API error {}: {}",
                status, detail
            )));
        }
        let response: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| EngineError::UpstreamFailure(format!("Google TTS response: {}", e)))?;
        let wav = BASE64_STANDARD
            .decode(response.audio_content)
            .map_err(|e| EngineError::UpstreamFailure(format!("Google TTS audio payload: {}", e)))?;
        let (samples, sample_rate) = media::decode_wav(&wav)?;
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
    fn test_language_code_deduction() {
        assert_eq!(
            GoogleTtsClient::deduce_language_code("en-US-Standard-A"),
            "en-US"
        );
        assert_eq!(
            GoogleTtsClient::deduce_language_code("de-DE-Wavenet-B"),
            "de-DE"
        );
        assert_eq!(GoogleTtsClient::deduce_language_code("invalid"), "en-US");
    }

    #[test]
    fn test_create_without_credentials() {
        std::env::remove_var("GOOGLE_API_KEY");
        let err = GoogleTtsClient::create(&GoogleConfig::default()).err().unwrap();
        assert!(matches!(err, EngineError::EngineUnavailable(_)));
    }

    #[test]
    fn test_create_with_configured_key() {
        let config = GoogleConfig {
            api_key: Some("test-key".to_string()),
            ..GoogleConfig::default()
        };
        let client = GoogleTtsClient::create(&config).unwrap();
        assert_eq!(client.provider(), SynthesisType::Google);
        // Cloud engine delegates length handling upstream.
        assert!(client.chunk_policy().is_none());
    }
}
