use super::{AudioSegment, SynthesisClient, SynthesisOption, SynthesisType};
use crate::config::{ChunkingConfig, PiperConfig};
use crate::error::EngineError;
use crate::media;
use crate::{PcmBuf, Sample};
use async_trait::async_trait;
use piper_rs::synth::PiperSpeechSynthesizer;
use std::path::Path;
use tracing::debug;

/// Local neural engine. The voice model is loaded fresh for every call:
/// the synthesizer is single-use and voices stay swappable on disk.
pub struct PiperTtsClient {
    config: PiperConfig,
    chunking: ChunkingConfig,
}

impl PiperTtsClient {
    pub fn create(
        config: &PiperConfig,
        chunking: ChunkingConfig,
    ) -> Result<Box<dyn SynthesisClient>, EngineError> {
        Ok(Box::new(Self {
            config: config.clone(),
            chunking,
        }))
    }

    fn resolve_voice(&self, option: &SynthesisOption) -> Result<String, EngineError> {
        let key = option
            .voice
            .as_deref()
            .unwrap_or(&self.config.default_voice);
        match self.config.voices.get(key) {
            Some(path) => Ok(path.clone()),
            None => {
                let mut available: Vec<&str> =
                    self.config.voices.keys().map(|k| k.as_str()).collect();
                available.sort();
                Err(EngineError::InvalidArgument(format!(
                    "Invalid piper voice '{}'. Available voices: {}",
                    key,
                    available.join(", ")
                )))
            }
        }
    }

    fn read_sample_rate(config_path: &Path) -> Result<u32, EngineError> {
        let text = std::fs::read_to_string(config_path).map_err(|e| {
            EngineError::EngineUnavailable(format!(
                "failed to read voice config {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let json: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            EngineError::EngineUnavailable(format!(
                "voice config {} is not valid JSON: {}",
                config_path.display(),
                e
            ))
        })?;
        json.get("audio")
            .and_then(|a| a.get("sample_rate"))
            .and_then(|sr| sr.as_u64())
            .map(|sr| sr as u32)
            .ok_or_else(|| {
                EngineError::EngineUnavailable(format!(
                    "missing audio.sample_rate in {}",
                    config_path.display()
                ))
            })
    }
}

fn f32_to_sample(value: f32) -> Sample {
    (value.clamp(-1.0, 1.0) * 32767.0) as Sample
}

#[async_trait]
impl SynthesisClient for PiperTtsClient {
    fn provider(&self) -> SynthesisType {
        SynthesisType::Piper
    }

    fn chunk_policy(&self) -> Option<ChunkingConfig> {
        Some(self.chunking)
    }

    async fn synthesize(
        &self,
        text: &str,
        option: &SynthesisOption,
    ) -> Result<AudioSegment, EngineError> {
        let config_path = self.resolve_voice(option)?;
        let config_path = Path::new(&config_path);
        if !config_path.exists() {
            return Err(EngineError::EngineUnavailable(format!(
                "model file not found for piper voice: {}",
                config_path.display()
            )));
        }
        let sample_rate = Self::read_sample_rate(config_path)?;

        let model = piper_rs::from_config_path(config_path).map_err(|e| {
            EngineError::EngineUnavailable(format!(
                "failed to load piper voice {}: {}",
                config_path.display(),
                e
            ))
        })?;
        if let Some(speaker_id) = option.speaker_id {
            model.set_speaker(speaker_id);
        }
        let synth = PiperSpeechSynthesizer::new(model)
            .map_err(|e| EngineError::UpstreamFailure(format!("piper synthesizer: {}", e)))?;

        let stream = synth
            .synthesize_parallel(text.to_string(), None)
            .map_err(|e| EngineError::UpstreamFailure(format!("piper synthesis: {}", e)))?;
        let mut samples: PcmBuf = Vec::new();
        for part in stream {
            let part = part
                .map_err(|e| EngineError::UpstreamFailure(format!("piper synthesis: {}", e)))?;
            samples.extend(part.into_vec().into_iter().map(f32_to_sample));
        }

        let silence_secs = option.sentence_silence.unwrap_or(0.0);
        if silence_secs > 0.0 {
            samples.extend(media::silence(silence_secs, sample_rate));
        }
        debug!(
            "piper: synthesized {} samples at {} Hz",
            samples.len(),
            sample_rate
        );
        Ok(AudioSegment {
            samples,
            sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkingConfig;

    #[tokio::test]
    async fn test_unknown_voice_rejected() {
        let client = PiperTtsClient::create(&PiperConfig::default(), ChunkingConfig::default())
            .unwrap();
        let option = SynthesisOption {
            voice: Some("fr_fr".to_string()),
            ..Default::default()
        };
        let err = client.synthesize("Bonjour.", &option).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_missing_model_file_is_unavailable() {
        let client = PiperTtsClient::create(&PiperConfig::default(), ChunkingConfig::default())
            .unwrap();
        // Default voice table points at files that do not exist here.
        let err = client
            .synthesize("Hello.", &SynthesisOption::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EngineUnavailable(_)));
    }

    #[test]
    fn test_sample_conversion_clamps() {
        assert_eq!(f32_to_sample(0.0), 0);
        assert_eq!(f32_to_sample(1.0), 32767);
        assert_eq!(f32_to_sample(2.0), 32767);
        assert_eq!(f32_to_sample(-2.0), -32767);
    }
}
