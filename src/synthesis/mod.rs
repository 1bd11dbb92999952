use crate::config::{ChunkingConfig, Config};
use crate::error::EngineError;
use crate::PcmBuf;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod chunk;
pub mod google;
pub mod indic;
pub mod persian;
#[cfg(feature = "piper")]
pub mod piper;
pub mod pipeline;


pub use chunk::{split_text, TextChunk};
pub use google::GoogleTtsClient;
pub use indic::IndicTtsClient;
pub use persian::PersianTtsClient;
pub use pipeline::SynthesisPipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisType {
    Piper,
    Google,
    Indic,
    Persian,
}

impl FromStr for SynthesisType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "piper" => Ok(SynthesisType::Piper),
            "google" => Ok(SynthesisType::Google),
            "indic" => Ok(SynthesisType::Indic),
            "persian" => Ok(SynthesisType::Persian),
            other => Err(EngineError::InvalidArgument(format!(
                "Invalid engine '{}'. Use 'piper', 'google', 'indic' or 'persian'.",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SynthesisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SynthesisType::Piper => "piper",
            SynthesisType::Google => "google",
            SynthesisType::Indic => "indic",
            SynthesisType::Persian => "persian",
        };
        f.write_str(name)
    }
}

/// Engine parameters carried by a request. Each engine consumes its own
/// subset; ranges are validated once before dispatch.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_w: Option<f32>,
    /// Seconds of silence inserted after a chunk; forced to zero on the
    /// final chunk of a request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence_silence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaking_rate: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
}

impl SynthesisOption {
    pub fn validate(&self) -> Result<(), EngineError> {
        if let Some(speaker_id) = self.speaker_id {
            if speaker_id < 0 {
                return Err(EngineError::InvalidArgument(
                    "speakerId must not be negative".to_string(),
                ));
            }
        }
        for (name, value) in [
            ("lengthScale", self.length_scale),
            ("noiseScale", self.noise_scale),
            ("noiseW", self.noise_w),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(EngineError::InvalidArgument(format!(
                        "{} must be a positive number",
                        name
                    )));
                }
            }
        }
        if let Some(silence) = self.sentence_silence {
            if !silence.is_finite() || !(0.0..=10.0).contains(&silence) {
                return Err(EngineError::InvalidArgument(
                    "sentenceSilence must be between 0 and 10 seconds".to_string(),
                ));
            }
        }
        if let Some(rate) = self.speaking_rate {
            if !rate.is_finite() || !(0.25..=4.0).contains(&rate) {
                return Err(EngineError::InvalidArgument(
                    "speakingRate must be between 0.25 and 4.0".to_string(),
                ));
            }
        }
        if let Some(pitch) = self.pitch {
            if !pitch.is_finite() || !(-20.0..=20.0).contains(&pitch) {
                return Err(EngineError::InvalidArgument(
                    "pitch must be between -20.0 and 20.0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// One synthesis request as received by the HTTP layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub text: String,
    /// Engine name; defaults to "piper".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Output format name; defaults to "wav".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(flatten)]
    pub option: SynthesisOption,
}

/// One engine call's worth of decoded mono PCM.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub samples: PcmBuf,
    pub sample_rate: u32,
}

#[async_trait]
pub trait SynthesisClient: Send + Sync {
    fn provider(&self) -> SynthesisType;

    /// Engines that enforce chunking locally report their split thresholds;
    /// `None` delegates length handling to the backend.
    fn chunk_policy(&self) -> Option<ChunkingConfig> {
        None
    }

    async fn synthesize(
        &self,
        text: &str,
        option: &SynthesisOption,
    ) -> Result<AudioSegment, EngineError>;
}

/// Construct the adapter for one request. Adapters are single-use and
/// loaded fresh per call; availability problems surface here as
/// `EngineUnavailable` before any synthesis starts.
pub fn create_synthesis_client(
    engine: SynthesisType,
    config: &Config,
) -> Result<Box<dyn SynthesisClient>, EngineError> {
    match engine {
        SynthesisType::Piper => {
            #[cfg(feature = "piper")]
            {
                piper::PiperTtsClient::create(&config.piper, config.chunking)
            }
            #[cfg(not(feature = "piper"))]
            {
                Err(EngineError::EngineUnavailable(
                    "piper engine is not compiled in; rebuild with the 'piper' feature"
                        .to_string(),
                ))
            }
        }
        SynthesisType::Google => GoogleTtsClient::create(&config.google),
        SynthesisType::Indic => IndicTtsClient::create(&config.indic),
        SynthesisType::Persian => PersianTtsClient::create(&config.persian),
    }
}
