use super::{
    create_synthesis_client, split_text, SynthesisClient, SynthesisRequest, SynthesisType,
    TextChunk,
};
use crate::cache::{CacheStore, CachedArtifact};
use crate::config::Config;
use crate::error::EngineError;
use crate::media::{self, AudioFormat};
use crate::PcmBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates one request end to end: shared validation, engine dispatch,
/// chunked synthesis, sample concatenation, encoding and persistence.
pub struct SynthesisPipeline {
    config: Arc<Config>,
    store: Arc<CacheStore>,
}

impl SynthesisPipeline {
    pub fn new(config: Arc<Config>, store: Arc<CacheStore>) -> Self {
        Self { config, store }
    }

    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<CachedArtifact, EngineError> {
        let (engine, format) = validate_request(request)?;
        let client = create_synthesis_client(engine, &self.config)?;
        self.run(client.as_ref(), request, format).await
    }

    /// Chunk-and-recombine loop, separated from engine construction so tests
    /// can substitute a fake adapter.
    pub(crate) async fn run(
        &self,
        client: &dyn SynthesisClient,
        request: &SynthesisRequest,
        format: AudioFormat,
    ) -> Result<CachedArtifact, EngineError> {
        let text = request.text.trim();
        let chunks = match client.chunk_policy() {
            Some(policy) => split_text(text, policy.max_words, policy.soft_break_words),
            None => vec![TextChunk::whole(text)],
        };
        if chunks.is_empty() {
            return Err(EngineError::InvalidArgument("Text is required.".to_string()));
        }
        if chunks.len() > 1 {
            info!(
                "{}: text exceeds limit, split into {} chunks",
                client.provider(),
                chunks.len()
            );
        }

        // Chunks are synthesized strictly in order; the adapter is not
        // reentrant and concatenation must preserve the sequence.
        let mut combined: PcmBuf = Vec::new();
        let mut sample_rate = 0u32;
        let total = chunks.len();
        for (index, chunk) in chunks.iter().enumerate() {
            let mut option = request.option.clone();
            if chunk.is_last {
                // The final chunk carries no trailing silence, whatever the
                // request configured.
                option.sentence_silence = Some(0.0);
            }
            let segment = client.synthesize(&chunk.text, &option).await?;
            debug!(
                "chunk {}/{}: {} samples at {} Hz",
                index + 1,
                total,
                segment.samples.len(),
                segment.sample_rate
            );
            if sample_rate != 0 && segment.sample_rate != sample_rate {
                warn!(
                    "sample rate changed mid-request: {} -> {}",
                    sample_rate, segment.sample_rate
                );
            }
            sample_rate = segment.sample_rate;
            combined.extend_from_slice(&segment.samples);
        }

        let bytes = media::encode(&combined, sample_rate, format)?;
        let artifact = self.store.write(&bytes, format).await?;
        info!(
            "{}: generated artifact {} ({} samples, {})",
            client.provider(),
            artifact.id,
            combined.len(),
            format
        );
        Ok(artifact)
    }
}

/// Request-level validation shared across engines; runs before any engine
/// is constructed so a bad request never touches a backend.
pub(crate) fn validate_request(
    request: &SynthesisRequest,
) -> Result<(SynthesisType, AudioFormat), EngineError> {
    if request.text.trim().is_empty() {
        return Err(EngineError::InvalidArgument("Text is required.".to_string()));
    }
    let engine = match request.engine.as_deref() {
        Some(name) => SynthesisType::from_str(name)?,
        None => SynthesisType::Piper,
    };
    let format = match request.format.as_deref() {
        Some(name) => AudioFormat::from_str(name)?,
        None => AudioFormat::Wav,
    };
    request.option.validate()?;
    Ok((engine, format))
}
