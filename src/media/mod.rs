use crate::error::EngineError;
use crate::{PcmBuf, Sample};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::str::FromStr;

/// Output container formats the gateway can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn extension(&self) -> &str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
        }
    }
}

impl FromStr for AudioFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wav" => Ok(AudioFormat::Wav),
            "mp3" => Ok(AudioFormat::Mp3),
            other => Err(EngineError::InvalidArgument(format!(
                "Invalid format '{}'. Use 'wav' or 'mp3'.",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encode mono PCM samples into the requested container.
pub fn encode(samples: &[Sample], sample_rate: u32, format: AudioFormat) -> Result<Vec<u8>, EngineError> {
    match format {
        AudioFormat::Wav => encode_wav(samples, sample_rate),
        AudioFormat::Mp3 => encode_mp3(samples, sample_rate),
    }
}

pub fn encode_wav(samples: &[Sample], sample_rate: u32) -> Result<Vec<u8>, EngineError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer =
        WavWriter::new(&mut cursor, spec).map_err(|e| EngineError::Internal(e.to_string()))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| EngineError::Internal(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| EngineError::Internal(e.to_string()))?;
    Ok(cursor.into_inner())
}

pub fn encode_mp3(samples: &[Sample], sample_rate: u32) -> Result<Vec<u8>, EngineError> {
    let mut builder = mp3lame_encoder::Builder::new()
        .ok_or_else(|| EngineError::Internal("failed to initialize LAME encoder".to_string()))?;
    builder
        .set_num_channels(1)
        .map_err(|e| EngineError::Internal(format!("mp3 encoder channels: {:?}", e)))?;
    builder
        .set_sample_rate(sample_rate)
        .map_err(|e| EngineError::Internal(format!("mp3 encoder sample rate: {:?}", e)))?;
    builder
        .set_brate(mp3lame_encoder::Birtate::Kbps128)
        .map_err(|e| EngineError::Internal(format!("mp3 encoder bitrate: {:?}", e)))?;
    builder
        .set_quality(mp3lame_encoder::Quality::Best)
        .map_err(|e| EngineError::Internal(format!("mp3 encoder quality: {:?}", e)))?;
    let mut encoder = builder
        .build()
        .map_err(|e| EngineError::Internal(format!("mp3 encoder init: {:?}", e)))?;

    let mut output = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(samples.len()));
    let written = encoder
        .encode(mp3lame_encoder::MonoPcm(samples), output.spare_capacity_mut())
        .map_err(|e| EngineError::Internal(format!("mp3 encode: {:?}", e)))?;
    unsafe {
        output.set_len(output.len() + written);
    }
    let written = encoder
        .flush::<mp3lame_encoder::FlushNoGap>(output.spare_capacity_mut())
        .map_err(|e| EngineError::Internal(format!("mp3 flush: {:?}", e)))?;
    unsafe {
        output.set_len(output.len() + written);
    }
    Ok(output)
}

/// Decode a mono 16-bit WAV payload returned by an engine.
pub fn decode_wav(bytes: &[u8]) -> Result<(PcmBuf, u32), EngineError> {
    let mut reader = WavReader::new(Cursor::new(bytes))
        .map_err(|e| EngineError::UpstreamFailure(format!("invalid wav payload: {}", e)))?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(EngineError::UpstreamFailure(format!(
            "unsupported wav encoding: {:?} {} bit",
            spec.sample_format, spec.bits_per_sample
        )));
    }
    let samples = reader
        .samples::<Sample>()
        .collect::<Result<PcmBuf, _>>()
        .map_err(|e| EngineError::UpstreamFailure(format!("truncated wav payload: {}", e)))?;
    Ok((samples, spec.sample_rate))
}

/// Interpret a raw little-endian s16le body as PCM samples.
pub fn bytes_to_samples(bytes: &[u8]) -> PcmBuf {
    bytes
        .chunks_exact(2)
        .map(|pair| Sample::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Generate silence for a duration in seconds at the given rate.
pub fn silence(duration_secs: f32, sample_rate: u32) -> PcmBuf {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    vec![0; num_samples]
}
