use anyhow::Error;
use clap::Parser;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    #[clap(long, default_value = "voicegate.toml")]
    pub conf: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    #[serde(default = "default_cache_path")]
    pub cache_path: String,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub piper: PiperConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub indic: InferenceConfig,
    #[serde(default)]
    pub persian: InferenceConfig,
}

/// Thresholds for splitting long text before local synthesis.
///
/// A chunk closes at `soft_break_words` only on a sentence-terminal word;
/// `max_words` is the unconditional cutoff.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ChunkingConfig {
    pub max_words: usize,
    pub soft_break_words: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PiperConfig {
    /// Voice key -> piper model config path (the .onnx.json next to the model).
    pub voices: HashMap<String, String>,
    pub default_voice: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GoogleConfig {
    /// Falls back to the GOOGLE_API_KEY environment variable when unset.
    pub api_key: Option<String>,
    pub default_voice: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InferenceConfig {
    pub endpoint: Option<String>,
    pub sample_rate: u32,
}

fn default_http_addr() -> String {
    "0.0.0.0:17100".to_string()
}

#[cfg(target_os = "windows")]
fn default_cache_path() -> String {
    "./cache".to_string()
}

#[cfg(not(target_os = "windows"))]
fn default_cache_path() -> String {
    "/tmp/voicegate/cache".to_string()
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_words: 500,
            soft_break_words: 450,
        }
    }
}

impl Default for PiperConfig {
    fn default() -> Self {
        let mut voices = HashMap::new();
        voices.insert(
            "en_us".to_string(),
            "voices/en_US-ryan-high.onnx.json".to_string(),
        );
        voices.insert(
            "en_gb".to_string(),
            "voices/en_GB-cori-high.onnx.json".to_string(),
        );
        voices.insert(
            "en_us_female".to_string(),
            "voices/en_US-lessac-high.onnx.json".to_string(),
        );
        Self {
            voices,
            default_voice: "en_us".to_string(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_voice: "en-US-Standard-A".to_string(),
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            sample_rate: 22050,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            log_level: Some("info".to_string()),
            log_file: None,
            cache_path: default_cache_path(),
            chunking: ChunkingConfig::default(),
            piper: PiperConfig::default(),
            google: GoogleConfig::default(),
            indic: InferenceConfig::default(),
            persian: InferenceConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Error> {
        let config = toml::from_str(
            &std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("{}: {}", e, path))?,
        )?;
        Ok(config)
    }
}
