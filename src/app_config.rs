use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::default::Default;
use std::path::Path;
use url::Url;

use crate::providers::elevenlabs::is_valid_output_format;
use crate::voices::{VoiceCatalog, VoiceRegistry};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Character name to voice id mapping used when assembling scenes
    #[serde(default = "default_character_voices")]
    pub voices: BTreeMap<String, String>,

    /// Speech synthesis settings
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Screenplay drafting settings
    #[serde(default)]
    pub screenwriter: ScreenwriterConfig,

    /// Scene image generation settings
    #[serde(default)]
    pub image: ImageConfig,

    /// HTTP API settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech synthesis provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    // @field: API key sent as the xi-api-key header
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_speech_endpoint")]
    pub endpoint: String,

    // @field: Voice model identifier
    #[serde(default = "default_speech_model")]
    pub model_id: String,

    // @field: Voice stability (0.0 to 1.0)
    #[serde(default = "default_stability")]
    pub stability: f32,

    // @field: Voice similarity boost (0.0 to 1.0)
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,

    // @field: Provider output format; clips at other rates are resampled
    #[serde(default = "default_output_format")]
    pub output_format: String,

    // @field: Timeout seconds per synthesis call
    #[serde(default = "default_speech_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Synthesis calls allowed in flight while assembling
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_speech_endpoint(),
            model_id: default_speech_model(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            output_format: default_output_format(),
            timeout_secs: default_speech_timeout_secs(),
            concurrent_requests: default_concurrent_requests(),
        }
    }
}

/// Language model configuration for drafting screenplays
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScreenwriterConfig {
    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL (OpenAI-compatible)
    #[serde(default = "default_screenwriter_endpoint")]
    pub endpoint: String,

    /// Model name (e.g., "gpt-4o")
    #[serde(default = "default_screenwriter_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_screenwriter_timeout_secs")]
    pub timeout_secs: u64,

    /// System prompt guiding the screenplay format
    #[serde(default = "default_screenwriter_prompt")]
    pub system_prompt: String,
}

impl Default for ScreenwriterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_screenwriter_endpoint(),
            model: default_screenwriter_model(),
            timeout_secs: default_screenwriter_timeout_secs(),
            system_prompt: default_screenwriter_prompt(),
        }
    }
}

/// Image generation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageConfig {
    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL
    #[serde(default = "default_image_endpoint")]
    pub endpoint: String,

    /// Image width in pixels
    #[serde(default = "default_image_width")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_image_height")]
    pub height: u32,

    /// Request timeout in seconds
    #[serde(default = "default_image_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_image_endpoint(),
            width: default_image_width(),
            height: default_image_height(),
            timeout_secs: default_image_timeout_secs(),
        }
    }
}

/// HTTP API configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_server_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Named voices offered by the API
    #[serde(default = "default_catalog_voices")]
    pub voices: BTreeMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            voices: default_catalog_voices(),
        }
    }
}

/// Which external service a command needs credentials for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Speech,
    Screenwriter,
    Image,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_character_voices() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("RILEY".to_string(), "21m00Tcm4TlvDq8ikWAM".to_string()),
        ("JAMIE".to_string(), "29vD33N1CtxCmqQRPOHJ".to_string()),
    ])
}

fn default_catalog_voices() -> BTreeMap<String, String> {
    [
        ("rachel", "21m00Tcm4TlvDq8ikWAM"),
        ("domi", "AZnzlk1XvdvUeBnXmlld"),
        ("bella", "EXAVITQu4vr4xnSDxMaL"),
        ("antoni", "ErXwobaYiN1P8YkM0tQj"),
        ("thomas", "GBv7mTt0atIp3Br8iCZE"),
        ("josh", "TxGEqnHWrfWFTfGW9XjX"),
        ("arnold", "VR6AewLTigWG4xSOukaG"),
        ("adam", "pNInz6obpgDQGcFmaJgB"),
        ("sam", "yoZ06aMxZJJ28mfd3POQ"),
        ("default", "21m00Tcm4TlvDq8ikWAM"),
    ]
    .into_iter()
    .map(|(name, id)| (name.to_string(), id.to_string()))
    .collect()
}

fn default_speech_endpoint() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_speech_model() -> String {
    "eleven_monolingual_v1".to_string()
}

fn default_stability() -> f32 {
    0.5
}

fn default_similarity_boost() -> f32 {
    0.75
}

fn default_output_format() -> String {
    "mp3_44100_128".to_string()
}

fn default_speech_timeout_secs() -> u64 {
    30
}

fn default_concurrent_requests() -> usize {
    1
}

fn default_screenwriter_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_screenwriter_model() -> String {
    "gpt-4o".to_string()
}

fn default_screenwriter_timeout_secs() -> u64 {
    120
}

fn default_screenwriter_prompt() -> String {
    "You are a professional screenwriter. Write a very short, single-scene script. Mark each speaking character in bold like **NAME**, put stage directions in parentheses or *italics*, and put every spoken line in double quotes.".to_string()
}

fn default_image_endpoint() -> String {
    "https://api.stability.ai".to_string()
}

fn default_image_width() -> u32 {
    768
}

fn default_image_height() -> u32 {
    512
}

fn default_image_timeout_secs() -> u64 {
    60
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    5000
}

impl Config {
    /// Load configuration from a JSON file, writing a default one if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }

    /// Fill empty API keys and the server port from the environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut String, name: &str| {
            if slot.is_empty() {
                if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                    *slot = value;
                }
            }
        };
        fill(&mut self.speech.api_key, "ELEVENLABS_API_KEY");
        fill(&mut self.screenwriter.api_key, "OPENAI_API_KEY");
        fill(&mut self.image.api_key, "STABILITY_AI_API_KEY");

        if let Some(port) = lookup("PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        for (name, endpoint) in [
            ("speech", &self.speech.endpoint),
            ("screenwriter", &self.screenwriter.endpoint),
            ("image", &self.image.endpoint),
        ] {
            Url::parse(endpoint)
                .map_err(|e| anyhow!("Invalid {} endpoint '{}': {}", name, endpoint, e))?;
        }

        if !(0.0..=1.0).contains(&self.speech.stability) {
            return Err(anyhow!("Speech stability must be between 0.0 and 1.0, got {}", self.speech.stability));
        }
        if !(0.0..=1.0).contains(&self.speech.similarity_boost) {
            return Err(anyhow!("Speech similarity boost must be between 0.0 and 1.0, got {}", self.speech.similarity_boost));
        }
        if self.speech.concurrent_requests == 0 {
            return Err(anyhow!("Speech concurrent_requests must be at least 1"));
        }
        if self.speech.timeout_secs == 0 {
            return Err(anyhow!("Speech timeout_secs must be at least 1"));
        }
        if !is_valid_output_format(&self.speech.output_format) {
            return Err(anyhow!(
                "Speech output_format '{}' must only contain lowercase letters, digits and '_'",
                self.speech.output_format
            ));
        }

        Ok(())
    }

    /// Check that the API key for a service is present
    pub fn require_api_key(&self, service: Service) -> Result<()> {
        let (key, label, variable) = match service {
            Service::Speech => (&self.speech.api_key, "speech", "ELEVENLABS_API_KEY"),
            Service::Screenwriter => (&self.screenwriter.api_key, "screenwriter", "OPENAI_API_KEY"),
            Service::Image => (&self.image.api_key, "image", "STABILITY_AI_API_KEY"),
        };
        if key.is_empty() {
            return Err(anyhow!(
                "API key is required for the {} provider (set it in the config or via {})",
                label, variable
            ));
        }
        Ok(())
    }

    /// Build the character voice registry
    pub fn voice_registry(&self) -> VoiceRegistry {
        VoiceRegistry::new(self.voices.clone())
    }

    /// Build the named voice catalog served by the API
    pub fn voice_catalog(&self) -> VoiceCatalog {
        VoiceCatalog::new(self.server.voices.clone())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            voices: default_character_voices(),
            speech: SpeechConfig::default(),
            screenwriter: ScreenwriterConfig::default(),
            image: ImageConfig::default(),
            server: ServerConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
