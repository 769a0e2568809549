use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::app_config::SpeechConfig;
use crate::errors::ProviderError;
use crate::providers::SpeechSynthesizer;

/// ElevenLabs client for text-to-speech requests
pub struct ElevenLabs {
    /// HTTP client for API requests
    client: Client,
    /// API key sent in the xi-api-key header
    api_key: String,
    /// API base URL
    endpoint: String,
    /// Voice model identifier
    model_id: String,
    /// Fixed voice settings for every call
    voice_settings: VoiceSettings,
    /// Requested output format
    output_format: String,
}

/// Voice tuning parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    /// How stable the delivery is between generations
    pub stability: f32,
    /// How closely the output tracks the original voice
    pub similarity_boost: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

/// Text-to-speech request body
#[derive(Debug, Serialize)]
pub struct SpeechRequest<'a> {
    /// Text to speak
    pub text: &'a str,
    /// Voice model identifier
    pub model_id: &'a str,
    /// Voice tuning parameters
    pub voice_settings: VoiceSettings,
}

/// Whether an output format tag is safe to send and to echo into headers (`[a-z0-9_]+`)
pub fn is_valid_output_format(format: &str) -> bool {
    !format.is_empty()
        && format.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

impl ElevenLabs {
    /// Create a new ElevenLabs client with an explicit per-call timeout
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model_id: "eleven_monolingual_v1".to_string(),
            voice_settings: VoiceSettings::default(),
            output_format: "mp3_44100_128".to_string(),
        })
    }

    /// Create a client from the speech section of the configuration
    pub fn from_config(config: &SpeechConfig) -> Result<Self, ProviderError> {
        Ok(Self::new(&config.api_key, &config.endpoint, Duration::from_secs(config.timeout_secs))?
            .model(&config.model_id)
            .voice_settings(VoiceSettings {
                stability: config.stability,
                similarity_boost: config.similarity_boost,
            })
            .output_format(&config.output_format))
    }

    /// Set the voice model
    pub fn model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Set the voice settings
    pub fn voice_settings(mut self, voice_settings: VoiceSettings) -> Self {
        self.voice_settings = voice_settings;
        self
    }

    /// Set the requested output format
    pub fn output_format(mut self, output_format: impl Into<String>) -> Self {
        self.output_format = output_format.into();
        self
    }

    fn speech_url(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}", self.endpoint.trim_end_matches('/'), voice_id)
    }
}

impl fmt::Debug for ElevenLabs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevenLabs")
            .field("endpoint", &self.endpoint)
            .field("model_id", &self.model_id)
            .field("voice_settings", &self.voice_settings)
            .field("output_format", &self.output_format)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabs {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, ProviderError> {
        let request = SpeechRequest {
            text,
            model_id: &self.model_id,
            voice_settings: self.voice_settings,
        };

        debug!("Requesting speech for {} chars with voice {}", text.chars().count(), voice_id);

        let response = self.client.post(self.speech_url(voice_id))
            .query(&[("output_format", self.output_format.as_str())])
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("ElevenLabs API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response.bytes().await.map_err(ProviderError::from_transport)
    }

    fn output_format(&self) -> &str {
        &self.output_format
    }
}
