/*!
 * Mock speech synthesizer for testing.
 *
 * This module provides a synthesizer that simulates different behaviors:
 * - `MockSynthesizer::working()` - Always returns a decodable WAV clip
 * - `MockSynthesizer::failing()` - Always fails with an API error
 * - `MockSynthesizer::undecodable()` - Returns bytes that are not audio
 * - `.failing_on(text)` - Fails only for specific lines
 *
 * Every clip is a constant level derived from the spoken text, so tests can
 * tell clips apart in an assembled track.
 */

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::audio::{encode_wav, samples_for, TRACK_SAMPLE_RATE};
use crate::errors::ProviderError;
use crate::providers::SpeechSynthesizer;

/// Behavior mode for the mock synthesizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a WAV clip
    Working,
    /// Always fails with an API error
    Failing { status_code: u16 },
    /// Succeeds with bytes no decoder accepts
    Undecodable,
}

/// One recorded synthesize call
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub text: String,
    pub voice_id: String,
}

/// Mock synthesizer for testing assembly behavior
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    /// Behavior mode
    behavior: MockBehavior,
    /// Texts that fail regardless of the behavior
    failing_texts: Vec<String>,
    /// Length of every produced clip
    clip_duration: Duration,
    /// Sample rate of every produced clip
    sample_rate: u32,
    /// Artificial latency per call
    delay: Option<Duration>,
    /// Calls in the order they were made
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockSynthesizer {
    /// Create a new mock synthesizer with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            failing_texts: Vec::new(),
            clip_duration: Duration::from_millis(200),
            sample_rate: TRACK_SAMPLE_RATE,
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock synthesizer
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that always fails with HTTP 500
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing { status_code: 500 })
    }

    /// Create a mock that returns undecodable bytes
    pub fn undecodable() -> Self {
        Self::new(MockBehavior::Undecodable)
    }

    /// Fail with HTTP 429 whenever this exact text is requested
    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        self.failing_texts.push(text.into());
        self
    }

    /// Set the length of produced clips
    pub fn with_clip_duration(mut self, duration: Duration) -> Self {
        self.clip_duration = duration;
        self
    }

    /// Set the sample rate of produced clips
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Delay every response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls made so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Number of samples in each produced clip
    pub fn clip_samples(&self) -> usize {
        samples_for(self.clip_duration, self.sample_rate)
    }

    /// Sample level used for the clip of `text`
    pub fn level_for(text: &str) -> i16 {
        let sum: u32 = text.bytes().map(u32::from).sum();
        (sum % 10_000) as i16 + 1
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, ProviderError> {
        self.calls.lock().push(MockCall {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_texts.iter().any(|t| t == text) {
            return Err(ProviderError::ApiError {
                status_code: 429,
                message: "Too many requests".to_string(),
            });
        }

        match self.behavior {
            MockBehavior::Working => {
                let samples = vec![Self::level_for(text); self.clip_samples()];
                encode_wav(&samples, self.sample_rate)
                    .map(Bytes::from)
                    .map_err(|e| ProviderError::ParseError(e.to_string()))
            }
            MockBehavior::Failing { status_code } => Err(ProviderError::ApiError {
                status_code,
                message: "Mock provider failure".to_string(),
            }),
            MockBehavior::Undecodable => Ok(Bytes::from_static(b"definitely not audio")),
        }
    }

    fn output_format(&self) -> &str {
        "wav"
    }
}
