/*!
 * Provider implementations for the external generative services.
 *
 * This module contains client implementations for:
 * - ElevenLabs: text-to-speech, behind the `SpeechSynthesizer` trait
 * - OpenAI: chat completions for drafting screenplays
 * - Stability: scene image generation
 * - Mock: an in-process speech synthesizer for tests
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for text-to-speech providers
///
/// The scene assembler and the HTTP API only talk to speech providers through
/// this trait, so tests can substitute a mock.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + Debug {
    /// Synthesize one line of text with the given provider voice
    ///
    /// # Returns
    /// * `Result<Bytes, ProviderError>` - Encoded audio bytes, or the provider failure
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, ProviderError>;

    /// Output format tag the audio is produced in (e.g. `mp3_44100_128`)
    fn output_format(&self) -> &str;
}

pub mod elevenlabs;
pub mod mock;
pub mod openai;
pub mod stability;
