/*!
 * Error types for the scenevox application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Per-line failures during scene assembly (`SkipReason`) are recovered and
 * reported; only `FinalizeError` ends a run.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The provider rejected the credentials (HTTP 401 or 403)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map a non-success HTTP response onto the provider error kinds
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(format!("{} - {}", status_code, message)),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Map a transport-level reqwest error onto the provider error kinds
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur while decoding a synthesized clip
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The container format could not be recognized
    #[error("Unrecognized audio container: {0}")]
    Probe(String),

    /// The container holds no decodable audio track
    #[error("No decodable audio track found")]
    NoAudioTrack,

    /// The codec is not supported by the decoder
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    /// A packet could not be decoded
    #[error("Decoding failed: {0}")]
    Decode(String),

    /// The clip could not be converted to the track's sample rate
    #[error("Resampling failed: {0}")]
    Resample(String),

    /// Decoding produced no samples
    #[error("Clip contained no audio samples")]
    Empty,
}

/// Errors that can occur while flattening and encoding the final track
#[derive(Error, Debug)]
pub enum FinalizeError {
    /// The encoder rejected the samples or the output format
    #[error("Failed to encode track: {0}")]
    Encode(String),

    /// Writing the encoded output failed
    #[error("Failed to write track: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for FinalizeError {
    fn from(error: hound::Error) -> Self {
        match error {
            hound::Error::IoError(e) => Self::Io(e),
            other => Self::Encode(other.to_string()),
        }
    }
}

/// Why a script line contributed no audio to the track
#[derive(Error, Debug)]
pub enum SkipReason {
    /// Nothing is left to speak once emphasis and asides are removed
    #[error("line has no spoken text")]
    EmptyText,

    /// The character has no entry in the voice registry
    #[error("no voice assigned to character '{0}'")]
    UnresolvedVoice(String),

    /// The speech provider call failed
    #[error("speech provider failed: {0}")]
    Provider(#[from] ProviderError),

    /// The returned audio could not be decoded
    #[error("audio could not be decoded: {0}")]
    Decode(#[from] DecodeError),
}
