/*!
 * Tests for error types and conversions
 */

use scenevox::errors::{DecodeError, FinalizeError, ProviderError, SkipReason};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_providerError_timeout_shouldDisplayCorrectly() {
    let error = ProviderError::Timeout("operation timed out".to_string());
    assert!(error.to_string().contains("timed out"));
}

#[test]
fn test_skipReason_unresolvedVoice_shouldNameCharacter() {
    let reason = SkipReason::UnresolvedVoice("MORGAN".to_string());
    assert_eq!(reason.to_string(), "no voice assigned to character 'MORGAN'");
}

#[test]
fn test_skipReason_fromProviderError_shouldWrap() {
    let reason: SkipReason = ProviderError::ApiError {
        status_code: 500,
        message: "boom".to_string(),
    }
    .into();
    assert!(matches!(reason, SkipReason::Provider(ProviderError::ApiError { status_code: 500, .. })));
    assert!(reason.to_string().starts_with("speech provider failed"));
}

#[test]
fn test_skipReason_fromDecodeError_shouldWrap() {
    let reason: SkipReason = DecodeError::Resample("invalid rate conversion 0 -> 44100 Hz".to_string()).into();
    let display = reason.to_string();
    assert!(display.starts_with("audio could not be decoded"));
    assert!(display.contains("0 -> 44100"));
}

#[test]
fn test_skipReason_emptyText_shouldDescribeMissingSpeech() {
    assert_eq!(SkipReason::EmptyText.to_string(), "line has no spoken text");
}

#[test]
fn test_providerError_fromStatus_shouldSeparateAuthenticationFailures() {
    for status in [401, 403] {
        let error = ProviderError::from_status(status, "invalid key".to_string());
        assert!(matches!(error, ProviderError::AuthenticationError(ref m) if m.contains("invalid key")));
    }
    let error = ProviderError::from_status(500, "boom".to_string());
    assert!(matches!(error, ProviderError::ApiError { status_code: 500, .. }));
}

#[test]
fn test_finalizeError_fromIoError_shouldBeIo() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let error: FinalizeError = io.into();
    assert!(matches!(error, FinalizeError::Io(_)));
}
