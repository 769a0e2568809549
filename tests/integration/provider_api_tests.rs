/*!
 * Provider HTTP clients against a local mock server
 */

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scenevox::errors::ProviderError;
use scenevox::providers::elevenlabs::{ElevenLabs, VoiceSettings};
use scenevox::providers::openai::{OpenAI, OpenAIRequest};
use scenevox::providers::stability::{ImageRequest, Stability};
use scenevox::providers::SpeechSynthesizer;

fn elevenlabs(server: &MockServer, timeout: Duration) -> ElevenLabs {
    ElevenLabs::new("secret-key", server.uri(), timeout).unwrap()
}

#[tokio::test]
async fn test_elevenLabs_synthesize_shouldSendWireFormatAndReturnBytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/voice-riley"))
        .and(query_param("output_format", "mp3_44100_128"))
        .and(header("xi-api-key", "secret-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "text": "Hey.",
            "model_id": "eleven_monolingual_v1",
            "voice_settings": { "stability": 0.5, "similarity_boost": 0.75 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xFB, 0x90, 0x00]))
        .expect(1)
        .mount(&server)
        .await;

    let audio = elevenlabs(&server, Duration::from_secs(5))
        .synthesize("Hey.", "voice-riley")
        .await
        .unwrap();

    assert_eq!(audio.as_ref(), &[0xFF, 0xFB, 0x90, 0x00]);
}

#[tokio::test]
async fn test_elevenLabs_customSettings_shouldBeSent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("output_format", "pcm_44100"))
        .and(body_json(json!({
            "text": "Hi.",
            "model_id": "eleven_turbo_v2",
            "voice_settings": { "stability": 0.25, "similarity_boost": 1.0 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = elevenlabs(&server, Duration::from_secs(5))
        .model("eleven_turbo_v2")
        .voice_settings(VoiceSettings { stability: 0.25, similarity_boost: 1.0 })
        .output_format("pcm_44100");

    assert!(client.synthesize("Hi.", "voice-jamie").await.is_ok());
    assert_eq!(client.output_format(), "pcm_44100");
}

#[tokio::test]
async fn test_elevenLabs_non200_shouldReturnApiErrorWithBody() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("voice engine down"))
        .mount(&server)
        .await;

    let error = elevenlabs(&server, Duration::from_secs(5))
        .synthesize("Hey.", "voice-riley")
        .await
        .unwrap_err();

    match error {
        ProviderError::ApiError { status_code, message } => {
            assert_eq!(status_code, 500);
            assert_eq!(message, "voice engine down");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_elevenLabs_unauthorized_shouldReturnAuthenticationError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let error = elevenlabs(&server, Duration::from_secs(5))
        .synthesize("Hey.", "voice-riley")
        .await
        .unwrap_err();

    match error {
        ProviderError::AuthenticationError(message) => assert_eq!(message, "401 - invalid api key"),
        other => panic!("expected AuthenticationError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_elevenLabs_slowResponse_shouldTimeOut() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let error = elevenlabs(&server, Duration::from_millis(100))
        .synthesize("Hey.", "voice-riley")
        .await
        .unwrap_err();

    assert!(matches!(error, ProviderError::Timeout(_)), "got {:?}", error);
}

#[tokio::test]
async fn test_elevenLabs_unreachableEndpoint_shouldBeRequestFailed() {
    let client = ElevenLabs::new("k", "http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let error = client.synthesize("Hey.", "voice-riley").await.unwrap_err();
    assert!(matches!(error, ProviderError::RequestFailed(_)), "got {:?}", error);
}

#[tokio::test]
async fn test_openAI_complete_shouldUseBearerAuthAndParseChoices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer oa-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "**RILEY** \"Hey.\"" } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 5 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAI::new("oa-key", server.uri(), Duration::from_secs(5)).unwrap();
    let request = OpenAIRequest::new("gpt-4o")
        .add_message("system", "You write scripts.")
        .add_message("user", "Storyline: a reunion");
    let response = client.complete(request).await.unwrap();

    assert_eq!(OpenAI::extract_text(&response), "**RILEY** \"Hey.\"");
    assert_eq!(response.usage.map(|u| u.completion_tokens), Some(5));
}

#[tokio::test]
async fn test_openAI_rateLimited_shouldReturnApiError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = OpenAI::new("oa-key", server.uri(), Duration::from_secs(5)).unwrap();
    let error = client.complete(OpenAIRequest::new("gpt-4o")).await.unwrap_err();

    assert!(matches!(error, ProviderError::ApiError { status_code: 429, .. }));
}

#[tokio::test]
async fn test_stability_generate_shouldPostMultipartAndReturnPng() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2beta/stable-image/generate/core"))
        .and(header("authorization", "Bearer st-key"))
        .and(header("accept", "image/png"))
        .and(body_string_contains("A lake at dusk"))
        .and(body_string_contains("text-to-image"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = Stability::new("st-key", server.uri(), Duration::from_secs(5)).unwrap();
    let png = client
        .generate(ImageRequest::new("A lake at dusk", 768, 512))
        .await
        .unwrap();

    assert_eq!(png.as_ref(), b"\x89PNG");
}

#[tokio::test]
async fn test_stability_badRequest_shouldReturnApiError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("prompt rejected"))
        .mount(&server)
        .await;

    let client = Stability::new("st-key", server.uri(), Duration::from_secs(5)).unwrap();
    let error = client.generate(ImageRequest::new("x", 64, 64)).await.unwrap_err();

    match error {
        ProviderError::ApiError { status_code, message } => {
            assert_eq!(status_code, 400);
            assert_eq!(message, "prompt rejected");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}
