/*!
 * HTTP API for single-line dialogue synthesis.
 *
 * Routes:
 * - `GET /health`
 * - `GET /voices`
 * - `POST /generate-dialogue-audio`: audio file as an attachment
 * - `POST /generate-dialogue-audio-stream`: raw audio body
 * - `POST /generate-dialogue-audio-info`: metadata only
 *
 * Every POST takes `{"text": ..., "voice_id": ..., "output_format": ...}`.
 * Voice names are looked up in the configured catalog; anything else is
 * passed to the provider as a raw voice id.
 */

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use log::{error, info};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::app_config::Config;
use crate::audio::{estimate_duration_secs, ASSUMED_BITRATE_KBPS};
use crate::providers::elevenlabs::{is_valid_output_format, ElevenLabs};
use crate::providers::SpeechSynthesizer;
use crate::voices::VoiceCatalog;

/// Name reported by the health endpoint
pub const SERVICE_NAME: &str = "Dialogue Audio Generator API";

/// Routes listed in the 404 response
pub const AVAILABLE_ENDPOINTS: [&str; 5] = [
    "GET /health",
    "GET /voices",
    "POST /generate-dialogue-audio",
    "POST /generate-dialogue-audio-stream",
    "POST /generate-dialogue-audio-info",
];

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    // @field: Provider used for every request
    synthesizer: Arc<dyn SpeechSynthesizer>,
    // @field: Named voices offered to clients
    catalog: Arc<VoiceCatalog>,
}

impl AppState {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, catalog: VoiceCatalog) -> Self {
        Self {
            synthesizer,
            catalog: Arc::new(catalog),
        }
    }
}

/// A validated generation request
#[derive(Debug)]
struct DialogueJob {
    text: String,
    voice_id: String,
    output_format: String,
}

/// Errors returned as JSON bodies
#[derive(Debug)]
enum ApiError {
    /// Request was rejected before reaching the provider
    BadRequest(&'static str),
    /// Provider call failed
    Generation { error: &'static str, details: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Generation { error, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error, "details": details })),
            )
                .into_response(),
        }
    }
}

/// Build the router with all routes, the 404 fallback and permissive CORS
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/voices", get(voices_handler))
        .route("/generate-dialogue-audio", post(generate_audio_handler))
        .route("/generate-dialogue-audio-stream", post(generate_stream_handler))
        .route("/generate-dialogue-audio-info", post(generate_info_handler))
        .fallback(not_found_handler)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured address and serve until the process exits
pub async fn serve(config: &Config) -> Result<()> {
    let synthesizer = ElevenLabs::from_config(&config.speech)
        .context("Failed to create speech provider")?;
    let state = AppState::new(Arc::new(synthesizer), config.voice_catalog());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Dialogue API listening on http://{}", addr);
    for endpoint in AVAILABLE_ENDPOINTS {
        info!("  {}", endpoint);
    }

    axum::serve(listener, router(state))
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Local::now().to_rfc3339(),
        "service": SERVICE_NAME,
    }))
}

async fn voices_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "voices": state.catalog.entries(),
        "message": "Available voices for audio generation",
    }))
}

async fn generate_audio_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let job = validate(&state, &headers, &body)?;
    let audio = synthesize(&state, &job, "Failed to generate dialogue audio").await?;

    let filename = format!("dialogue_{}.{}", short_id(), job.output_format);
    info!("Audio generated successfully: {} ({} bytes)", filename, audio.len());

    Ok((
        [
            (header::CONTENT_TYPE, format!("audio/{}", job.output_format)),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        audio,
    )
        .into_response())
}

async fn generate_stream_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let job = validate(&state, &headers, &body)?;
    let audio = synthesize(&state, &job, "Failed to generate dialogue audio").await?;

    info!("Audio generated successfully for streaming");
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response())
}

async fn generate_info_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let job = validate(&state, &headers, &body)?;
    let audio = synthesize(&state, &job, "Failed to generate dialogue audio info").await?;

    info!("Audio generated successfully for info endpoint");
    Ok(Json(json!({
        "success": true,
        "text": job.text,
        "voice_id": job.voice_id,
        "audio_size_bytes": audio.len(),
        "estimated_duration_seconds": estimate_duration_secs(audio.len(), ASSUMED_BITRATE_KBPS),
        "format": "mp3",
        "timestamp": chrono::Local::now().to_rfc3339(),
        "message": "Audio generated successfully. Use the /generate-dialogue-audio endpoint to download the actual audio file.",
    })))
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "available_endpoints": AVAILABLE_ENDPOINTS,
        })),
    )
}

fn validate(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<DialogueJob, ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err(ApiError::BadRequest("Content-Type must be application/json"));
    }

    let request = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        _ => return Err(ApiError::BadRequest("Request body must be a JSON object")),
    };

    let text = string_field(&request, "text", "Field 'text' must be a string")?
        .ok_or(ApiError::BadRequest("Missing required field: 'text'"))?
        .trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Text cannot be empty"));
    }

    let voice_id = string_field(&request, "voice_id", "Field 'voice_id' must be a string")?;

    let output_format = string_field(&request, "output_format", "Field 'output_format' must be a string")?
        .unwrap_or("mp3");
    if !is_valid_output_format(output_format) {
        return Err(ApiError::BadRequest("Invalid output_format: use lowercase letters, digits and '_'"));
    }

    Ok(DialogueJob {
        text: text.to_string(),
        voice_id: state.catalog.resolve_or_raw(voice_id),
        output_format: output_format.to_string(),
    })
}

// A missing or null field is `None`; any other non-string value is rejected
fn string_field<'a>(
    fields: &'a Map<String, Value>,
    name: &str,
    type_error: &'static str,
) -> Result<Option<&'a str>, ApiError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(ApiError::BadRequest(type_error)),
    }
}

async fn synthesize(state: &AppState, job: &DialogueJob, failure: &'static str) -> Result<Bytes, ApiError> {
    let preview: String = job.text.chars().take(50).collect();
    info!("Generating audio for text: {}... with voice: {}", preview, job.voice_id);

    state
        .synthesizer
        .synthesize(&job.text, &job.voice_id)
        .await
        .map_err(|e| {
            error!("{}: {}", failure, e);
            ApiError::Generation {
                error: failure,
                details: e.to_string(),
            }
        })
}

fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
