use bytes::Bytes;
use log::error;
use reqwest::multipart::Form;
use reqwest::Client;
use std::time::Duration;

use crate::errors::ProviderError;

/// Stability client for text-to-image generation
pub struct Stability {
    /// HTTP client for API requests
    client: Client,
    /// API key for bearer authentication
    api_key: String,
    /// API base URL
    endpoint: String,
}

/// Scene image request
#[derive(Debug, Clone)]
pub struct ImageRequest {
    /// Scene description
    pub prompt: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            prompt: prompt.into(),
            width,
            height,
        }
    }

    fn into_form(self) -> Form {
        Form::new()
            .text("prompt", self.prompt)
            .text("output_format", "png")
            .text("width", self.width.to_string())
            .text("height", self.height.to_string())
            .text("mode", "text-to-image")
    }
}

impl Stability {
    /// Create a new Stability client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        })
    }

    /// Generate a PNG image for the request
    pub async fn generate(&self, request: ImageRequest) -> Result<Bytes, ProviderError> {
        let api_url = format!("{}/v2beta/stable-image/generate/core", self.endpoint.trim_end_matches('/'));

        let response = self.client.post(&api_url)
            .bearer_auth(&self.api_key)
            .header("Accept", "image/png")
            .multipart(request.into_form())
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Stability API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response.bytes().await.map_err(ProviderError::from_transport)
    }
}
