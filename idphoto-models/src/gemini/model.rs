//! Gemini image-editing model implementation.

use super::types::*;
use crate::credential::ApiKey;
use crate::error::{ModelError, DEFAULT_TIMEOUT};
use crate::model::{ImageModel, ImageResponse, ResponsePart};
use async_trait::async_trait;
use idphoto_core::EncodedImage;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default public endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini image model.
///
/// `Debug` never prints the API key.
#[derive(Clone)]
pub struct GeminiImageModel {
    model_name: String,
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
    temperature: Option<f64>,
}

impl GeminiImageModel {
    /// Create a new model. The key is shape-checked before every call, not here.
    pub fn new(model_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            temperature: None,
        }
    }

    /// Create from a validated key.
    pub fn with_key(model_name: impl Into<String>, api_key: &ApiKey) -> Self {
        Self::new(model_name, api_key.expose())
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set a custom HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Build the API URL.
    fn build_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model_name, self.api_key
        )
    }

    /// Build the request body.
    fn build_request(&self, image: &EncodedImage, instructions: &str) -> GenerateContentRequest {
        let parts = vec![
            Part::inline_data(&image.media_type, &image.data),
            Part::text(instructions),
        ];

        let mut config = GenerationConfig::new().image_output();
        if let Some(t) = self.temperature {
            config = config.temperature(t);
        }

        GenerateContentRequest::new(vec![Content::user_parts(parts)]).with_generation_config(config)
    }

    /// Parse the response into parts.
    fn parse_response(&self, resp: GenerateContentResponse) -> Result<ImageResponse, ModelError> {
        if let Some(reason) = resp
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
        {
            return Err(ModelError::no_image(format!("Prompt blocked: {reason}")));
        }

        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::no_image("No candidates in response"))?;

        let mut parts = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            match part {
                Part::Text { text } if !text.is_empty() => parts.push(ResponsePart::Text(text)),
                Part::InlineData { inline_data } => parts.push(ResponsePart::Image(
                    EncodedImage::new(inline_data.data, inline_data.mime_type),
                )),
                _ => {}
            }
        }

        Ok(ImageResponse {
            parts,
            finish_reason: candidate.finish_reason,
        })
    }

    /// Handle API error response.
    fn handle_error_response(&self, status: u16, body: &str) -> ModelError {
        match serde_json::from_str::<GeminiError>(body) {
            Ok(err) => match err.error.status {
                Some(code) => ModelError::http_with_code(status, err.error.message, code),
                None => ModelError::http(status, err.error.message),
            },
            Err(_) => ModelError::http(status, body),
        }
    }
}

impl std::fmt::Debug for GeminiImageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiImageModel")
            .field("model_name", &self.model_name)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ImageModel for GeminiImageModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn system(&self) -> &str {
        "gemini"
    }

    fn check_credentials(&self) -> Result<(), ModelError> {
        ApiKey::parse(&self.api_key).map(|_| ())
    }

    async fn edit_image(
        &self,
        image: &EncodedImage,
        instructions: &str,
    ) -> Result<ImageResponse, ModelError> {
        let body = self.build_request(image, instructions);

        debug!(
            model = %self.model_name,
            media_type = %image.media_type,
            payload_bytes = image.encoded_len(),
            "Sending image edit request"
        );

        let response = self
            .client
            .post(self.build_url())
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::from(e).with_timeout(self.timeout))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.handle_error_response(status, &body));
        }

        let resp: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::invalid_response(e.without_url().to_string()))?;

        self.parse_response(resp)
    }
}
