//! Gemini API types.
//!
//! Request/response types for the `generateContent` endpoint, limited to what
//! image editing uses.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; image edits send a single user turn.
    pub contents: Vec<Content>,
    /// Output settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Request with the given turns and no output settings.
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            generation_config: None,
        }
    }

    /// Attach output settings.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// `user` on requests, `model` on responses.
    #[serde(default)]
    pub role: String,
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn.
    pub fn user_parts(parts: Vec<Part>) -> Self {
        Self {
            role: "user".to_string(),
            parts,
        }
    }
}

/// One piece of a turn: text or inline media.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// Inline binary data.
    InlineData {
        /// The blob data.
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    /// Any part kind we do not use.
    Other(JsonValue),
}

impl Part {
    /// Text part.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }

    /// Base64 media part.
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            inline_data: Blob {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }

    /// The text, for text parts.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Base64 media with its type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// MIME type.
    pub mime_type: String,
    /// Base64 data.
    pub data: String,
}

/// Output settings for a call.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Output modalities, e.g. `["TEXT", "IMAGE"]`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_modalities: Vec<String>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Candidates to return; the service defaults to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
}

impl GenerationConfig {
    /// Empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for text and image output.
    pub fn image_output(mut self) -> Self {
        self.response_modalities = vec!["TEXT".to_string(), "IMAGE".to_string()];
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, t: f64) -> Self {
        self.temperature = Some(t);
        self
    }
}

/// Reply to a `generateContent` call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Alternative answers; image edits use the first.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Model version that served the call.
    #[serde(default)]
    pub model_version: Option<String>,
    /// Present when the prompt was blocked.
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The answer's turn. Missing when generation stopped early.
    #[serde(default)]
    pub content: Option<Content>,
    /// Why generation stopped, e.g. `STOP` or `IMAGE_SAFETY`.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Feedback about the prompt itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Why the prompt was blocked, e.g. `SAFETY`.
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Error envelope of a non-2xx reply.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiError {
    /// The error.
    pub error: GeminiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiErrorBody {
    /// Numeric code, usually the HTTP status.
    #[serde(default)]
    pub code: u32,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Error status, e.g. `RESOURCE_EXHAUSTED`.
    #[serde(default)]
    pub status: Option<String>,
}
