//! Model-related error types.

use idphoto_core::RawFailure;
use std::time::Duration;
use thiserror::Error;

/// Request timeout assumed when the configured one is not known.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Model-related errors.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Error status from the API.
    #[error("HTTP error: {status} - {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Provider message, or the raw body when it was not parseable.
        message: String,
        /// Provider status code string, e.g. `RESOURCE_EXHAUSTED`.
        code: Option<String>,
    },

    /// Request timeout.
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Credential missing or malformed; no request was sent.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The API answered successfully without an image.
    #[error("No image in response: {0}")]
    NoImage(String),

    /// The API answered with a body we could not decode.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModelError {
    /// Create an HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            code: None,
        }
    }

    /// Create an HTTP error with the provider's status code string.
    pub fn http_with_code(status: u16, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create a missing-image error.
    pub fn no_image(message: impl Into<String>) -> Self {
        Self::NoImage(message.into())
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Replace the duration of a [`Timeout`](Self::Timeout) with the one
    /// actually configured on the request.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match self {
            Self::Timeout(_) => Self::Timeout(timeout),
            other => other,
        }
    }

    /// Get the HTTP status if the API answered with one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Describe this error for the classifier.
    #[must_use]
    pub fn to_raw_failure(&self) -> RawFailure {
        match self {
            Self::Http {
                status,
                message,
                code,
            } => {
                let message = match code {
                    Some(code) => format!("{code}: {message}"),
                    None => message.clone(),
                };
                RawFailure::status(*status, message)
            }
            Self::Timeout(_) | Self::Connection(_) | Self::Network(_) => {
                RawFailure::transport(self.to_string())
            }
            Self::Authentication(message) => RawFailure::status(401, message.clone()),
            Self::NoImage(_) | Self::InvalidResponse(_) => RawFailure::payload(self.to_string()),
            Self::Configuration(_) | Self::Other(_) => RawFailure {
                status: None,
                message: self.to_string(),
                stage: idphoto_core::FailureStage::Status,
            },
        }
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        let err = err.without_url();
        // Callers that know the configured timeout use `with_timeout`.
        if err.is_timeout() {
            ModelError::Timeout(DEFAULT_TIMEOUT)
        } else if err.is_connect() {
            ModelError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ModelError::http(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            ModelError::InvalidResponse(err.to_string())
        } else if err.is_request() || err.is_body() {
            ModelError::Network(err.to_string())
        } else {
            ModelError::Other(err.into())
        }
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
