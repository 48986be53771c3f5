//! Error kinds for the generation pipeline.
//!
//! Every failure of the remote call is reduced to one [`ErrorKind`]. The kind
//! decides whether the failure is retried and which message the user sees;
//! the raw provider diagnostic travels alongside it in [`ClassifiedError`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a failed generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing, malformed, leaked or revoked credential.
    AuthError,
    /// Rate limit or quota exhaustion.
    QuotaExceeded,
    /// The service is temporarily overloaded.
    ServiceOverloaded,
    /// The service answered but the answer held no usable image.
    MalformedResponse,
    /// No response reached us (network failure, timeout).
    TransportError,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// All kinds, in classification precedence order.
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::AuthError,
        ErrorKind::QuotaExceeded,
        ErrorKind::ServiceOverloaded,
        ErrorKind::MalformedResponse,
        ErrorKind::TransportError,
        ErrorKind::Unknown,
    ];

    /// Whether this kind is transient under the default policy.
    ///
    /// Only quota and overload failures qualify. Transport failures can be
    /// opted in through the retry configuration.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::QuotaExceeded | ErrorKind::ServiceOverloaded)
    }

    /// Stable identifier used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::AuthError => "auth_error",
            ErrorKind::QuotaExceeded => "quota_exceeded",
            ErrorKind::ServiceOverloaded => "service_overloaded",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::TransportError => "transport_error",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// User-facing message with a concrete next action.
    ///
    /// `Unknown` has no fixed text; [`ClassifiedError::user_message`] passes
    /// the raw diagnostic through for it.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::AuthError => {
                "The API key was rejected. Check your credential and try again."
            }
            ErrorKind::QuotaExceeded => {
                "The generation quota is used up for now. Wait a minute and try again shortly."
            }
            ErrorKind::ServiceOverloaded => {
                "The image service is overloaded. Try again shortly."
            }
            ErrorKind::MalformedResponse => {
                "The service answered without an image. Try again, or use a different photo."
            }
            ErrorKind::TransportError => {
                "Could not reach the image service. Check your connection and try again."
            }
            ErrorKind::Unknown => "Generation failed unexpectedly. Try again.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure: the kind plus the original diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    /// The classified kind.
    pub kind: ErrorKind,
    /// The raw provider or transport diagnostic.
    pub message: String,
    /// HTTP status, when the service answered with one.
    pub status: Option<u16>,
}

impl ClassifiedError {
    /// Create a classified error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Attach an HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// The message shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::Unknown if !self.message.trim().is_empty() => {
                format!("Generation failed: {}", self.message)
            }
            kind => kind.user_message().to_string(),
        }
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for ClassifiedError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds() {
        let transient: Vec<_> = ErrorKind::ALL
            .into_iter()
            .filter(|k| k.is_transient())
            .collect();
        assert_eq!(
            transient,
            vec![ErrorKind::QuotaExceeded, ErrorKind::ServiceOverloaded]
        );
    }

    #[test]
    fn test_user_message_never_empty() {
        for kind in ErrorKind::ALL {
            assert!(!kind.user_message().is_empty());
        }
    }

    #[test]
    fn test_unknown_passes_diagnostic_through() {
        let err = ClassifiedError::new(ErrorKind::Unknown, "teapot exploded");
        assert_eq!(err.to_string(), "Generation failed: teapot exploded");
    }

    #[test]
    fn test_known_kind_hides_raw_diagnostic() {
        let err = ClassifiedError::new(ErrorKind::AuthError, "API key leaked: AIza...")
            .with_status(403);
        assert!(!err.to_string().contains("AIza"));
        assert!(err.to_string().contains("credential"));
        assert_eq!(err.status, Some(403));
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&ErrorKind::QuotaExceeded).unwrap();
        assert_eq!(json, "\"quota_exceeded\"");
    }
}
