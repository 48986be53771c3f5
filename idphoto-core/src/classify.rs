//! Failure classification.
//!
//! [`classify`] is the single place where status codes and provider message
//! text are mapped to an [`ErrorKind`]. Rules are applied in order and the
//! first match wins; message matching is case-insensitive substring search.
//!
//! | # | rule | kind |
//! |---|------|------|
//! | 1 | credential marker in message, or status 401/403 | `AuthError` |
//! | 2 | status 429, or quota marker in message | `QuotaExceeded` |
//! | 3 | status 503, or overload marker in message | `ServiceOverloaded` |
//! | 4 | answered successfully without an image | `MalformedResponse` |
//! | 5 | failed before any response arrived | `TransportError` |
//! | 6 | anything else | `Unknown` |

use crate::errors::{ClassifiedError, ErrorKind};
use serde::{Deserialize, Serialize};

/// Message fragments that identify a credential problem.
pub const AUTH_MARKERS: &[&str] = &[
    "api key not valid",
    "api_key_invalid",
    "invalid api key",
    "api key expired",
    "leaked",
    "revoked",
    "permission_denied",
    "permission denied",
    "unauthenticated",
    "invalid credential",
];

/// Message fragments that identify quota or rate limiting.
pub const QUOTA_MARKERS: &[&str] = &[
    "quota",
    "resource_exhausted",
    "resource exhausted",
    "rate limit",
    "too many requests",
];

/// Message fragments that identify an overloaded service.
///
/// A bare "unavailable" is not enough: socket errors such as `EAGAIN`
/// ("Resource temporarily unavailable") must stay transport failures.
pub const OVERLOAD_MARKERS: &[&str] = &[
    "overloaded",
    "service unavailable",
    "unavailable:",
    "high demand",
];

/// How far the remote call got before it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Nothing came back: connection refused, DNS, timeout.
    Transport,
    /// The service answered with an error status.
    Status,
    /// The service answered successfully but the payload was unusable.
    Payload,
}

/// What the classifier sees of a failed remote call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFailure {
    /// HTTP status, if a response arrived.
    pub status: Option<u16>,
    /// Diagnostic text from the provider or transport.
    pub message: String,
    /// Where the call failed.
    pub stage: FailureStage,
}

impl RawFailure {
    /// A failure before any response arrived.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            stage: FailureStage::Transport,
        }
    }

    /// An error status from the service.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            stage: FailureStage::Status,
        }
    }

    /// A successful answer without a usable image.
    pub fn payload(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            stage: FailureStage::Payload,
        }
    }

    /// Classify and keep the diagnostic.
    #[must_use]
    pub fn into_classified(self) -> ClassifiedError {
        let kind = classify(&self);
        ClassifiedError {
            kind,
            message: self.message,
            status: self.status,
        }
    }
}

/// Map a raw failure to its [`ErrorKind`].
#[must_use]
pub fn classify(failure: &RawFailure) -> ErrorKind {
    let message = failure.message.to_lowercase();
    let mentions = |markers: &[&str]| markers.iter().any(|m| message.contains(m));

    if matches!(failure.status, Some(401 | 403)) || mentions(AUTH_MARKERS) {
        ErrorKind::AuthError
    } else if failure.status == Some(429) || mentions(QUOTA_MARKERS) {
        ErrorKind::QuotaExceeded
    } else if failure.status == Some(503) || mentions(OVERLOAD_MARKERS) {
        ErrorKind::ServiceOverloaded
    } else {
        match failure.stage {
            FailureStage::Payload => ErrorKind::MalformedResponse,
            FailureStage::Transport => ErrorKind::TransportError,
            FailureStage::Status => ErrorKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RawFailure::status(403, "The caller does not have permission"), ErrorKind::AuthError)]
    #[case(RawFailure::status(401, "Request had invalid authentication"), ErrorKind::AuthError)]
    #[case(
        RawFailure::status(400, "API key not valid. Please pass a valid API key."),
        ErrorKind::AuthError
    )]
    #[case(
        RawFailure::status(403, "Your API key was reported as leaked"),
        ErrorKind::AuthError
    )]
    #[case(RawFailure::status(429, "Too Many Requests"), ErrorKind::QuotaExceeded)]
    #[case(
        RawFailure::status(400, "RESOURCE_EXHAUSTED: quota exceeded for metric"),
        ErrorKind::QuotaExceeded
    )]
    #[case(RawFailure::status(503, "try later"), ErrorKind::ServiceOverloaded)]
    #[case(RawFailure::status(500, "The model is overloaded"), ErrorKind::ServiceOverloaded)]
    #[case(
        RawFailure::status(500, "UNAVAILABLE: The service is currently unavailable."),
        ErrorKind::ServiceOverloaded
    )]
    #[case(RawFailure::payload("no image part in response"), ErrorKind::MalformedResponse)]
    #[case(RawFailure::transport("connection refused"), ErrorKind::TransportError)]
    #[case(RawFailure::transport("operation timed out"), ErrorKind::TransportError)]
    #[case(RawFailure::status(500, "internal error"), ErrorKind::Unknown)]
    #[case(RawFailure::status(400, "bad request"), ErrorKind::Unknown)]
    fn test_classify(#[case] failure: RawFailure, #[case] expected: ErrorKind) {
        assert_eq!(classify(&failure), expected);
    }

    #[test]
    fn test_auth_takes_precedence_over_quota() {
        let failure = RawFailure::status(429, "API key revoked; quota exceeded");
        assert_eq!(classify(&failure), ErrorKind::AuthError);
    }

    #[test]
    fn test_quota_takes_precedence_over_overload() {
        let failure = RawFailure::status(503, "quota exhausted, service unavailable");
        assert_eq!(classify(&failure), ErrorKind::QuotaExceeded);
    }

    #[test]
    fn test_markers_apply_to_every_stage() {
        let failure = RawFailure::payload("Quota exceeded");
        assert_eq!(classify(&failure), ErrorKind::QuotaExceeded);

        let failure = RawFailure::transport("service unavailable");
        assert_eq!(classify(&failure), ErrorKind::ServiceOverloaded);
    }

    #[test]
    fn test_socket_unavailable_stays_transport() {
        let failure = RawFailure::transport(
            "Connection error: tcp connect error: Resource temporarily unavailable (os error 11)",
        );
        assert_eq!(classify(&failure), ErrorKind::TransportError);
    }

    #[test]
    fn test_case_insensitive() {
        let failure = RawFailure::status(400, "PERMISSION_DENIED");
        assert_eq!(classify(&failure), ErrorKind::AuthError);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let failure = RawFailure::status(429, "slow down");
        let first = classify(&failure);
        for _ in 0..10 {
            assert_eq!(classify(&failure.clone()), first);
        }
    }

    #[test]
    fn test_into_classified_keeps_diagnostic() {
        let err = RawFailure::status(429, "Resource has been exhausted").into_classified();
        assert_eq!(err.kind, ErrorKind::QuotaExceeded);
        assert_eq!(err.status, Some(429));
        assert_eq!(err.message, "Resource has been exhausted");
    }
}
