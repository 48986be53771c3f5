//! Retry error types.

use idphoto_core::{ClassifiedError, ErrorKind};
use thiserror::Error;

/// Why a retried operation gave up.
#[derive(Debug, Clone, Error)]
pub enum RetryError {
    /// The last attempt failed and no further attempt will be made.
    #[error("{error}")]
    Failed {
        /// The last classified error.
        error: ClassifiedError,
        /// Attempts made, including the failing one.
        attempts: u32,
        /// True when the error was retryable but attempts ran out.
        exhausted: bool,
    },

    /// Cancelled before the next attempt could start.
    #[error("Retry cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// Attempts made before cancellation.
        attempts: u32,
        /// The error of the last attempt, if any attempt ran.
        last_error: Option<ClassifiedError>,
    },
}

impl RetryError {
    /// The kind of the last failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failed { error, .. } => Some(error.kind),
            Self::Cancelled { last_error, .. } => last_error.as_ref().map(|e| e.kind),
        }
    }

    /// Attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Failed { attempts, .. } | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// Check if attempts ran out on a retryable error.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Failed { exhausted: true, .. })
    }
}

/// Result type for retry operations.
pub type RetryResult<T> = Result<T, RetryError>;
