//! Caller-facing generation errors.

use idphoto_core::{ClassifiedError, ErrorKind};
use idphoto_retries::RetryError;
use thiserror::Error;

/// Why a generation produced no image.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The pipeline ran and ended on a terminal failure.
    #[error("{error}")]
    Failed {
        /// The last classified failure.
        error: ClassifiedError,
        /// Remote calls made, including the failing one. Zero for pre-flight
        /// credential failures.
        attempts: u32,
        /// True when a retryable failure ran out of attempts.
        exhausted: bool,
    },

    /// Rejected before any remote call because the session is cooling down.
    #[error("Too many requests. Please wait {remaining_seconds} seconds before trying again.")]
    CoolingDown {
        /// Seconds left until requests are accepted again.
        remaining_seconds: u64,
    },

    /// The caller cancelled the generation.
    #[error("Generation was cancelled. Start a new request when ready.")]
    Cancelled {
        /// Remote calls made before cancellation.
        attempts: u32,
    },
}

impl GenerationError {
    /// Wrap a failure that happened before any remote call.
    pub fn preflight(error: ClassifiedError) -> Self {
        Self::Failed {
            error,
            attempts: 0,
            exhausted: false,
        }
    }

    /// The error kind, if the failure has one.
    ///
    /// A cooldown rejection reports `QuotaExceeded`; cancellation reports none.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failed { error, .. } => Some(error.kind),
            Self::CoolingDown { .. } => Some(ErrorKind::QuotaExceeded),
            Self::Cancelled { .. } => None,
        }
    }

    /// The classified failure, when the pipeline ran.
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Remote calls made.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Failed { attempts, .. } | Self::Cancelled { attempts } => *attempts,
            Self::CoolingDown { .. } => 0,
        }
    }

    /// Whether this failure should start the cooldown.
    ///
    /// Only a quota failure that survived every retry qualifies.
    pub fn triggers_cooldown(&self) -> bool {
        matches!(
            self,
            Self::Failed {
                error: ClassifiedError {
                    kind: ErrorKind::QuotaExceeded,
                    ..
                },
                exhausted: true,
                ..
            }
        )
    }

    /// The message shown to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<RetryError> for GenerationError {
    fn from(err: RetryError) -> Self {
        match err {
            RetryError::Failed {
                error,
                attempts,
                exhausted,
            } => Self::Failed {
                error,
                attempts,
                exhausted,
            },
            RetryError::Cancelled { attempts, .. } => Self::Cancelled { attempts },
        }
    }
}
