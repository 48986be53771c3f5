//! # idphoto
//!
//! Turn a casual photo into a passport-style photo through a generative
//! image-editing service, with bounded retries and a client-side cooldown.
//!
//! ## Pipeline
//!
//! 1. [`preprocess`]: downscale the source so its longer edge fits the
//!    configured bound
//! 2. [`orchestrator`]: call the model, classify failures, back off and retry
//!    quota and overload errors
//! 3. [`cooldown`]: after a quota failure outlives every retry, reject new
//!    requests until the countdown reaches zero
//!
//! [`Session`] ties these together behind one call.
//!
//! ## Example
//!
//! ```rust,ignore
//! use idphoto::{GenerationConfig, Session};
//! use idphoto::models::{ApiKey, GeminiImageModel};
//!
//! let key = ApiKey::from_env(&["GEMINI_API_KEY", "GOOGLE_API_KEY"])?;
//! let model = GeminiImageModel::with_key("gemini-2.5-flash-image", &key);
//! let session = Session::new(model, &GenerationConfig::from_env()?);
//!
//! let data_url = session.generate(photo_base64, "image/jpeg", "Passport photo, white background").await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod cooldown;
pub mod error;
pub mod orchestrator;
pub mod preprocess;
pub mod session;
pub mod telemetry;

// Re-export sub-crates
pub use idphoto_core as core;
pub use idphoto_models as models;
pub use idphoto_retries as retries;

// Re-exports
pub use config::{ConfigError, GenerationConfig, DEFAULT_INSTRUCTIONS};
pub use cooldown::CooldownCoordinator;
pub use error::GenerationError;
pub use orchestrator::{classify_model_error, Generator};
pub use preprocess::{prepare, Preprocessor};
pub use session::Session;

pub use idphoto_core::{
    classify, ClassifiedError, EncodedImage, ErrorKind, GenerationRequest, GenerationResult,
    RawFailure,
};
pub use idphoto_models::{ImageModel, ModelError};
pub use idphoto_retries::RetryConfig;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        EncodedImage, ErrorKind, GenerationConfig, GenerationError, GenerationRequest,
        GenerationResult, Generator, ImageModel, Session,
    };
}
