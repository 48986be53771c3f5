//! # idphoto-models
//!
//! Image model trait and provider implementations for idphoto.
//!
//! This crate provides the [`ImageModel`] trait, the [`ModelError`] type that
//! every provider maps its failures into, and:
//!
//! - **Gemini**: Gemini 2.5 Flash Image and friends (feature: `gemini`)
//! - **Mock**: a scripted model for tests ([`MockImageModel`])
//!
//! ## Feature Flags
//!
//! - `gemini` (default): Google Gemini support
//! - `full`: Enable all providers
//!
//! ## Example
//!
//! ```rust
//! use idphoto_core::{classify, EncodedImage, ErrorKind};
//! use idphoto_models::{ImageModel, MockImageModel, ModelError};
//!
//! # tokio_test::block_on(async {
//! let model = MockImageModel::new("test").with_error(ModelError::http(429, "Too Many Requests"));
//! let input = EncodedImage::new("AAAA", "image/jpeg");
//!
//! let err = model.edit_image(&input, "passport photo").await.unwrap_err();
//! assert_eq!(classify(&err.to_raw_failure()), ErrorKind::QuotaExceeded);
//! # });
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod credential;
pub mod error;
pub mod mock;
pub mod model;

/// Google Gemini models.
#[cfg(feature = "gemini")]
#[cfg_attr(docsrs, doc(cfg(feature = "gemini")))]
pub mod gemini;

// Re-exports
pub use credential::ApiKey;
pub use error::{ModelError, ModelResult};
pub use mock::{MockImageModel, RecordedRequest};
pub use model::{ImageModel, ImageResponse, ResponsePart};

#[cfg(feature = "gemini")]
pub use gemini::GeminiImageModel;
