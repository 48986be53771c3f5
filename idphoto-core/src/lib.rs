//! # idphoto-core
//!
//! Core types and failure classification for the idphoto pipeline.
//!
//! - **Images**: [`EncodedImage`], [`GenerationRequest`], [`GenerationResult`]
//! - **Errors**: [`ErrorKind`] and [`ClassifiedError`]
//! - **Classification**: [`classify`] maps a [`RawFailure`] to an [`ErrorKind`]
//!
//! ## Example
//!
//! ```rust
//! use idphoto_core::{classify, ErrorKind, RawFailure};
//!
//! let failure = RawFailure::status(429, "Resource has been exhausted");
//! assert_eq!(classify(&failure), ErrorKind::QuotaExceeded);
//! assert!(classify(&failure).is_transient());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod classify;
pub mod errors;
pub mod image;

pub use classify::{classify, FailureStage, RawFailure};
pub use errors::{ClassifiedError, ErrorKind};
pub use image::{
    EncodedImage, GenerationRequest, GenerationResult, ImageDataError, JPEG_MEDIA_TYPE,
};
