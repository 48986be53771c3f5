//! Core image model trait and types.
//!
//! This module defines the `ImageModel` trait: one request carrying a source
//! image and an instruction, one response carrying a list of parts.

use async_trait::async_trait;
use idphoto_core::EncodedImage;

use crate::error::ModelError;

/// One part of a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    /// Text the model returned alongside (or instead of) an image.
    Text(String),
    /// An encoded image.
    Image(EncodedImage),
}

/// A successful model response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageResponse {
    /// Response parts in provider order.
    pub parts: Vec<ResponsePart>,
    /// Provider finish reason, if reported.
    pub finish_reason: Option<String>,
}

impl ImageResponse {
    /// Create a response from parts.
    #[must_use]
    pub fn new(parts: Vec<ResponsePart>) -> Self {
        Self {
            parts,
            finish_reason: None,
        }
    }

    /// A response holding a single image.
    #[must_use]
    pub fn image(image: EncodedImage) -> Self {
        Self::new(vec![ResponsePart::Image(image)])
    }

    /// A response holding only text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![ResponsePart::Text(text.into())])
    }

    /// Set the finish reason.
    #[must_use]
    pub fn with_finish_reason(mut self, reason: impl Into<String>) -> Self {
        self.finish_reason = Some(reason.into());
        self
    }

    /// The first image part, if any.
    #[must_use]
    pub fn first_image(&self) -> Option<&EncodedImage> {
        self.parts.iter().find_map(|part| match part {
            ResponsePart::Image(image) if !image.data.is_empty() => Some(image),
            _ => None,
        })
    }

    /// All text parts joined with newlines.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ResponsePart::Text(text) => Some(text.as_str()),
                ResponsePart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert into the first image, or explain why there is none.
    pub fn into_image(self) -> Result<EncodedImage, ModelError> {
        if let Some(image) = self.first_image() {
            return Ok(image.clone());
        }

        let text = self.text_content();
        let mut reason = match self.finish_reason.as_deref() {
            Some(finish) => format!("finish reason {finish}"),
            None => "no image part".to_string(),
        };
        if !text.is_empty() {
            reason.push_str(": ");
            reason.push_str(&text);
        }
        Err(ModelError::no_image(reason))
    }
}

/// Core image model trait.
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Get the model name.
    fn name(&self) -> &str;

    /// Get the model system/provider (gemini, mock, ...).
    fn system(&self) -> &str;

    /// Get the full model identifier.
    fn identifier(&self) -> String {
        format!("{}:{}", self.system(), self.name())
    }

    /// Check that credentials are present and well-formed without any
    /// network activity.
    fn check_credentials(&self) -> Result<(), ModelError> {
        Ok(())
    }

    /// Edit `image` according to `instructions`.
    async fn edit_image(
        &self,
        image: &EncodedImage,
        instructions: &str,
    ) -> Result<ImageResponse, ModelError>;
}

#[async_trait]
impl<M: ImageModel + ?Sized> ImageModel for std::sync::Arc<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn system(&self) -> &str {
        (**self).system()
    }

    fn check_credentials(&self) -> Result<(), ModelError> {
        (**self).check_credentials()
    }

    async fn edit_image(
        &self,
        image: &EncodedImage,
        instructions: &str,
    ) -> Result<ImageResponse, ModelError> {
        (**self).edit_image(image, instructions).await
    }
}
