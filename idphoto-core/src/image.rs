//! Image payloads, generation requests and results.
//!
//! Images travel through the pipeline as base64 text tagged with a media type,
//! which is the shape the generation service consumes and produces.

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Media type used when the preprocessor re-encodes an image.
pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// Errors raised while handling encoded image payloads.
#[derive(Debug, Error)]
pub enum ImageDataError {
    /// The string is not a `data:<type>;base64,<payload>` URL.
    #[error("Not a base64 data URL")]
    NotDataUrl,

    /// The declared media type is not an image type.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The payload is not valid base64.
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// An encoded image: base64 text plus its declared media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    /// Base64 (standard alphabet) image bytes.
    pub data: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
}

impl EncodedImage {
    /// Create from already-encoded base64 text.
    #[must_use]
    pub fn new(data: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.into(),
        }
    }

    /// Encode raw image bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], media_type: impl Into<String>) -> Self {
        Self::new(
            base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type,
        )
    }

    /// Parse a `data:image/...;base64,...` URL.
    pub fn from_data_url(url: &str) -> Result<Self, ImageDataError> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or(ImageDataError::NotDataUrl)?;
        let (header, data) = rest.split_once(',').ok_or(ImageDataError::NotDataUrl)?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or(ImageDataError::NotDataUrl)?;

        let parsed: mime::Mime = media_type
            .parse()
            .map_err(|_| ImageDataError::UnsupportedMediaType(media_type.to_string()))?;
        if parsed.type_() != mime::IMAGE {
            return Err(ImageDataError::UnsupportedMediaType(media_type.to_string()));
        }

        Ok(Self::new(data, parsed.essence_str()))
    }

    /// Decode the base64 payload into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ImageDataError> {
        Ok(base64::engine::general_purpose::STANDARD.decode(self.data.trim())?)
    }

    /// Render as a self-describing data URL.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    /// Length of the base64 payload in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.data.len()
    }
}

/// One user action: a source photo and the editing instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    image: EncodedImage,
    instructions: String,
}

impl GenerationRequest {
    /// Build a request from an image and instruction text.
    #[must_use]
    pub fn new(image: EncodedImage, instructions: impl Into<String>) -> Self {
        Self {
            image,
            instructions: instructions.into(),
        }
    }

    /// The source image.
    #[must_use]
    pub fn image(&self) -> &EncodedImage {
        &self.image
    }

    /// The instruction text sent alongside the image.
    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }
}

/// The generated image, ready for display or download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    image_data_url: String,
}

impl GenerationResult {
    /// Build a result from the image the service returned.
    #[must_use]
    pub fn from_image(image: &EncodedImage) -> Self {
        Self {
            image_data_url: image.to_data_url(),
        }
    }

    /// The generated image as a data URL.
    #[must_use]
    pub fn image_data_url(&self) -> &str {
        &self.image_data_url
    }

    /// Parse the data URL back into an encoded image.
    pub fn to_image(&self) -> Result<EncodedImage, ImageDataError> {
        EncodedImage::from_data_url(&self.image_data_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_bytes_and_decode() {
        let image = EncodedImage::from_bytes(b"\x89PNG", "image/png");
        assert_eq!(image.data, "iVBORw==");
        assert_eq!(image.decode().unwrap(), b"\x89PNG".to_vec());
    }

    #[test]
    fn test_data_url_parse() {
        let image = EncodedImage::from_data_url("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(image.media_type, "image/jpeg");
        assert_eq!(image.data, "/9j/4AAQ");
        assert_eq!(image.to_data_url(), "data:image/jpeg;base64,/9j/4AAQ");
    }

    #[test]
    fn test_data_url_rejects_non_image() {
        let err = EncodedImage::from_data_url("data:text/plain;base64,aGk=").unwrap_err();
        assert!(matches!(err, ImageDataError::UnsupportedMediaType(_)));

        let err = EncodedImage::from_data_url("https://example.com/a.png").unwrap_err();
        assert!(matches!(err, ImageDataError::NotDataUrl));
    }

    #[test]
    fn test_invalid_base64() {
        let image = EncodedImage::new("not base64!!", "image/png");
        assert!(matches!(image.decode(), Err(ImageDataError::Base64(_))));
    }

    #[test]
    fn test_generation_result_round_trip() {
        let image = EncodedImage::new("AAAA", "image/png");
        let result = GenerationResult::from_image(&image);
        assert_eq!(result.image_data_url(), "data:image/png;base64,AAAA");
        assert_eq!(result.to_image().unwrap(), image);
    }
}
