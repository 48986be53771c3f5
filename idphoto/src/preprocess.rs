//! Image preprocessing.
//!
//! Bounds the source photo before it is sent. Preprocessing is best-effort:
//! any decode or encode failure logs a warning and returns the input as is.

use idphoto_core::{EncodedImage, JPEG_MEDIA_TYPE};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use thiserror::Error;
use tracing::{debug, warn};

/// Quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Error)]
enum PreprocessError {
    #[error(transparent)]
    Data(#[from] idphoto_core::ImageDataError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Size-bounds images with a fixed maximum edge and JPEG quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocessor {
    max_dimension: u32,
    jpeg_quality: u8,
}

impl Preprocessor {
    /// Create a preprocessor.
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Set the re-encode quality (1..=100).
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Longest allowed edge.
    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Bound `image`. See [`prepare`].
    pub fn prepare(&self, image: &EncodedImage) -> EncodedImage {
        match self.try_prepare(image) {
            Ok(Some(resized)) => resized,
            Ok(None) => image.clone(),
            Err(e) => {
                warn!(
                    error = %e,
                    media_type = %image.media_type,
                    "Image preprocessing failed, sending original"
                );
                image.clone()
            }
        }
    }

    /// `Ok(None)` means the image is already within bounds.
    fn try_prepare(&self, image: &EncodedImage) -> Result<Option<EncodedImage>, PreprocessError> {
        let bytes = image.decode()?;
        let decoded = image::load_from_memory(&bytes)?;
        let (width, height) = decoded.dimensions();

        if width <= self.max_dimension && height <= self.max_dimension {
            debug!(width, height, "Image within bounds");
            return Ok(None);
        }

        let resized = decoded
            .resize(self.max_dimension, self.max_dimension, FilterType::Lanczos3)
            .to_rgb8();
        debug!(
            width,
            height,
            new_width = resized.width(),
            new_height = resized.height(),
            "Downscaled image"
        );

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.jpeg_quality)
            .encode_image(&resized)?;

        Ok(Some(EncodedImage::from_bytes(&out, JPEG_MEDIA_TYPE)))
    }
}

/// Scale `image` down so its longer edge equals `max_dimension`, re-encoding
/// as JPEG. Images within bounds, and images that fail to decode, are
/// returned unchanged.
pub fn prepare(image: &EncodedImage, max_dimension: u32) -> EncodedImage {
    Preprocessor::new(max_dimension).prepare(image)
}
