//! Mock image model for testing.
//!
//! [`MockImageModel`] replays a queue of scripted outcomes, one per call, and
//! records every request it receives.
//!
//! ```rust
//! use idphoto_core::EncodedImage;
//! use idphoto_models::{MockImageModel, ModelError};
//!
//! let model = MockImageModel::new("test")
//!     .with_error(ModelError::http(429, "Resource has been exhausted"))
//!     .with_image(EncodedImage::new("AAAA", "image/png"));
//! ```

use crate::credential::ApiKey;
use crate::error::ModelError;
use crate::model::{ImageModel, ImageResponse};
use async_trait::async_trait;
use idphoto_core::EncodedImage;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// A request recorded by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// The image that was sent.
    pub image: EncodedImage,
    /// The instruction text that was sent.
    pub instructions: String,
}

/// A mock model with pre-configured outcomes.
///
/// Clones share the same queue and recordings.
#[derive(Debug, Clone)]
pub struct MockImageModel {
    name: String,
    api_key: Option<String>,
    latency: Duration,
    outcomes: Arc<Mutex<VecDeque<Result<ImageResponse, ModelError>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockImageModel {
    /// Create a new mock model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_key: None,
            latency: Duration::ZERO,
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue an outcome.
    pub fn with_outcome(self, outcome: Result<ImageResponse, ModelError>) -> Self {
        self.outcomes.lock().push_back(outcome);
        self
    }

    /// Queue a response.
    pub fn with_response(self, response: ImageResponse) -> Self {
        self.with_outcome(Ok(response))
    }

    /// Queue a single-image response.
    pub fn with_image(self, image: EncodedImage) -> Self {
        self.with_response(ImageResponse::image(image))
    }

    /// Queue a failure.
    pub fn with_error(self, error: ModelError) -> Self {
        self.with_outcome(Err(error))
    }

    /// Queue the same failure `n` times.
    pub fn with_errors(self, n: usize, make: impl Fn() -> ModelError) -> Self {
        (0..n).fold(self, |model, _| model.with_error(make()))
    }

    /// Require this key to pass the credential check.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Simulate network latency on every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Get recorded requests.
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Outcomes not yet consumed.
    pub fn remaining_outcomes(&self) -> usize {
        self.outcomes.lock().len()
    }

    /// The image returned once the queue is empty.
    pub fn default_image() -> EncodedImage {
        EncodedImage::new("bW9jaw==", "image/png")
    }
}

#[async_trait]
impl ImageModel for MockImageModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn system(&self) -> &str {
        "mock"
    }

    fn check_credentials(&self) -> Result<(), ModelError> {
        match &self.api_key {
            Some(key) => ApiKey::parse(key).map(|_| ()),
            None => Ok(()),
        }
    }

    async fn edit_image(
        &self,
        image: &EncodedImage,
        instructions: &str,
    ) -> Result<ImageResponse, ModelError> {
        self.requests.lock().push(RecordedRequest {
            image: image.clone(),
            instructions: instructions.to_string(),
        });

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let next = self.outcomes.lock().pop_front();
        next.unwrap_or_else(|| Ok(ImageResponse::image(Self::default_image())))
    }
}
