//! Caller-facing session.
//!
//! A [`Session`] pairs a [`Generator`] with the [`CooldownCoordinator`] of one
//! client. It gates every request on the cooldown and starts the cooldown when
//! a quota failure survives all retries.

use crate::config::GenerationConfig;
use crate::cooldown::CooldownCoordinator;
use crate::error::GenerationError;
use crate::orchestrator::Generator;
use idphoto_core::{EncodedImage, GenerationRequest, GenerationResult};
use idphoto_models::ImageModel;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One client's generation session.
#[derive(Debug)]
pub struct Session<M> {
    generator: Generator<M>,
    cooldown: CooldownCoordinator,
    instructions: String,
}

impl<M: ImageModel> Session<M> {
    /// Create a session with a ticking cooldown.
    pub fn new(model: M, config: &GenerationConfig) -> Self {
        Self::with_cooldown(model, config, CooldownCoordinator::new(config.cooldown()))
    }

    /// Create a session with a caller-supplied cooldown coordinator.
    pub fn with_cooldown(
        model: M,
        config: &GenerationConfig,
        cooldown: CooldownCoordinator,
    ) -> Self {
        Self {
            generator: Generator::new(model, config),
            cooldown,
            instructions: config.instructions.clone(),
        }
    }

    /// The generator.
    pub fn generator(&self) -> &Generator<M> {
        &self.generator
    }

    /// The cooldown coordinator.
    pub fn cooldown(&self) -> &CooldownCoordinator {
        &self.cooldown
    }

    /// The configured instruction text.
    pub fn default_instructions(&self) -> &str {
        &self.instructions
    }

    /// Edit a base64 image with `instructions` and return the result as a
    /// data URL.
    pub async fn generate(
        &self,
        image: impl Into<String>,
        media_type: impl Into<String>,
        instructions: &str,
    ) -> Result<String, GenerationError> {
        let request = GenerationRequest::new(EncodedImage::new(image, media_type), instructions);
        let result = self.generate_request(&request).await?;
        Ok(result.image_data_url().to_string())
    }

    /// Edit `image` with the configured instructions.
    pub async fn generate_default(
        &self,
        image: EncodedImage,
    ) -> Result<GenerationResult, GenerationError> {
        let request = GenerationRequest::new(image, self.instructions.as_str());
        self.generate_request(&request).await
    }

    /// Run a prepared request.
    pub async fn generate_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        self.generate_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Run a prepared request that stops retrying once `cancel` fires.
    pub async fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult, GenerationError> {
        if let Err(e) = self.cooldown.check() {
            debug!(
                remaining_seconds = self.cooldown.remaining_seconds(),
                "Request rejected during cooldown"
            );
            return Err(e);
        }

        let outcome = self.generator.generate_with_cancel(request, cancel).await;

        if let Err(e) = &outcome {
            if e.triggers_cooldown() {
                self.cooldown.trigger();
            }
        }
        outcome
    }
}
