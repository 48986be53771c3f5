//! Generation configuration.
//!
//! [`GenerationConfig`] gathers every tunable of the pipeline: the
//! preprocessing bound, the retry policy and the cooldown period. Values come
//! from defaults, a JSON file, or `IDPHOTO_*` environment variables.

use idphoto_retries::RetryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Instruction sent with every photo unless the caller overrides it.
pub const DEFAULT_INSTRUCTIONS: &str = "Turn this photo into a professional passport photo. \
Keep the person's identity, facial features and expression unchanged. \
Center the head and shoulders facing the camera, replace the background with a plain \
light grey or off-white backdrop, use even lighting without harsh shadows, and make the \
clothing look neat and formal. Output a single photorealistic image.";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held an unparseable value.
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// The offending value.
        value: String,
    },

    /// A field is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The config file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Longest allowed image edge, in pixels, before the request is sent.
    pub max_dimension: u32,
    /// JPEG quality used when the preprocessor re-encodes.
    pub jpeg_quality: u8,
    /// Retry policy.
    pub retry: RetryConfig,
    /// Length of the cooldown after an exhausted quota failure, in seconds.
    pub cooldown_seconds: u64,
    /// Instruction text sent with the photo.
    pub instructions: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
            jpeg_quality: 90,
            retry: RetryConfig::default(),
            cooldown_seconds: 60,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}

impl GenerationConfig {
    /// Create a default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `IDPHOTO_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().overlay_env(|name| std::env::var(name).ok())
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values looked up by variable name.
    pub fn overlay_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "IDPHOTO_MAX_DIMENSION")? {
            self.max_dimension = v;
        }
        if let Some(v) = parse_var(&lookup, "IDPHOTO_JPEG_QUALITY")? {
            self.jpeg_quality = v;
        }
        if let Some(v) = parse_var(&lookup, "IDPHOTO_MAX_ATTEMPTS")? {
            self.retry.max_attempts = v;
        }
        if let Some(v) = parse_var(&lookup, "IDPHOTO_BASE_BACKOFF_MS")? {
            self.retry.base_backoff_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "IDPHOTO_JITTER_WINDOW_MS")? {
            self.retry.jitter_window_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "IDPHOTO_RETRY_TRANSPORT")? {
            self.retry.retry_transport_errors = v;
        }
        if let Some(v) = parse_var(&lookup, "IDPHOTO_COOLDOWN_SECONDS")? {
            self.cooldown_seconds = v;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dimension == 0 {
            return Err(ConfigError::Invalid("max_dimension must be positive".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }

    /// Set the preprocessing bound.
    #[must_use]
    pub fn with_max_dimension(mut self, pixels: u32) -> Self {
        self.max_dimension = pixels;
        self
    }

    /// Set the re-encode quality.
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the cooldown period.
    #[must_use]
    pub fn with_cooldown(mut self, period: Duration) -> Self {
        self.cooldown_seconds = period.as_secs();
        self
    }

    /// Set the instruction text.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Cooldown period as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnv { name, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.max_dimension, 1024);
        assert_eq!(config.jpeg_quality, 90);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_backoff_ms, 2000);
        assert_eq!(config.retry.jitter_window_ms, 1000);
        assert_eq!(config.cooldown(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overlay() {
        let config = GenerationConfig::default()
            .overlay_env(env(&[
                ("IDPHOTO_MAX_DIMENSION", "512"),
                ("IDPHOTO_MAX_ATTEMPTS", " 5 "),
                ("IDPHOTO_RETRY_TRANSPORT", "true"),
                ("IDPHOTO_COOLDOWN_SECONDS", "30"),
                ("IDPHOTO_JITTER_WINDOW_MS", ""),
            ]))
            .unwrap();
        assert_eq!(config.max_dimension, 512);
        assert_eq!(config.retry.max_attempts, 5);
        assert!(config.retry.retry_transport_errors);
        assert_eq!(config.cooldown_seconds, 30);
        assert_eq!(config.retry.jitter_window_ms, 1000);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let err = GenerationConfig::default()
            .overlay_env(env(&[("IDPHOTO_BASE_BACKOFF_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                name: "IDPHOTO_BASE_BACKOFF_MS",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_ranges() {
        assert!(GenerationConfig::default()
            .with_max_dimension(0)
            .validate()
            .is_err());
        assert!(GenerationConfig::default()
            .with_jpeg_quality(0)
            .validate()
            .is_err());
        assert!(GenerationConfig::default()
            .with_retry(RetryConfig::new().max_attempts(0))
            .validate()
            .is_err());
        assert!(GenerationConfig::default()
            .overlay_env(env(&[("IDPHOTO_JPEG_QUALITY", "101")]))
            .is_err());
    }

    #[test]
    fn test_json_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"max_dimension": 768, "retry": {{"max_attempts": 4}}, "instructions": "Blue background"}}"#
        )
        .unwrap();

        let config = GenerationConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max_dimension, 768);
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.base_backoff_ms, 2000);
        assert_eq!(config.instructions, "Blue background");
        assert_eq!(config.cooldown_seconds, 60);
    }

    #[test]
    fn test_json_file_missing() {
        let err = GenerationConfig::from_json_file("/nonexistent/idphoto.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
