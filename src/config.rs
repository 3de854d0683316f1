//! Configuration for correction requests.
//!
//! Everything the pipeline needs to talk to the correction model lives in
//! [`GradingConfig`], built via its [`GradingConfigBuilder`]. Keeping every
//! knob in one struct makes it trivial to share across the server state and
//! to log the effective settings at startup.

use crate::error::GradeError;
use serde::Serialize;

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "OPENROUTER_KEY";

/// Default chat-completions endpoint base.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1";

/// Default correction model.
pub const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";

/// Configuration for a correction request.
///
/// Built via [`GradingConfig::builder()`], [`GradingConfig::default()`], or
/// [`GradingConfig::from_env()`].
///
/// # Example
/// ```rust
/// use gradesheet::GradingConfig;
///
/// let config = GradingConfig::builder()
///     .model("google/gemini-3-flash-preview")
///     .api_timeout_secs(90)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Serialize)]
pub struct GradingConfig {
    /// Model identifier sent in the request payload.
    pub model: String,

    /// Chat-completions endpoint base URL (without the `/chat/completions`
    /// suffix). Overridable for tests and self-hosted gateways.
    pub endpoint: String,

    /// Bearer credential for the endpoint. `None` fails at request time
    /// with [`GradeError::ApiKeyMissing`], not at startup, so the web UI
    /// can still come up and show the error.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Per-call timeout in seconds. Default: 120.
    ///
    /// Correcting several dense handwritten pages can take the model well
    /// over a minute; 120 s covers that while still bounding a hung call.
    pub api_timeout_secs: u64,

    /// Sampling temperature. `None` leaves the provider default in place.
    pub temperature: Option<f32>,

    /// Completion token cap. `None` leaves the provider default in place.
    pub max_tokens: Option<u32>,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            api_timeout_secs: 120,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl std::fmt::Debug for GradingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradingConfig")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GradingConfig {
    /// Create a new builder for `GradingConfig`.
    pub fn builder() -> GradingConfigBuilder {
        GradingConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults plus the credential from `OPENROUTER_KEY`, if set.
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_VAR).ok().filter(|k| !k.is_empty());
        Self {
            api_key,
            ..Self::default()
        }
    }
}

/// Builder for [`GradingConfig`].
#[derive(Debug)]
pub struct GradingConfigBuilder {
    config: GradingConfig,
}

impl GradingConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GradingConfig, GradeError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(GradeError::InvalidConfig("Model must not be empty".into()));
        }
        if c.endpoint.trim().is_empty() {
            return Err(GradeError::InvalidConfig(
                "Endpoint must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
