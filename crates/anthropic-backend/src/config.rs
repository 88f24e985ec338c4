//! Configuration for AnthropicBackend.

use std::env;
use thiserror::Error;

/// Default `anthropic-version` header value.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingApiKey(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// Configuration for AnthropicBackend.
#[derive(Debug, Clone)]
pub struct AnthropicBackendConfig {
    /// Base API URL.
    pub api_url: String,

    /// API key sent as `x-api-key`.
    pub api_key: String,

    /// Value of the `anthropic-version` header.
    pub api_version: String,

    /// Maximum tokens for the response.
    pub max_tokens: u32,

    /// The 0-10 temperature is divided by this before sending.
    pub temperature_divisor: f32,

    /// Whether system messages are lifted into the `system` field. When
    /// false they are folded into the first user turn instead.
    pub supports_system_role: bool,
}

impl Default for AnthropicBackendConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com".to_string(),
            api_key: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            max_tokens: 2048,
            temperature_divisor: 10.0,
            supports_system_role: true,
        }
    }
}

impl AnthropicBackendConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ANTHROPIC_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `ANTHROPIC_API_URL` - API URL (default: https://api.anthropic.com)
    /// - `ANTHROPIC_MAX_TOKENS` - Max tokens (default: 2048)
    /// - `ANTHROPIC_TEMPERATURE_DIVISOR` - Temperature divisor (default: 10)
    /// - `ANTHROPIC_SYSTEM_ROLE` - Whether system messages are accepted (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey("ANTHROPIC_API_KEY".to_string()))?;

        let defaults = Self::default();

        let api_url = env::var("ANTHROPIC_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let max_tokens = env::var("ANTHROPIC_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_tokens);

        let temperature_divisor = env::var("ANTHROPIC_TEMPERATURE_DIVISOR")
            .ok()
            .and_then(|s| s.parse::<f32>().ok())
            .filter(|d| *d > 0.0)
            .unwrap_or(defaults.temperature_divisor);

        let supports_system_role = env::var("ANTHROPIC_SYSTEM_ROLE")
            .map(|s| !matches!(s.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(defaults.supports_system_role);

        Ok(Self {
            api_url,
            api_key,
            api_version: defaults.api_version,
            max_tokens,
            temperature_divisor,
            supports_system_role,
        })
    }

    /// Create a builder for custom configuration.
    pub fn builder() -> AnthropicBackendConfigBuilder {
        AnthropicBackendConfigBuilder::default()
    }
}

/// Builder for AnthropicBackendConfig.
#[derive(Debug, Clone, Default)]
pub struct AnthropicBackendConfigBuilder {
    config: AnthropicBackendConfig,
}

impl AnthropicBackendConfigBuilder {
    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the `anthropic-version` header.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = tokens;
        self
    }

    /// Set the temperature divisor.
    pub fn temperature_divisor(mut self, divisor: f32) -> Self {
        self.config.temperature_divisor = divisor;
        self
    }

    /// Set system-role support.
    pub fn supports_system_role(mut self, supported: bool) -> Self {
        self.config.supports_system_role = supported;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AnthropicBackendConfig {
        self.config
    }
}
