//! Configuration for OpenAiBackend.

use std::env;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The credential environment variable is unset or empty.
    #[error("{0} environment variable not set")]
    MissingApiKey(String),

    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// The vendors speaking the OpenAI chat completions protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    OpenAi,
    Perplexity,
}

impl Vendor {
    /// Environment variable prefix for this vendor.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Vendor::OpenAi => "OPENAI",
            Vendor::Perplexity => "PERPLEXITY",
        }
    }

    /// Name reported by the backend.
    pub fn display_name(&self) -> &'static str {
        match self {
            Vendor::OpenAi => "OpenAI",
            Vendor::Perplexity => "Perplexity",
        }
    }

    fn default_api_url(&self) -> &'static str {
        match self {
            Vendor::OpenAi => "https://api.openai.com",
            Vendor::Perplexity => "https://api.perplexity.ai",
        }
    }

    fn default_completions_path(&self) -> &'static str {
        match self {
            Vendor::OpenAi => "/v1/chat/completions",
            Vendor::Perplexity => "/chat/completions",
        }
    }
}

/// Configuration for OpenAiBackend.
#[derive(Debug, Clone)]
pub struct OpenAiBackendConfig {
    /// Name reported by the backend.
    pub name: String,

    /// Base API URL.
    pub api_url: String,

    /// Path of the chat completions endpoint, appended to `api_url`.
    pub completions_path: String,

    /// API key for bearer authentication.
    pub api_key: String,

    /// Maximum tokens for the response (vendor default when unset).
    pub max_tokens: Option<u32>,

    /// The 0-10 temperature is divided by this before sending.
    pub temperature_divisor: f32,

    /// Whether the endpoint accepts `system` messages.
    pub supports_system_role: bool,
}

impl Default for OpenAiBackendConfig {
    fn default() -> Self {
        Self::preset(Vendor::OpenAi)
    }
}

impl OpenAiBackendConfig {
    /// Defaults for a vendor, without an API key.
    pub fn preset(vendor: Vendor) -> Self {
        Self {
            name: vendor.display_name().to_string(),
            api_url: vendor.default_api_url().to_string(),
            completions_path: vendor.default_completions_path().to_string(),
            api_key: String::new(),
            max_tokens: None,
            temperature_divisor: 5.0,
            supports_system_role: true,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// With `PREFIX` being `OPENAI` or `PERPLEXITY`:
    ///
    /// Required environment variables:
    /// - `PREFIX_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `PREFIX_API_URL` - API URL (default: vendor endpoint)
    /// - `PREFIX_MAX_TOKENS` - Max tokens (default: unset)
    /// - `PREFIX_TEMPERATURE_DIVISOR` - Temperature divisor (default: 5)
    /// - `PREFIX_SYSTEM_ROLE` - Whether system messages are accepted (default: true)
    pub fn from_env(vendor: Vendor) -> Result<Self, ConfigError> {
        let prefix = vendor.env_prefix();
        let key_var = format!("{}_API_KEY", prefix);

        let api_key = env::var(&key_var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(key_var.clone()))?;

        let mut config = Self::preset(vendor);
        config.api_key = api_key;

        if let Ok(url) = env::var(format!("{}_API_URL", prefix)) {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(max_tokens) = env::var(format!("{}_MAX_TOKENS", prefix))
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.max_tokens = Some(max_tokens);
        }
        if let Some(divisor) = env::var(format!("{}_TEMPERATURE_DIVISOR", prefix))
            .ok()
            .and_then(|s| s.parse::<f32>().ok())
            .filter(|d| *d > 0.0)
        {
            config.temperature_divisor = divisor;
        }
        if let Ok(flag) = env::var(format!("{}_SYSTEM_ROLE", prefix)) {
            config.supports_system_role = parse_flag(&flag, true);
        }

        Ok(config)
    }

    /// Create a builder for custom configuration.
    pub fn builder(vendor: Vendor) -> OpenAiBackendConfigBuilder {
        OpenAiBackendConfigBuilder::new(vendor)
    }

    /// Full URL of the chat completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.api_url, self.completions_path)
    }
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Builder for OpenAiBackendConfig.
#[derive(Debug, Clone)]
pub struct OpenAiBackendConfigBuilder {
    config: OpenAiBackendConfig,
}

impl OpenAiBackendConfigBuilder {
    /// Create a new builder from the vendor preset.
    pub fn new(vendor: Vendor) -> Self {
        Self {
            config: OpenAiBackendConfig::preset(vendor),
        }
    }

    /// Set the reported name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the completions path.
    pub fn completions_path(mut self, path: impl Into<String>) -> Self {
        self.config.completions_path = path.into();
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
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
    pub fn build(self) -> OpenAiBackendConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "OPENAI_API_KEY",
        "OPENAI_API_URL",
        "OPENAI_MAX_TOKENS",
        "OPENAI_TEMPERATURE_DIVISOR",
        "OPENAI_SYSTEM_ROLE",
        "PERPLEXITY_API_KEY",
        "PERPLEXITY_API_URL",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = OpenAiBackendConfig::default();
        assert_eq!(config.name, "OpenAI");
        assert_eq!(config.endpoint(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(config.temperature_divisor, 5.0);
        assert!(config.supports_system_role);
        assert!(config.max_tokens.is_none());
    }

    #[test]
    fn test_perplexity_preset() {
        let config = OpenAiBackendConfig::preset(Vendor::Perplexity);
        assert_eq!(config.name, "Perplexity");
        assert_eq!(config.endpoint(), "https://api.perplexity.ai/chat/completions");
        assert_eq!(config.temperature_divisor, 5.0);
    }

    #[test]
    fn test_builder() {
        let config = OpenAiBackendConfig::builder(Vendor::OpenAi)
            .api_key("test-key")
            .api_url("http://localhost:8080")
            .max_tokens(512)
            .temperature_divisor(10.0)
            .supports_system_role(false)
            .build();

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(config.max_tokens, Some(512));
        assert_eq!(config.temperature_divisor, 10.0);
        assert!(!config.supports_system_role);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE", false));
        assert!(!parse_flag("off", true));
        assert!(parse_flag("maybe", true));
    }

    #[test]
    fn test_from_env_scenarios() {
        let _guard = ENV_LOCK.lock().unwrap();

        clear_env();
        let err = OpenAiBackendConfig::from_env(Vendor::OpenAi).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey(ref var) if var == "OPENAI_API_KEY"));

        env::set_var("OPENAI_API_KEY", "   ");
        assert!(OpenAiBackendConfig::from_env(Vendor::OpenAi).is_err());

        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("OPENAI_API_URL", "http://proxy.local/");
        env::set_var("OPENAI_MAX_TOKENS", "256");
        env::set_var("OPENAI_TEMPERATURE_DIVISOR", "not-a-number");
        env::set_var("OPENAI_SYSTEM_ROLE", "false");
        let config = OpenAiBackendConfig::from_env(Vendor::OpenAi).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.api_url, "http://proxy.local");
        assert_eq!(config.max_tokens, Some(256));
        assert_eq!(config.temperature_divisor, 5.0);
        assert!(!config.supports_system_role);

        env::set_var("PERPLEXITY_API_KEY", "pplx-test");
        let config = OpenAiBackendConfig::from_env(Vendor::Perplexity).unwrap();
        assert_eq!(config.api_key, "pplx-test");
        assert_eq!(config.endpoint(), "https://api.perplexity.ai/chat/completions");

        clear_env();
    }
}
