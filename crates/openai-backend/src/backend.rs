//! OpenAiBackend implementation using the chat completions API.

use chat_core::{
    async_trait, fold_system_into_user, Message, ProviderBackend, ProviderError, Temperature,
};
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::{ConfigError, OpenAiBackendConfig, Vendor};

/// A backend for endpoints speaking the OpenAI chat completions protocol.
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiBackendConfig,
}

impl OpenAiBackend {
    /// Create a new OpenAiBackend with the given configuration.
    pub fn new(config: OpenAiBackendConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        info!(
            "{} backend initialized: endpoint={}, system_role={}",
            config.name,
            config.endpoint(),
            config.supports_system_role
        );

        Ok(Self { client, config })
    }

    /// Create a backend from environment variables.
    ///
    /// See [`OpenAiBackendConfig::from_env`] for the variables read.
    pub fn from_env(vendor: Vendor) -> Result<Self, ConfigError> {
        Self::new(OpenAiBackendConfig::from_env(vendor)?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenAiBackendConfig {
        &self.config
    }

    /// Build the request body for a conversation.
    fn build_request(
        &self,
        messages: &[Message],
        model_id: &str,
        temperature: Temperature,
    ) -> ChatCompletionRequest {
        let messages = if self.config.supports_system_role {
            messages.to_vec()
        } else {
            fold_system_into_user(messages)
        };

        ChatCompletionRequest {
            model: model_id.to_string(),
            messages: messages
                .into_iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content,
                })
                .collect(),
            max_tokens: self.config.max_tokens,
            temperature: temperature.scaled(self.config.temperature_divisor),
        }
    }
}

/// Classify a non-2xx response body.
fn parse_error(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|api_error| api_error.error.message)
        .unwrap_or_else(|_| body.to_string());
    ProviderError::from_status(status, message)
}

/// Classify a failure to reach the endpoint.
fn send_error(err: reqwest::Error) -> ProviderError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        ProviderError::Transport(err.to_string())
    } else {
        ProviderError::Unexpected(err.to_string())
    }
}

/// Extract the reply text from a completion.
fn extract_text(completion: ChatCompletionResponse) -> Result<String, ProviderError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::Unexpected("No response content".to_string()))
}

#[async_trait]
impl ProviderBackend for OpenAiBackend {
    async fn complete(
        &self,
        messages: &[Message],
        model_id: &str,
        temperature: Temperature,
    ) -> Result<String, ProviderError> {
        let request = self.build_request(messages, model_id, temperature);

        debug!("Sending request to {}: {:?}", self.config.name, request);

        let response = self
            .client
            .post(self.config.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &error_text));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ProviderError::Unexpected(format!("Failed to parse response: {}", e))
        })?;

        if let Some(usage) = &completion.usage {
            debug!(
                "{} usage: prompt={}, completion={}, total={}",
                self.config.name, usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        extract_text(completion)
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn supports_system_role(&self) -> bool {
        self.config.supports_system_role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(system_role: bool) -> OpenAiBackend {
        let config = OpenAiBackendConfig::builder(Vendor::OpenAi)
            .api_key("test-key")
            .max_tokens(100)
            .supports_system_role(system_role)
            .build();
        OpenAiBackend::new(config).unwrap()
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(backend(true).name(), "OpenAI");
        let perplexity = OpenAiBackend::new(
            OpenAiBackendConfig::builder(Vendor::Perplexity)
                .api_key("k")
                .build(),
        )
        .unwrap();
        assert_eq!(perplexity.name(), "Perplexity");
    }

    #[test]
    fn test_build_request_scales_temperature() {
        let request = backend(true).build_request(
            &[Message::system("be brief"), Message::user("hi")],
            "gpt-4o",
            Temperature::new(10),
        );

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.temperature, 2.0);
        assert_eq!(request.max_tokens, Some(100));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].content, "hi");
    }

    #[test]
    fn test_build_request_folds_system_when_unsupported() {
        let request = backend(false).build_request(
            &[Message::system("be brief"), Message::user("hi")],
            "o1-mini",
            Temperature::default(),
        );

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
        assert!(request.messages[0].content.contains("be brief"));
        assert!(request.messages[0].content.contains("hi"));
    }

    #[test]
    fn test_request_serialization_skips_missing_max_tokens() {
        let backend = OpenAiBackend::new(
            OpenAiBackendConfig::builder(Vendor::OpenAi)
                .api_key("k")
                .build(),
        )
        .unwrap();
        let request = backend.build_request(&[Message::user("x")], "m", Temperature::new(5));
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["temperature"], 1.0);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_parse_error_uses_api_message() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota"}}"#;
        let err = parse_error(429, body);
        assert_eq!(
            err,
            ProviderError::RateLimited("You exceeded your current quota".to_string())
        );

        let err = parse_error(500, "upstream exploded");
        assert_eq!(
            err,
            ProviderError::RemoteStatus {
                code: 500,
                message: "upstream exploded".to_string()
            }
        );
    }

    #[test]
    fn test_extract_text() {
        let completion: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Hello there"}}],
                "usage":{"prompt_tokens":3,"completion_tokens":2,"total_tokens":5}}"#,
        )
        .unwrap();
        assert_eq!(extract_text(completion).unwrap(), "Hello there");

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_text(empty),
            Err(ProviderError::Unexpected(_))
        ));
    }
}
