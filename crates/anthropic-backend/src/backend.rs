//! AnthropicBackend implementation using the messages API.

use chat_core::{
    async_trait, fold_system_into_user, Message, ProviderBackend, ProviderError, Role,
    Temperature,
};
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{ApiError, MessagesRequest, MessagesResponse, WireMessage};
use crate::config::{AnthropicBackendConfig, ConfigError};

/// A backend that uses Anthropic's messages API.
pub struct AnthropicBackend {
    client: Client,
    config: AnthropicBackendConfig,
}

impl AnthropicBackend {
    /// Create a new AnthropicBackend with the given configuration.
    pub fn new(config: AnthropicBackendConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        info!(
            "Anthropic backend initialized: api_url={}, max_tokens={}",
            config.api_url, config.max_tokens
        );

        Ok(Self { client, config })
    }

    /// Create a backend from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(AnthropicBackendConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &AnthropicBackendConfig {
        &self.config
    }

    fn build_request(
        &self,
        messages: &[Message],
        model_id: &str,
        temperature: Temperature,
    ) -> MessagesRequest {
        let (system, turns) = if self.config.supports_system_role {
            split_system(messages)
        } else {
            (None, fold_system_into_user(messages))
        };

        MessagesRequest {
            model: model_id.to_string(),
            max_tokens: self.config.max_tokens,
            messages: merge_turns(turns),
            system,
            temperature: temperature.scaled(self.config.temperature_divisor),
        }
    }
}

/// Pull system messages out of the conversation.
///
/// A conversation holding nothing but system text is sent as a user turn,
/// since the API requires at least one message.
fn split_system(messages: &[Message]) -> (Option<String>, Vec<Message>) {
    let (system, turns): (Vec<&Message>, Vec<&Message>) =
        messages.iter().partition(|m| m.role == Role::System);

    if turns.is_empty() {
        return (None, fold_system_into_user(messages));
    }

    let system = if system.is_empty() {
        None
    } else {
        Some(
            system
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    };

    (system, turns.into_iter().cloned().collect())
}

/// The API rejects consecutive turns with the same role; join them.
fn merge_turns(messages: Vec<Message>) -> Vec<WireMessage> {
    let mut merged: Vec<WireMessage> = Vec::with_capacity(messages.len());
    for message in messages {
        let role = match message.role {
            Role::Assistant => "assistant",
            _ => "user",
        };
        match merged.last_mut() {
            Some(last) if last.role == role => {
                last.content.push('\n');
                last.content.push_str(&message.content);
            }
            _ => merged.push(WireMessage {
                role: role.to_string(),
                content: message.content,
            }),
        }
    }
    merged
}

fn parse_error(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|api_error| api_error.error.message)
        .unwrap_or_else(|_| body.to_string());
    ProviderError::from_status(status, message)
}

fn send_error(err: reqwest::Error) -> ProviderError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        ProviderError::Transport(err.to_string())
    } else {
        ProviderError::Unexpected(err.to_string())
    }
}

/// Concatenate the text blocks of a response.
fn extract_text(response: MessagesResponse) -> Result<String, ProviderError> {
    let text: Vec<String> = response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.is_empty() {
        return Err(ProviderError::Unexpected("No response content".to_string()));
    }
    Ok(text.join(""))
}

#[async_trait]
impl ProviderBackend for AnthropicBackend {
    async fn complete(
        &self,
        messages: &[Message],
        model_id: &str,
        temperature: Temperature,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.config.api_url);
        let request = self.build_request(messages, model_id, temperature);

        debug!("Sending request to Anthropic API: {:?}", request);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
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

        let reply: MessagesResponse = response.json().await.map_err(|e| {
            ProviderError::Unexpected(format!("Failed to parse response: {}", e))
        })?;

        if let Some(usage) = &reply.usage {
            debug!(
                "Anthropic usage: input={}, output={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        extract_text(reply)
    }

    fn name(&self) -> &str {
        "Anthropic"
    }

    fn supports_system_role(&self) -> bool {
        self.config.supports_system_role
    }
}
