//! Echo backend implementation - echoes the last user message back.

use async_trait::async_trait;
use chat_core::{Message, ProviderBackend, ProviderError, Role, Temperature};
use std::sync::Mutex;

/// A simple backend that echoes the last user message.
///
/// Useful for testing the dispatch flow without any network access. It also
/// records the last conversation it received so tests can inspect what the
/// dispatcher decoded.
#[derive(Debug)]
pub struct EchoBackend {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
    /// Reported system-role capability.
    system_role: bool,
    last_call: Mutex<Option<(Vec<Message>, String, Temperature)>>,
}

impl EchoBackend {
    /// Create a new EchoBackend with no prefix that accepts system messages.
    pub fn new() -> Self {
        Self {
            prefix: None,
            system_role: true,
            last_call: Mutex::new(None),
        }
    }

    /// Create a new EchoBackend with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_backend::EchoBackend;
    ///
    /// let backend = EchoBackend::with_prefix("Echo: ");
    /// // Will respond with "Echo: <last user message>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::new()
        }
    }

    /// Report no system-role support.
    pub fn without_system_role(mut self) -> Self {
        self.system_role = false;
        self
    }

    /// The conversation, model id and temperature of the most recent call.
    pub fn last_call(&self) -> Option<(Vec<Message>, String, Temperature)> {
        self.last_call.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Default for EchoBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderBackend for EchoBackend {
    async fn complete(
        &self,
        messages: &[Message],
        model_id: &str,
        temperature: Temperature,
    ) -> Result<String, ProviderError> {
        if let Ok(mut guard) = self.last_call.lock() {
            *guard = Some((messages.to_vec(), model_id.to_string(), temperature));
        }

        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        Ok(match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, last_user),
            None => last_user.to_string(),
        })
    }

    fn name(&self) -> &str {
        "EchoBackend"
    }

    fn supports_system_role(&self) -> bool {
        self.system_role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_no_prefix() {
        let backend = EchoBackend::new();
        let messages = vec![Message::user("Hello!")];

        let response = backend
            .complete(&messages, "echo-1", Temperature::new(3))
            .await
            .unwrap();
        assert_eq!(response, "Hello!");
    }

    #[tokio::test]
    async fn test_echo_with_prefix() {
        let backend = EchoBackend::with_prefix("Echo: ");
        let messages = vec![Message::user("Hello!")];

        let response = backend
            .complete(&messages, "echo-1", Temperature::default())
            .await
            .unwrap();
        assert_eq!(response, "Echo: Hello!");
    }

    #[tokio::test]
    async fn test_echo_picks_last_user_turn() {
        let backend = EchoBackend::new();
        let messages = vec![
            Message::user("first"),
            Message::assistant("reply"),
            Message::user("second"),
        ];

        let response = backend
            .complete(&messages, "echo-1", Temperature::default())
            .await
            .unwrap();
        assert_eq!(response, "second");
    }

    #[tokio::test]
    async fn test_records_last_call() {
        let backend = EchoBackend::new();
        let messages = vec![Message::user("hi")];
        backend
            .complete(&messages, "model-x", Temperature::new(8))
            .await
            .unwrap();

        let (seen, model, temperature) = backend.last_call().unwrap();
        assert_eq!(seen, messages);
        assert_eq!(model, "model-x");
        assert_eq!(temperature.value(), 8);
    }

    #[test]
    fn test_backend_name_and_capability() {
        let backend = EchoBackend::new();
        assert_eq!(backend.name(), "EchoBackend");
        assert!(backend.supports_system_role());
        assert!(!EchoBackend::new().without_system_role().supports_system_role());
    }
}
