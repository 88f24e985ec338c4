//! Backends that never succeed.

use chat_core::{async_trait, Message, ProviderBackend, ProviderError, Temperature};

/// A backend that always fails with the configured error.
#[derive(Debug, Clone)]
pub struct FailingBackend {
    error: ProviderError,
}

impl FailingBackend {
    /// Create a backend failing with `error`.
    pub fn new(error: ProviderError) -> Self {
        Self { error }
    }

    /// Fail with a 429-style rate limit.
    pub fn rate_limited() -> Self {
        Self::new(ProviderError::RateLimited("quota exceeded".to_string()))
    }

    /// Fail as if the provider were unreachable.
    pub fn unreachable() -> Self {
        Self::new(ProviderError::Transport("connection refused".to_string()))
    }
}

#[async_trait]
impl ProviderBackend for FailingBackend {
    async fn complete(
        &self,
        _messages: &[Message],
        _model_id: &str,
        _temperature: Temperature,
    ) -> Result<String, ProviderError> {
        Err(self.error.clone())
    }

    fn name(&self) -> &str {
        "FailingBackend"
    }
}

/// A backend that panics while completing.
#[derive(Debug, Clone, Default)]
pub struct PanickingBackend;

#[async_trait]
impl ProviderBackend for PanickingBackend {
    async fn complete(
        &self,
        _messages: &[Message],
        _model_id: &str,
        _temperature: Temperature,
    ) -> Result<String, ProviderError> {
        panic!("PanickingBackend always panics")
    }

    fn name(&self) -> &str {
        "PanickingBackend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_backend_returns_error() {
        let backend = FailingBackend::rate_limited();
        let err = backend
            .complete(&[Message::user("hi")], "m", Temperature::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_unreachable() {
        let backend = FailingBackend::unreachable();
        let err = backend
            .complete(&[Message::user("hi")], "m", Temperature::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API Connection Error: connection refused");
    }
}
