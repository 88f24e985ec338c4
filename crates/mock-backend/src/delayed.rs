//! Delayed backend implementation - wraps another backend with artificial delay.

use std::time::Duration;

use chat_core::{async_trait, Message, ProviderBackend, ProviderError, Temperature};
use tokio::time::sleep;

/// A backend that wraps another backend and adds artificial delay.
///
/// Useful for keeping several requests in flight at once and for simulating
/// provider latency.
pub struct DelayedBackend<B: ProviderBackend> {
    inner: B,
    delay: Duration,
}

impl<B: ProviderBackend> DelayedBackend<B> {
    /// Create a new DelayedBackend wrapping the given backend with the specified delay.
    pub fn new(inner: B, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a backend with a delay in milliseconds.
    pub fn with_millis(inner: B, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }
}

#[async_trait]
impl<B: ProviderBackend> ProviderBackend for DelayedBackend<B> {
    async fn complete(
        &self,
        messages: &[Message],
        model_id: &str,
        temperature: Temperature,
    ) -> Result<String, ProviderError> {
        sleep(self.delay).await;
        self.inner.complete(messages, model_id, temperature).await
    }

    fn name(&self) -> &str {
        "DelayedBackend"
    }

    fn supports_system_role(&self) -> bool {
        self.inner.supports_system_role()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EchoBackend;
    use std::time::Instant;

    #[tokio::test]
    async fn test_delayed_backend() {
        let backend = DelayedBackend::with_millis(EchoBackend::new(), 100);
        let messages = vec![Message::user("test")];

        let start = Instant::now();
        let response = backend
            .complete(&messages, "echo-1", Temperature::default())
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(response, "test");
        assert!(elapsed >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_backend_name() {
        let backend = DelayedBackend::with_millis(EchoBackend::new(), 0);
        assert_eq!(backend.name(), "DelayedBackend");
    }
}
