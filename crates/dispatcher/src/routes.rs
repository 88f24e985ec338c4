//! Model key to backend routing.

use std::fmt;
use std::sync::Arc;

use chat_core::ProviderBackend;
use indexmap::IndexMap;

/// Where a model key is sent.
#[derive(Clone)]
pub struct ModelRoute {
    /// The vendor's model identifier, e.g. `gpt-4o`.
    pub model_id: String,
    /// The backend serving the model.
    pub backend: Arc<dyn ProviderBackend>,
}

impl fmt::Debug for ModelRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRoute")
            .field("model_id", &self.model_id)
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// Ordered map of display key to route.
///
/// Keys keep insertion order, which is the order models are listed in.
#[derive(Debug, Clone, Default)]
pub struct ModelTable {
    routes: IndexMap<String, ModelRoute>,
}

impl ModelTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model key. A repeated key replaces the earlier route but
    /// keeps its position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        model_id: impl Into<String>,
        backend: Arc<dyn ProviderBackend>,
    ) {
        self.routes.insert(
            key.into(),
            ModelRoute {
                model_id: model_id.into(),
                backend,
            },
        );
    }

    /// Builder-style [`ModelTable::insert`].
    pub fn with_route(
        mut self,
        key: impl Into<String>,
        model_id: impl Into<String>,
        backend: Arc<dyn ProviderBackend>,
    ) -> Self {
        self.insert(key, model_id, backend);
        self
    }

    /// Look up a model key.
    pub fn get(&self, key: &str) -> Option<&ModelRoute> {
        self.routes.get(key)
    }

    /// Model keys in configuration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Iterate over keys and routes in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelRoute)> {
        self.routes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_backend::EchoBackend;

    #[test]
    fn test_keys_keep_insertion_order() {
        let echo: Arc<dyn ProviderBackend> = Arc::new(EchoBackend::new());
        let table = ModelTable::new()
            .with_route("GPT-4o", "gpt-4o", echo.clone())
            .with_route("Claude 3.5 Sonnet", "claude-3-5-sonnet", echo.clone())
            .with_route("Sonar", "sonar", echo);

        let keys: Vec<&str> = table.keys().collect();
        assert_eq!(keys, vec!["GPT-4o", "Claude 3.5 Sonnet", "Sonar"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("Sonar").unwrap().model_id, "sonar");
    }

    #[test]
    fn test_replace_keeps_position() {
        let echo: Arc<dyn ProviderBackend> = Arc::new(EchoBackend::new());
        let mut table = ModelTable::new()
            .with_route("a", "a-1", echo.clone())
            .with_route("b", "b-1", echo.clone());
        table.insert("a", "a-2", echo);

        let keys: Vec<&str> = table.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(table.get("a").unwrap().model_id, "a-2");
    }

    #[test]
    fn test_empty_table() {
        let table = ModelTable::new();
        assert!(table.is_empty());
        assert!(table.get("anything").is_none());
    }
}
