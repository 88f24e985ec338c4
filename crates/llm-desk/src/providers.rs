//! Provider backends from the environment, and the model table built on them.

use std::sync::Arc;

use anthropic_backend::AnthropicBackend;
use chat_core::ProviderBackend;
use dispatcher::ModelTable;
use openai_backend::{OpenAiBackend, Vendor};
use tracing::{info, warn};

use crate::config::{AppConfig, ModelMap};

/// The backends that could be configured, one slot per vendor.
///
/// A vendor without credentials leaves its slot empty and contributes no
/// model keys.
#[derive(Default, Clone)]
pub struct ProviderSet {
    pub openai: Option<Arc<dyn ProviderBackend>>,
    pub anthropic: Option<Arc<dyn ProviderBackend>>,
    pub perplexity: Option<Arc<dyn ProviderBackend>>,
    warnings: Vec<String>,
}

impl ProviderSet {
    /// Build every backend whose credentials are present in the environment.
    pub fn from_env() -> Self {
        let mut set = Self::default();

        match OpenAiBackend::from_env(Vendor::OpenAi) {
            Ok(backend) => set.openai = Some(Arc::new(backend)),
            Err(e) => set.warn(format!("OpenAI models unavailable: {}", e)),
        }
        match AnthropicBackend::from_env() {
            Ok(backend) => set.anthropic = Some(Arc::new(backend)),
            Err(e) => set.warn(format!("Anthropic models unavailable: {}", e)),
        }
        match OpenAiBackend::from_env(Vendor::Perplexity) {
            Ok(backend) => set.perplexity = Some(Arc::new(backend)),
            Err(e) => set.warn(format!("Perplexity models unavailable: {}", e)),
        }

        set
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }

    /// Configuration problems found while building the set.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Route every configured model key whose vendor is available.
    ///
    /// Keys are added OpenAI first, then Anthropic, then Perplexity, each in
    /// file order. A key repeated across vendors routes to the later vendor.
    pub fn model_table(&self, config: &AppConfig) -> ModelTable {
        let mut table = ModelTable::new();

        let vendors = [
            ("OpenAI", &self.openai, &config.openai_models),
            ("Anthropic", &self.anthropic, &config.anthropic_models),
            ("Perplexity", &self.perplexity, &config.perplexity_models),
        ];

        for (vendor, backend, models) in vendors {
            if let Some(backend) = backend {
                add_routes(&mut table, vendor, backend, models);
            }
        }

        info!("{} model(s) available", table.len());
        table
    }
}

fn add_routes(
    table: &mut ModelTable,
    vendor: &str,
    backend: &Arc<dyn ProviderBackend>,
    models: &ModelMap,
) {
    for (key, model_id) in models {
        if table.get(key).is_some() {
            warn!("Model key {} redefined by {}", key, vendor);
        }
        table.insert(key.clone(), model_id.clone(), Arc::clone(backend));
    }
}
