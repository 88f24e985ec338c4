//! `config.json`: model keys per vendor and prompt templates.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::ConfigError;

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Default history database file name.
pub const DEFAULT_DB_FILE: &str = "llm_client.db";

/// Display key to vendor model id, in display order.
pub type ModelMap = IndexMap<String, String>;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub openai_models: ModelMap,
    #[serde(default)]
    pub anthropic_models: ModelMap,
    #[serde(default)]
    pub perplexity_models: ModelMap,
    /// Template name to template text.
    #[serde(default)]
    pub prompts: IndexMap<String, String>,
}

fn map(entries: &[(&str, &str)]) -> IndexMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn default_openai_models() -> ModelMap {
    map(&[("GPT4o-mini", "gpt-4o-mini"), ("GPT4o", "gpt-4o")])
}

fn default_anthropic_models() -> ModelMap {
    map(&[
        ("Claude3 Haiku", "claude-3-haiku-20240307"),
        ("Claude3 Sonnet", "claude-3-sonnet-20240229"),
        ("Claude3.5 Sonnet", "claude-3-5-sonnet-20240620"),
    ])
}

fn default_perplexity_models() -> ModelMap {
    map(&[
        ("Sonar_3.1_8B", "llama-3.1-sonar-small-128k-online"),
        ("Sonar_3.1_70B", "llama-3.1-sonar-large-128k-online"),
        ("Sonar_3.1_405B", "llama-3.1-sonar-huge-128k-online"),
    ])
}

fn default_prompts() -> IndexMap<String, String> {
    map(&[
        ("Default", "This is a default prompt."),
        ("J2E", "Translate to natural American English."),
        (
            "Proofread",
            "Please proofread and revise the following English text to make it sound more natural. Additionally, at the end, explain any grammatical errors or areas for improvement",
        ),
    ])
}

impl AppConfig {
    /// The configuration written when no file exists.
    pub fn defaults() -> Self {
        Self {
            openai_models: default_openai_models(),
            anthropic_models: default_anthropic_models(),
            perplexity_models: default_perplexity_models(),
            prompts: default_prompts(),
        }
    }

    /// Load the configuration at `path`.
    ///
    /// A missing file is created with [`AppConfig::defaults`]. Empty prompts
    /// fall back to the default prompts, and a file listing neither OpenAI
    /// nor Anthropic models falls back to the default models for both.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let mut config = match fs::read_to_string(path) {
            Ok(text) => {
                let config: AppConfig =
                    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                        path: path.to_path_buf(),
                        source,
                    })?;
                info!("{} loaded", path.display());
                config
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!("{} not found; writing defaults", path.display());
                let config = Self::defaults();
                config.save(path)?;
                info!("{} auto-generated", path.display());
                config
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        config.fill_missing();
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn fill_missing(&mut self) {
        if self.prompts.is_empty() {
            error!("No prompts found in config; using defaults");
            self.prompts = default_prompts();
        }
        if self.openai_models.is_empty() && self.anthropic_models.is_empty() {
            error!("No models found in config; using defaults");
            self.openai_models = default_openai_models();
            self.anthropic_models = default_anthropic_models();
        }
    }

    /// Look up a prompt template by name.
    pub fn prompt(&self, name: &str) -> Option<&str> {
        self.prompts.get(name).map(String::as_str)
    }
}
