//! OpenAI-compatible backend implementation.
//!
//! This crate provides a `ProviderBackend` that talks to any endpoint speaking
//! the OpenAI chat completions protocol. Two presets ship with it:
//!
//! - [`Vendor::OpenAi`] - `https://api.openai.com/v1/chat/completions`
//! - [`Vendor::Perplexity`] - `https://api.perplexity.ai/chat/completions`
//!
//! The shared 0-10 temperature is divided by 5 for both presets, giving the
//! vendors' native 0.0-2.0 range.
//!
//! # Usage
//!
//! ```rust,no_run
//! use openai_backend::{OpenAiBackend, OpenAiBackendConfig, Vendor};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OpenAiBackendConfig::from_env(Vendor::OpenAi)?;
//!     let backend = OpenAiBackend::new(config)?;
//!     // Register the backend in a dispatcher model table...
//!     Ok(())
//! }
//! ```

mod api_types;
mod backend;
mod config;

pub use backend::OpenAiBackend;
pub use config::{ConfigError, OpenAiBackendConfig, OpenAiBackendConfigBuilder, Vendor};

// Re-export chat-core types for convenience
pub use chat_core::{Message, ProviderBackend, ProviderError, Temperature};
