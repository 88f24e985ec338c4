//! Anthropic backend implementation.
//!
//! Talks to the Anthropic messages API (`POST {api_url}/v1/messages`). System
//! messages are lifted into the top-level `system` field, and the shared 0-10
//! temperature is divided by 10 to land in the API's 0.0-1.0 range.
//!
//! # Usage
//!
//! ```rust,no_run
//! use anthropic_backend::{AnthropicBackend, AnthropicBackendConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnthropicBackendConfig::from_env()?;
//!     let backend = AnthropicBackend::new(config)?;
//!     Ok(())
//! }
//! ```

mod api_types;
mod backend;
mod config;

pub use backend::AnthropicBackend;
pub use config::{AnthropicBackendConfig, AnthropicBackendConfigBuilder, ConfigError};

pub use chat_core::{Message, ProviderBackend, ProviderError, Temperature};
