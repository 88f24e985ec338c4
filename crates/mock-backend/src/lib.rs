//! Mock provider backends for llm-desk.
//!
//! This crate provides mock implementations of the `ProviderBackend` trait for testing:
//! - `EchoBackend` - Echoes the last user message back
//! - `FailingBackend` - Always fails with a fixed `ProviderError`
//! - `DelayedBackend` - Wraps another backend with artificial delay
//! - `PanickingBackend` - Panics inside `complete`
//!
//! For real providers, use the `openai-backend` and `anthropic-backend` crates.
//!
//! # Example
//!
//! ```rust
//! use mock_backend::{EchoBackend, Message, ProviderBackend, Temperature};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_backend::ProviderError> {
//!     let backend = EchoBackend::new();
//!
//!     let messages = vec![Message::user("Hello!")];
//!     let response = backend.complete(&messages, "echo-1", Temperature::default()).await?;
//!     println!("Response: {}", response);
//!     Ok(())
//! }
//! ```

mod delayed;
mod echo;
mod failing;

// Re-export chat-core types for convenience
pub use chat_core::{async_trait, Message, ProviderBackend, ProviderError, Role, Temperature};

pub use delayed::DelayedBackend;
pub use echo::EchoBackend;
pub use failing::{FailingBackend, PanickingBackend};
