//! Concurrent dispatch of chat prompts to provider backends.
//!
//! A [`Dispatcher`] resolves a model key in a [`ModelTable`], decodes the raw
//! prompt into a conversation and runs the provider call on a bounded pool of
//! tokio tasks. Every accepted submission yields exactly one
//! [`ResultEnvelope`] on the result channel, in completion order; provider
//! failures and panics become response text.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use dispatcher::{Dispatcher, DispatcherConfig, ModelTable};
//! use chat_core::Temperature;
//! # use chat_core::{async_trait, Message, ProviderBackend, ProviderError};
//! # struct Parrot;
//! # #[async_trait]
//! # impl ProviderBackend for Parrot {
//! #     async fn complete(&self, m: &[Message], _: &str, _: Temperature) -> Result<String, ProviderError> {
//! #         Ok(m.last().map(|m| m.content.clone()).unwrap_or_default())
//! #     }
//! #     fn name(&self) -> &str { "Parrot" }
//! # }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = ModelTable::new().with_route("Parrot", "parrot-1", Arc::new(Parrot));
//! let (dispatcher, mut results) = Dispatcher::new(table, DispatcherConfig::default())?;
//!
//! dispatcher.submit("Hello", "Parrot", Temperature::new(3))?;
//! let envelope = results.recv().await.unwrap();
//! assert_eq!(envelope.response, "Hello");
//! # Ok(())
//! # }
//! ```

mod dispatcher;
mod envelope;
mod error;
mod routes;

pub use dispatcher::{Dispatcher, DispatcherConfig, ResultReceiver, MIN_WORKERS};
pub use envelope::ResultEnvelope;
pub use error::{DispatchError, Result};
pub use routes::{ModelRoute, ModelTable};
