//! Core types and traits shared by every llm-desk component.
//!
//! This crate provides:
//!
//! - [`Message`] / [`Role`] - A single role-tagged conversation turn
//! - [`codec`] - Conversion between one editable block of text and a message sequence
//! - [`ProviderBackend`] - The trait every vendor adapter implements
//! - [`ProviderError`] - The uniform failure taxonomy for provider calls
//! - [`Temperature`] - The shared 0-10 temperature scale
//! - [`format_datetime`] - The timestamp format of results and stored history
//!
//! # Example
//!
//! ```rust
//! use chat_core::{async_trait, Message, ProviderBackend, ProviderError, Temperature};
//!
//! struct Parrot;
//!
//! #[async_trait]
//! impl ProviderBackend for Parrot {
//!     async fn complete(
//!         &self,
//!         messages: &[Message],
//!         _model_id: &str,
//!         _temperature: Temperature,
//!     ) -> Result<String, ProviderError> {
//!         Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Parrot"
//!     }
//! }
//! ```

mod backend;
pub mod codec;
mod error;
mod message;
mod temperature;
mod timestamp;

pub use backend::{fold_system_into_user, ProviderBackend};
pub use error::ProviderError;
pub use message::{Message, Role};
pub use temperature::Temperature;
pub use timestamp::{format_datetime, DATETIME_FORMAT};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
