//! A desk for sending prompts to several LLM providers at once.
//!
//! Prompts are plain text; delimiter lines split them into a conversation
//! (see [`chat_core::codec`]). Each prompt is routed by model key to an
//! OpenAI, Anthropic or Perplexity backend, answered concurrently, and every
//! exchange lands in a searchable SQLite history.
//!
//! # Example
//!
//! ```no_run
//! use chat_core::Temperature;
//! use dispatcher::{Dispatcher, DispatcherConfig};
//! use llm_desk::{open_store, AppConfig, ProviderSet, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load("config.json")?;
//!     let table = ProviderSet::from_env().model_table(&config);
//!     let (dispatcher, results) = Dispatcher::new(table, DispatcherConfig::default())?;
//!     let mut session = Session::new(dispatcher, results, open_store("llm_client.db").await);
//!
//!     session.submit("Hello!", "GPT4o", Temperature::new(5))?;
//!     if let Some(done) = session.next_result().await {
//!         println!("{}", done.envelope.response);
//!     }
//!     session.close().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod providers;
pub mod session;

pub use config::{AppConfig, ModelMap, DEFAULT_CONFIG_FILE, DEFAULT_DB_FILE};
pub use error::{AppError, ConfigError};
pub use logging::init_logging;
pub use providers::ProviderSet;
pub use session::{open_store, status_text, Completed, Session, DEFAULT_HISTORY_LIMIT};
