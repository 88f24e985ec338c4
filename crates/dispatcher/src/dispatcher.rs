//! Worker pool that runs provider calls off the caller's task.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chat_core::{codec, ProviderBackend, ProviderError, Temperature};
use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{debug, error, info, warn};

use crate::envelope::ResultEnvelope;
use crate::error::{DispatchError, Result};
use crate::routes::ModelTable;

/// Receiving half of the result channel.
pub type ResultReceiver = mpsc::UnboundedReceiver<ResultEnvelope>;

/// Fewest concurrent provider calls a dispatcher allows.
pub const MIN_WORKERS: usize = 2;

/// Dispatcher settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Number of provider calls allowed to run at once.
    pub workers: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

impl DispatcherConfig {
    /// Set the worker count, raised to [`MIN_WORKERS`] when lower.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(MIN_WORKERS),
        }
    }
}

/// Decrements the in-flight counter when dropped.
struct InFlightGuard {
    counter: Arc<watch::Sender<usize>>,
}

impl InFlightGuard {
    fn acquire(counter: Arc<watch::Sender<usize>>) -> Self {
        counter.send_modify(|n| *n += 1);
        Self { counter }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// Routes prompts to backends and reports every outcome on a channel.
///
/// Cloning is cheap; clones share the worker pool, the counter and the
/// result channel.
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<ModelTable>,
    permits: Arc<Semaphore>,
    in_flight: Arc<watch::Sender<usize>>,
    results: mpsc::UnboundedSender<ResultEnvelope>,
    runtime: Handle,
}

impl Dispatcher {
    /// Create a dispatcher and the receiver its envelopes arrive on.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(table: ModelTable, config: DispatcherConfig) -> Result<(Self, ResultReceiver)> {
        let runtime = Handle::try_current().map_err(|_| DispatchError::NoRuntime)?;
        let workers = config.workers.max(MIN_WORKERS);
        let (results, receiver) = mpsc::unbounded_channel();
        let (in_flight, _) = watch::channel(0usize);

        info!(
            "Dispatcher initialized with {} model(s), {} worker(s)",
            table.len(),
            workers
        );

        Ok((
            Self {
                table: Arc::new(table),
                permits: Arc::new(Semaphore::new(workers)),
                in_flight: Arc::new(in_flight),
                results,
                runtime,
            },
            receiver,
        ))
    }

    /// The routing table.
    pub fn models(&self) -> &ModelTable {
        &self.table
    }

    /// Number of accepted submissions whose envelope has not been produced.
    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Watch the in-flight counter.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.in_flight.subscribe()
    }

    /// Submit a raw prompt to the backend behind `model_key`.
    ///
    /// Returns as soon as the call is queued. An unknown key is rejected
    /// here and nothing is scheduled; everything else, including backend
    /// panics, ends in exactly one [`ResultEnvelope`].
    pub fn submit(&self, raw_text: &str, model_key: &str, temperature: Temperature) -> Result<()> {
        let route = self
            .table
            .get(model_key)
            .ok_or_else(|| DispatchError::UnknownModel(model_key.to_string()))?;

        let backend = Arc::clone(&route.backend);
        let model_id = route.model_id.clone();
        let messages = codec::decode(raw_text, backend.supports_system_role());

        debug!(
            "Submitting {} message(s) to {} ({})",
            messages.len(),
            model_key,
            model_id
        );

        let guard = InFlightGuard::acquire(Arc::clone(&self.in_flight));
        let permits = Arc::clone(&self.permits);
        let results = self.results.clone();
        let prompt = raw_text.to_string();
        let model_key = model_key.to_string();

        self.runtime.spawn(async move {
            let outcome = match permits.acquire_owned().await {
                Ok(_permit) => call_backend(backend.as_ref(), &messages, &model_id, temperature).await,
                Err(_) => Err(ProviderError::Unexpected("worker pool closed".to_string())),
            };

            let (response, error_kind) = match outcome {
                Ok(text) => (text, None),
                Err(err) => {
                    error!(
                        kind = err.kind(),
                        model = %model_key,
                        "Provider call failed: {}",
                        err
                    );
                    (err.to_string(), Some(err.kind()))
                }
            };

            let envelope =
                ResultEnvelope::new(prompt, response, model_key, temperature.value(), error_kind);

            drop(guard);
            if results.send(envelope).is_err() {
                warn!("Result receiver dropped; discarding envelope");
            }
        });

        Ok(())
    }
}

/// Run one provider call, turning a panic into an error.
async fn call_backend(
    backend: &dyn ProviderBackend,
    messages: &[chat_core::Message],
    model_id: &str,
    temperature: Temperature,
) -> std::result::Result<String, ProviderError> {
    match AssertUnwindSafe(backend.complete(messages, model_id, temperature))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(payload) => Err(ProviderError::Unexpected(format!(
            "{} panicked: {}",
            backend.name(),
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_floor() {
        assert_eq!(DispatcherConfig::with_workers(0).workers, MIN_WORKERS);
        assert_eq!(DispatcherConfig::with_workers(8).workers, 8);
        assert_eq!(DispatcherConfig::default().workers, 4);
    }

    #[test]
    fn test_new_outside_runtime() {
        let result = Dispatcher::new(ModelTable::new(), DispatcherConfig::default());
        assert!(matches!(result, Err(DispatchError::NoRuntime)));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[tokio::test]
    async fn test_guard_restores_counter() {
        let (dispatcher, _rx) =
            Dispatcher::new(ModelTable::new(), DispatcherConfig::default()).unwrap();
        {
            let _a = InFlightGuard::acquire(Arc::clone(&dispatcher.in_flight));
            let _b = InFlightGuard::acquire(Arc::clone(&dispatcher.in_flight));
            assert_eq!(dispatcher.in_flight(), 2);
        }
        assert_eq!(dispatcher.in_flight(), 0);
    }
}
