//! One desk session: dispatcher, result stream and optional history store.

use std::path::Path;

use chat_core::{codec, Temperature};
use database::{HistoryRecord, HistoryStore, NewHistoryRecord};
use dispatcher::{DispatchError, Dispatcher, ModelTable, ResultEnvelope, ResultReceiver};
use tracing::{debug, error, info, warn};

use crate::error::AppError;

/// Number of history rows listed by default.
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

/// An envelope and the history row it was stored as.
#[derive(Debug, Clone)]
pub struct Completed {
    pub envelope: ResultEnvelope,
    /// `None` when the session has no store or the write failed.
    pub record: Option<HistoryRecord>,
}

/// Ties the dispatcher to the history store.
///
/// Store failures never abort the session: reads come back empty and writes
/// are dropped, each with an error log. A session opened without a store
/// runs history-less.
pub struct Session {
    dispatcher: Dispatcher,
    results: ResultReceiver,
    store: Option<HistoryStore>,
    current: Option<i64>,
}

/// Open the history database, logging instead of failing.
pub async fn open_store(path: impl AsRef<Path>) -> Option<HistoryStore> {
    match HistoryStore::open(path.as_ref()).await {
        Ok(store) => Some(store),
        Err(e) => {
            error!(
                "Could not open history at {}: {}; running without history",
                path.as_ref().display(),
                e
            );
            None
        }
    }
}

impl Session {
    pub fn new(dispatcher: Dispatcher, results: ResultReceiver, store: Option<HistoryStore>) -> Self {
        Self {
            dispatcher,
            results,
            store,
            current: None,
        }
    }

    /// Available model keys.
    pub fn models(&self) -> &ModelTable {
        self.dispatcher.models()
    }

    pub fn has_history(&self) -> bool {
        self.store.is_some()
    }

    /// Id of the exchange most recently completed or selected.
    pub fn current(&self) -> Option<i64> {
        self.current
    }

    /// Number of outstanding requests.
    pub fn in_flight(&self) -> usize {
        self.dispatcher.in_flight()
    }

    /// Status line for the in-flight count.
    pub fn status_text(&self) -> String {
        status_text(self.in_flight())
    }

    /// Send a prompt. Blank prompts are refused before anything is queued.
    pub fn submit(&mut self, prompt: &str, model_key: &str, temperature: Temperature) -> Result<(), AppError> {
        if prompt.trim().is_empty() {
            warn!("No prompt to send");
            return Err(AppError::EmptyPrompt);
        }
        self.current = None;
        self.dispatcher.submit(prompt, model_key, temperature)?;
        info!("{} ({})", model_key, self.status_text());
        Ok(())
    }

    /// Send one prompt to several models.
    ///
    /// Every key is checked before anything is queued, so an unknown key
    /// refuses the whole batch. Returns the number of requests sent.
    pub fn submit_all(
        &mut self,
        prompt: &str,
        model_keys: &[String],
        temperature: Temperature,
    ) -> Result<usize, AppError> {
        if prompt.trim().is_empty() {
            warn!("No prompt to send");
            return Err(AppError::EmptyPrompt);
        }
        let unknown = model_keys
            .iter()
            .find(|key| self.models().get(key.as_str()).is_none());
        if let Some(unknown) = unknown {
            warn!("Unknown model: {}", unknown);
            return Err(DispatchError::UnknownModel(unknown.clone()).into());
        }

        for key in model_keys {
            self.submit(prompt, key, temperature)?;
        }
        Ok(model_keys.len())
    }

    /// Wait for the next envelope and store it.
    ///
    /// Returns `None` once the result channel is closed.
    pub async fn next_result(&mut self) -> Option<Completed> {
        let envelope = self.results.recv().await?;
        debug!("Received result from {}", envelope.model);

        let record = self.record(&envelope).await;
        self.current = record.as_ref().map(|r| r.id);
        info!("{}", self.status_text());

        Some(Completed { envelope, record })
    }

    /// Insert, then read back the newest row.
    async fn record(&self, envelope: &ResultEnvelope) -> Option<HistoryRecord> {
        let store = self.store.as_ref()?;

        let new = NewHistoryRecord {
            prompt: envelope.prompt.clone(),
            response: envelope.response.clone(),
            model: envelope.model.clone(),
            datetime: Some(envelope.datetime.clone()),
            temperature: envelope.temperature.map(i64::from),
        };

        if let Err(e) = store.insert(&new).await {
            error!("Failed to store result: {}", e);
            return None;
        }

        match store.latest().await {
            Ok(record) => record,
            Err(e) => {
                error!("Failed to read back stored result: {}", e);
                None
            }
        }
    }

    /// Most recent history rows.
    pub async fn recent(&self, limit: i64) -> Vec<HistoryRecord> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        store.list_recent(limit).await.unwrap_or_else(|e| {
            error!("Failed to list history: {}", e);
            Vec::new()
        })
    }

    /// Search history; a blank query lists the most recent rows.
    pub async fn search(&self, query: &str) -> Vec<HistoryRecord> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        store.search(query).await.unwrap_or_else(|e| {
            error!("Failed to search history: {}", e);
            Vec::new()
        })
    }

    /// Select a stored exchange.
    pub async fn select(&mut self, id: i64) -> Option<HistoryRecord> {
        let record = self.get(id).await;
        if record.is_some() {
            self.current = Some(id);
        } else {
            warn!("Item not found: {}", id);
        }
        record
    }

    async fn get(&self, id: i64) -> Option<HistoryRecord> {
        let store = self.store.as_ref()?;
        store.get(id).await.unwrap_or_else(|e| {
            error!("Failed to load history item {}: {}", id, e);
            None
        })
    }

    /// Delete a stored exchange.
    pub async fn delete(&mut self, id: i64) {
        let Some(store) = &self.store else {
            return;
        };
        info!("Delete item with id: {}", id);
        if let Err(e) = store.delete(id).await {
            error!("Failed to delete history item {}: {}", id, e);
        }
        if self.current == Some(id) {
            self.current = None;
        }
    }

    /// Delete all stored exchanges.
    pub async fn clear(&mut self) -> u64 {
        self.current = None;
        let Some(store) = &self.store else {
            return 0;
        };
        store.clear().await.unwrap_or_else(|e| {
            error!("Failed to clear history: {}", e);
            0
        })
    }

    /// Text that continues a stored exchange with a new user turn.
    ///
    /// An exchange with an empty response continues from its prompt alone.
    pub async fn continuation(&mut self, id: i64) -> Option<String> {
        let record = self.select(id).await?;
        if record.response.is_empty() {
            return Some(record.prompt);
        }
        Some(codec::append_response(&record.prompt, &record.response))
    }

    /// Release the store connection.
    pub async fn close(self) {
        if let Some(store) = self.store {
            store.close().await;
        }
    }
}

/// `Ready` when idle, otherwise the number of outstanding responses.
pub fn status_text(in_flight: usize) -> String {
    if in_flight == 0 {
        "Ready".to_string()
    } else {
        format!("Waiting for {} response(s)...", in_flight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(0), "Ready");
        assert_eq!(status_text(1), "Waiting for 1 response(s)...");
        assert_eq!(status_text(3), "Waiting for 3 response(s)...");
    }
}
