//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored prompt/response exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct HistoryRecord {
    /// Row id, assigned on insert.
    pub id: i64,
    /// Full prompt text as submitted (column `query`).
    #[sqlx(rename = "query")]
    pub prompt: String,
    /// Model reply or failure text.
    pub response: String,
    /// Completion timestamp, `%Y-%m-%dT%H:%M:%S%.6f`.
    pub datetime: String,
    /// Model key the prompt was sent to.
    pub model: String,
    /// 0-10 temperature; absent on rows written before the column existed.
    pub temperature: Option<i64>,
}

/// A record to insert.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewHistoryRecord {
    pub prompt: String,
    pub response: String,
    pub model: String,
    /// Defaults to the current local time when unset.
    pub datetime: Option<String>,
    pub temperature: Option<i64>,
}

impl NewHistoryRecord {
    /// Create a record stamped at insert time.
    pub fn new(
        prompt: impl Into<String>,
        response: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
            model: model.into(),
            datetime: None,
            temperature: None,
        }
    }

    /// Set the temperature.
    pub fn temperature(mut self, temperature: i64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set an explicit timestamp.
    pub fn datetime(mut self, datetime: impl Into<String>) -> Self {
        self.datetime = Some(datetime.into());
        self
    }
}
