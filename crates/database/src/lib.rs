//! SQLite chat history store for llm-desk.
//!
//! Every completed exchange is kept as one row of the `history` table. The
//! store owns schema creation and upgrades older files in place, so databases
//! written before the `temperature` column existed keep working.
//!
//! # Example
//!
//! ```no_run
//! use database::{HistoryStore, NewHistoryRecord};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = HistoryStore::open("llm_client.db").await?;
//!
//!     store
//!         .insert(&NewHistoryRecord::new("Hello", "Hi there!", "GPT-4o").temperature(5))
//!         .await?;
//!
//!     for record in store.search("hello").await? {
//!         println!("{} {} {}", record.id, record.model, record.prompt);
//!     }
//!
//!     store.close().await;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod history;
pub mod models;
pub mod schema;

pub use error::{DatabaseError, Result};
pub use chat_core::DATETIME_FORMAT;
pub use history::SEARCH_LIMIT;
pub use models::{HistoryRecord, NewHistoryRecord};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

/// Handle to the history database.
///
/// Holds exactly one connection for its whole lifetime.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    pool: SqlitePool,
}

impl HistoryStore {
    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);

        let store = Self::connect_with(options).await?;
        tracing::info!("Opened history database: {}", path.as_ref().display());
        Ok(store)
    }

    /// Connect with a SQLite URL.
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let store = database::HistoryStore::connect("sqlite:llm_client.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let store = database::HistoryStore::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let store = Self::connect_with(options).await?;
        tracing::info!("Connected to history database: {}", url);
        Ok(store)
    }

    async fn connect_with(options: SqliteConnectOptions) -> Result<Self> {
        // One connection that never expires; an in-memory database lives
        // only as long as it does.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        schema::ensure_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn live_pool(&self) -> Result<&SqlitePool> {
        if self.pool.is_closed() {
            return Err(DatabaseError::Closed);
        }
        Ok(&self.pool)
    }

    /// Store an exchange and return its id.
    pub async fn insert(&self, record: &NewHistoryRecord) -> Result<i64> {
        history::insert_history(self.live_pool()?, record).await
    }

    /// Up to `limit` records, newest first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<HistoryRecord>> {
        history::list_recent(self.live_pool()?, limit).await
    }

    /// Look up a record by id.
    pub async fn get(&self, id: i64) -> Result<Option<HistoryRecord>> {
        history::get_history(self.live_pool()?, id).await
    }

    /// The most recently inserted record.
    pub async fn latest(&self) -> Result<Option<HistoryRecord>> {
        history::latest(self.live_pool()?).await
    }

    /// Delete a record; a missing id is not an error.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let removed = history::delete_history(self.live_pool()?, id).await?;
        if !removed {
            tracing::debug!("delete: no history row with id {}", id);
        }
        Ok(())
    }

    /// Multi-token substring search, newest first, at most [`SEARCH_LIMIT`] rows.
    pub async fn search(&self, query: &str) -> Result<Vec<HistoryRecord>> {
        history::search_history(self.live_pool()?, query).await
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<i64> {
        history::count_history(self.live_pool()?).await
    }

    /// Delete every record.
    pub async fn clear(&self) -> Result<u64> {
        let removed = history::clear_history(self.live_pool()?).await?;
        tracing::info!("Cleared {} history record(s)", removed);
        Ok(removed)
    }

    /// Close the connection. Later calls fail with [`DatabaseError::Closed`].
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> HistoryStore {
        HistoryStore::connect("sqlite::memory:").await.unwrap()
    }

    fn record(prompt: &str, response: &str, datetime: &str) -> NewHistoryRecord {
        NewHistoryRecord::new(prompt, response, "GPT-4o")
            .temperature(5)
            .datetime(datetime)
    }

    #[tokio::test]
    async fn test_history_crud() {
        let store = test_store().await;

        // Insert
        let id = store
            .insert(&NewHistoryRecord::new("Hello", "Hi!", "GPT-4o").temperature(7))
            .await
            .unwrap();

        // Read
        let fetched = store.get(id).await.unwrap().unwrap();
        assert_eq!(fetched.prompt, "Hello");
        assert_eq!(fetched.response, "Hi!");
        assert_eq!(fetched.model, "GPT-4o");
        assert_eq!(fetched.temperature, Some(7));
        assert!(chrono::NaiveDateTime::parse_from_str(&fetched.datetime, DATETIME_FORMAT).is_ok());

        // Latest
        assert_eq!(store.latest().await.unwrap(), Some(fetched.clone()));

        // Delete
        store.delete(id).await.unwrap();
        assert!(store.get(id).await.unwrap().is_none());
        assert!(store.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = test_store().await;
        assert!(store.latest().await.unwrap().is_none());
        assert!(store.list_recent(10).await.unwrap().is_empty());
        assert!(store.search("anything").await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_recent_orders_by_datetime() {
        let store = test_store().await;
        store.insert(&record("b", "r", "2024-01-02T00:00:00.000000")).await.unwrap();
        store.insert(&record("c", "r", "2024-01-03T00:00:00.000000")).await.unwrap();
        store.insert(&record("a", "r", "2024-01-01T00:00:00.000000")).await.unwrap();

        let prompts: Vec<String> = store
            .list_recent(10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.prompt)
            .collect();
        assert_eq!(prompts, vec!["c", "b", "a"]);

        assert_eq!(store.list_recent(2).await.unwrap().len(), 2);

        // latest is by insertion, not timestamp
        assert_eq!(store.latest().await.unwrap().unwrap().prompt, "a");
    }

    #[tokio::test]
    async fn test_equal_timestamps_break_ties_by_id() {
        let store = test_store().await;
        let stamp = "2024-05-05T05:05:05.000000";
        let first = store.insert(&record("first", "r", stamp)).await.unwrap();
        let second = store.insert(&record("second", "r", stamp)).await.unwrap();

        let ids: Vec<i64> = store
            .list_recent(10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_noop() {
        let store = test_store().await;
        store.insert(&record("keep", "r", "2024-01-01T00:00:00.000000")).await.unwrap();
        let before = store.list_recent(100).await.unwrap();

        store.delete(9999).await.unwrap();

        assert_eq!(store.list_recent(100).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_search_requires_all_tokens() {
        let store = test_store().await;
        store.insert(&record("Foo only", "nothing", "2024-01-01T00:00:00.000000")).await.unwrap();
        store.insert(&record("foo", "and BAR here", "2024-01-02T00:00:00.000000")).await.unwrap();
        store.insert(&record("bar alone", "x", "2024-01-03T00:00:00.000000")).await.unwrap();

        let hits = store.search("foo bar").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prompt, "foo");

        let hits = store.search("FOO").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].prompt, "foo");
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let store = test_store().await;
        store.insert(&record("Привет мир", "r", "2024-01-01T00:00:00.000000")).await.unwrap();
        store.insert(&record("Äpfel kaufen", "r", "2024-01-02T00:00:00.000000")).await.unwrap();

        let hits = store.search("привет").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prompt, "Привет мир");

        let hits = store.search("äpfel").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prompt, "Äpfel kaufen");
    }

    #[tokio::test]
    async fn test_blank_search_lists_recent() {
        let store = test_store().await;
        for i in 0..3 {
            store
                .insert(&record(&format!("p{}", i), "r", &format!("2024-01-0{}T00:00:00.000000", i + 1)))
                .await
                .unwrap();
        }

        let recent = store.list_recent(100).await.unwrap();
        assert_eq!(store.search("").await.unwrap(), recent);
        assert_eq!(store.search(" \t\u{3000} ").await.unwrap(), recent);
    }

    #[tokio::test]
    async fn test_search_wildcards_match_literally() {
        let store = test_store().await;
        store.insert(&record("100% sure", "r", "2024-01-01T00:00:00.000000")).await.unwrap();
        store.insert(&record("1000 sure", "r", "2024-01-02T00:00:00.000000")).await.unwrap();
        store.insert(&record("snake_case", "r", "2024-01-03T00:00:00.000000")).await.unwrap();
        store.insert(&record("snakeXcase", "r", "2024-01-04T00:00:00.000000")).await.unwrap();

        let hits = store.search("100%").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prompt, "100% sure");

        let hits = store.search("snake_case").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prompt, "snake_case");
    }

    #[tokio::test]
    async fn test_search_limit() {
        let store = test_store().await;
        for i in 0..(SEARCH_LIMIT + 5) {
            store
                .insert(&NewHistoryRecord::new(format!("needle {}", i), "r", "m"))
                .await
                .unwrap();
        }
        assert_eq!(store.search("needle").await.unwrap().len() as i64, SEARCH_LIMIT);
        assert_eq!(store.count().await.unwrap(), SEARCH_LIMIT + 5);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = test_store().await;
        store.insert(&NewHistoryRecord::new("a", "b", "m")).await.unwrap();
        store.insert(&NewHistoryRecord::new("c", "d", "m")).await.unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_store_rejects_calls() {
        let store = test_store().await;
        store.close().await;
        assert!(matches!(
            store.list_recent(1).await,
            Err(DatabaseError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let store = test_store().await;
        schema::ensure_schema(store.pool()).await.unwrap();
        schema::ensure_schema(store.pool()).await.unwrap();

        let columns = schema::columns(store.pool()).await.unwrap();
        assert_eq!(
            columns,
            vec!["id", "query", "response", "datetime", "model", "temperature"]
        );
    }
}
