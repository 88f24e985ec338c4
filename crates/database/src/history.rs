//! History persistence.

use chat_core::format_datetime;
use chrono::Local;
use futures::TryStreamExt;
use sqlx::SqlitePool;

use crate::models::{HistoryRecord, NewHistoryRecord};
use crate::Result;

/// Most rows a search returns.
pub const SEARCH_LIMIT: i64 = 100;

const COLUMNS: &str = "id, query, response, datetime, model, temperature";

/// Current local time in the stored format.
pub fn now() -> String {
    format_datetime(Local::now())
}

/// Insert a record and return its id.
pub async fn insert_history(pool: &SqlitePool, record: &NewHistoryRecord) -> Result<i64> {
    let datetime = record.datetime.clone().unwrap_or_else(now);

    let result = sqlx::query(
        r#"
        INSERT INTO history (query, response, datetime, model, temperature)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.prompt)
    .bind(&record.response)
    .bind(&datetime)
    .bind(&record.model)
    .bind(record.temperature)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Most recent records first.
pub async fn list_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<HistoryRecord>> {
    let rows = sqlx::query_as::<_, HistoryRecord>(&format!(
        "SELECT {} FROM history ORDER BY datetime DESC, id DESC LIMIT ?",
        COLUMNS
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Get a record by id.
pub async fn get_history(pool: &SqlitePool, id: i64) -> Result<Option<HistoryRecord>> {
    let row = sqlx::query_as::<_, HistoryRecord>(&format!(
        "SELECT {} FROM history WHERE id = ?",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// The most recently inserted record.
pub async fn latest(pool: &SqlitePool) -> Result<Option<HistoryRecord>> {
    let row = sqlx::query_as::<_, HistoryRecord>(&format!(
        "SELECT {} FROM history ORDER BY id DESC LIMIT 1",
        COLUMNS
    ))
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Delete a record. Returns whether a row was removed.
pub async fn delete_history(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM history WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete every record. Returns the number removed.
pub async fn clear_history(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM history").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Number of stored records.
pub async fn count_history(pool: &SqlitePool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM history")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}

/// Records whose prompt or response contains every whitespace-separated
/// token of `query`, case-insensitively.
///
/// Matching lowercases both sides in Rust rather than using `LIKE`, whose
/// case folding stops at ASCII. Rows are streamed newest first and the scan
/// stops at [`SEARCH_LIMIT`] hits. A query without tokens lists the most
/// recent records.
pub async fn search_history(pool: &SqlitePool, query: &str) -> Result<Vec<HistoryRecord>> {
    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

    if tokens.is_empty() {
        return list_recent(pool, SEARCH_LIMIT).await;
    }

    let sql = format!(
        "SELECT {} FROM history ORDER BY datetime DESC, id DESC",
        COLUMNS
    );
    let mut rows = sqlx::query_as::<_, HistoryRecord>(&sql).fetch(pool);

    let mut hits = Vec::new();
    while let Some(record) = rows.try_next().await? {
        if contains_all(&record, &tokens) {
            hits.push(record);
            if hits.len() as i64 >= SEARCH_LIMIT {
                break;
            }
        }
    }

    Ok(hits)
}

/// Every lowercased token appears in the prompt or the response.
fn contains_all(record: &HistoryRecord, tokens: &[String]) -> bool {
    let prompt = record.prompt.to_lowercase();
    let response = record.response.to_lowercase();
    tokens
        .iter()
        .all(|token| prompt.contains(token.as_str()) || response.contains(token.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::DATETIME_FORMAT;
    use chrono::NaiveDateTime;

    fn row(prompt: &str, response: &str) -> HistoryRecord {
        HistoryRecord {
            id: 1,
            prompt: prompt.to_string(),
            response: response.to_string(),
            datetime: "2024-01-01T00:00:00.000000".to_string(),
            model: "m".to_string(),
            temperature: None,
        }
    }

    fn tokens(query: &str) -> Vec<String> {
        query.split_whitespace().map(str::to_lowercase).collect()
    }

    #[test]
    fn test_contains_all_folds_unicode_case() {
        let record = row("Привет мир", "Äpfel und Birnen");
        assert!(contains_all(&record, &tokens("привет")));
        assert!(contains_all(&record, &tokens("ÄPFEL мир")));
        assert!(!contains_all(&record, &tokens("привет kirschen")));
    }

    #[test]
    fn test_contains_all_is_literal() {
        let record = row("100% sure", "snake_case");
        assert!(contains_all(&record, &tokens("100% snake_case")));
        assert!(!contains_all(&record, &tokens("snake%case")));
    }

    #[test]
    fn test_now_format() {
        let stamp = now();
        assert!(NaiveDateTime::parse_from_str(&stamp, DATETIME_FORMAT).is_ok());
        assert_eq!(stamp.as_bytes()[10], b'T');
    }

    #[test]
    fn test_full_width_space_splits_tokens() {
        let tokens: Vec<&str> = "猫\u{3000}犬 bird".split_whitespace().collect();
        assert_eq!(tokens, vec!["猫", "犬", "bird"]);
    }
}
