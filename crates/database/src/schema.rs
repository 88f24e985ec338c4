//! Schema creation and in-place upgrade.

use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::Result;

/// Columns added after the first schema, with their SQL type.
const OPTIONAL_COLUMNS: &[(&str, &str)] = &[("temperature", "INTEGER")];

/// Create the history table if absent and add any missing optional columns.
///
/// Existing rows are never touched; running this twice is a no-op.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            query TEXT NOT NULL,
            response TEXT NOT NULL,
            datetime TEXT NOT NULL,
            model TEXT NOT NULL,
            temperature INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    let existing = columns(pool).await?;
    for (name, sql_type) in OPTIONAL_COLUMNS {
        if !existing.iter().any(|c| c == name) {
            info!("Adding missing column history.{}", name);
            sqlx::query(&format!(
                "ALTER TABLE history ADD COLUMN {} {}",
                name, sql_type
            ))
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

/// Column names of the history table.
pub async fn columns(pool: &SqlitePool) -> Result<Vec<String>> {
    let rows = sqlx::query("PRAGMA table_info(history)")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| row.try_get::<String, _>("name").map_err(Into::into))
        .collect()
}
