//! The timestamp format every exchange is recorded with.

use chrono::{DateTime, Local};

/// Local time with microseconds, e.g. `2024-05-01T14:03:22.118204`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Format a timestamp with [`DATETIME_FORMAT`].
pub fn format_datetime(at: DateTime<Local>) -> String {
    at.format(DATETIME_FORMAT).to_string()
}
