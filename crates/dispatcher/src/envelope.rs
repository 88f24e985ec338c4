//! The result of one dispatched request.

use chat_core::format_datetime;
use chrono::Local;

/// Outcome of a submission, produced exactly once per accepted request.
///
/// Failures are carried as readable text in `response` so the caller can
/// store and display every envelope the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope {
    /// The raw prompt text as submitted.
    pub prompt: String,
    /// Model reply, or the failure text.
    pub response: String,
    /// The model key the prompt was submitted under.
    pub model: String,
    /// Completion time, formatted with [`chat_core::DATETIME_FORMAT`].
    pub datetime: String,
    /// The 0-10 temperature used.
    pub temperature: Option<u8>,
    /// Failure kind when the call did not succeed.
    pub error_kind: Option<&'static str>,
}

impl ResultEnvelope {
    pub(crate) fn new(
        prompt: String,
        response: String,
        model: String,
        temperature: u8,
        error_kind: Option<&'static str>,
    ) -> Self {
        Self {
            prompt,
            response,
            model,
            datetime: format_datetime(Local::now()),
            temperature: Some(temperature),
            error_kind,
        }
    }

    /// Whether the provider call succeeded.
    pub fn is_success(&self) -> bool {
        self.error_kind.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::DATETIME_FORMAT;
    use chrono::NaiveDateTime;

    #[test]
    fn test_datetime_format_round_trips() {
        let envelope = ResultEnvelope::new("p".into(), "r".into(), "m".into(), 5, None);
        assert!(NaiveDateTime::parse_from_str(&envelope.datetime, DATETIME_FORMAT).is_ok());
        assert_eq!(envelope.datetime.len(), "2024-01-01T12:00:00.000000".len());
        assert!(envelope.is_success());
    }
}
