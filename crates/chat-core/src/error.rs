//! Error types for provider calls.

use thiserror::Error;

/// Errors a provider backend can fail with.
///
/// The `Display` output doubles as the user-visible response text when a call
/// fails, so the transcript stays readable and appendable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider rejected the call because of rate limits or quota.
    #[error("Rate Limit Error: {0}")]
    RateLimited(String),

    /// The provider could not be reached.
    #[error("API Connection Error: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("API Status Error ({code}): {message}")]
    RemoteStatus { code: u16, message: String },

    /// Anything else (malformed response, empty completion, panics).
    #[error("Unexpected Error: {0}")]
    Unexpected(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status.
    ///
    /// 429 is reported as [`ProviderError::RateLimited`]; every other status
    /// keeps its code.
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == 429 {
            Self::RateLimited(message)
        } else {
            Self::RemoteStatus { code, message }
        }
    }

    /// Short machine-friendly name of the failure kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RateLimited(_) => "rate_limited",
            Self::Transport(_) => "transport",
            Self::RemoteStatus { .. } => "remote_status",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_rate_limit() {
        let err = ProviderError::from_status(429, "slow down");
        assert_eq!(err, ProviderError::RateLimited("slow down".to_string()));
        assert_eq!(err.kind(), "rate_limited");
    }

    #[test]
    fn test_from_status_other() {
        let err = ProviderError::from_status(500, "boom");
        assert_eq!(err.to_string(), "API Status Error (500): boom");
        assert_eq!(err.kind(), "remote_status");
    }

    #[test]
    fn test_display_is_response_text() {
        assert_eq!(
            ProviderError::Transport("dns failure".into()).to_string(),
            "API Connection Error: dns failure"
        );
        assert_eq!(
            ProviderError::Unexpected("no choices".into()).to_string(),
            "Unexpected Error: no choices"
        );
    }
}
