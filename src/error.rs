//! Error types for a trending run.
//!
//! Every failure of the core surfaces as one of three variants. None of them
//! are retried and none are downgraded to partial results.

use thiserror::Error;

/// Errors that can end a trending run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrendingError {
    /// The recency token is not part of the active backend's vocabulary.
    #[error("unknown period value: {0}")]
    InvalidPeriod(String),

    /// Transport failure, timeout, or a non-2xx response.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The response did not have the expected shape.
    #[error("unexpected response structure: {0}")]
    Parse(String),
}

impl TrendingError {
    /// Build a `Fetch` error from a reqwest failure.
    pub fn fetch(url: impl Into<String>, err: &reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        TrendingError::Fetch {
            url: url.into(),
            reason,
        }
    }
}
