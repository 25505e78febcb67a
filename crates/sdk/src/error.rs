//! Error types for the Flock SDK.

use flock_core::limiter::RateLimitExceeded;
use flock_core::query::ValidationError;
use serde::Deserialize;
use std::time::Duration;

/// Result type for SDK operations.
pub type FlockResult<T> = Result<T, Error>;

/// Error taxonomy for client operations.
///
/// Retry policy by variant: `Validation` and `Unauthenticated` are never
/// retried; `Server` and `Network` have already been retried with bounded
/// backoff by the transport before surfacing; `RateLimited` carries the
/// wait after which a retry can succeed; `Client` means the query itself
/// is wrong and retrying is pointless.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad input, caught before any network call.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Local window exhausted past the bounded wait, or the remote kept
    /// answering 429.
    #[error("rate limited{}", retry_after_suffix(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// No credentials configured, or the remote rejected them (401/403).
    #[error("not authenticated: {0}")]
    Unauthenticated(String),

    /// Non-retryable 4xx from the remote.
    #[error("client error (status {status}): {message}")]
    Client { status: u16, message: String },

    /// 5xx that persisted through retries.
    #[error("server error (status {status}) after {attempts} attempts")]
    Server { status: u16, attempts: u32 },

    /// Network-level failure (timeout, connection reset) after retry.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Response body was not a valid JSON:API document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

fn retry_after_suffix(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(wait) => format!(", retry in {}s", wait.as_secs()),
        None => String::new(),
    }
}

impl From<RateLimitExceeded> for Error {
    fn from(rejection: RateLimitExceeded) -> Self {
        Self::RateLimited {
            retry_after: Some(rejection.retry_after),
        }
    }
}

impl Error {
    /// Stable kind string the tool surface reports, so a calling agent can
    /// branch on failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::RateLimited { .. } => "rate_limited",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Client { .. } => "client_error",
            Self::Server { .. } => "server_error",
            Self::Network(_) => "network_error",
            Self::Json(_) => "invalid_response",
            Self::InvalidUrl(_) => "config_error",
            Self::Config(_) => "config_error",
        }
    }

    /// Seconds to wait before a retry can succeed, when known.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// JSON:API error body: `{"errors": [{"title": ..., "detail": ...}]}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Extract a readable message from a JSON:API error body, falling back to
/// the raw body when it is not one.
pub(crate) fn message_from_body(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let messages: Vec<String> = parsed
            .errors
            .iter()
            .filter_map(|error| match (&error.title, &error.detail) {
                (Some(title), Some(detail)) => Some(format!("{title}: {detail}")),
                (Some(title), None) => Some(title.clone()),
                (None, Some(detail)) => Some(detail.clone()),
                (None, None) => None,
            })
            .collect();
        if !messages.is_empty() {
            return messages.join("; ");
        }
    }
    if body.trim().is_empty() {
        "(empty response body)".to_string()
    } else {
        body.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_api_error_bodies() {
        let body = r#"{"errors": [{"title": "Forbidden", "detail": "insufficient scope"}]}"#;
        assert_eq!(message_from_body(body), "Forbidden: insufficient scope");
    }

    #[test]
    fn falls_back_to_raw_body() {
        assert_eq!(message_from_body("teapot"), "teapot");
        assert_eq!(message_from_body("  "), "(empty response body)");
    }

    #[test]
    fn kinds_are_stable() {
        let err = Error::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert_eq!(err.kind(), "rate_limited");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));

        let err = Error::Unauthenticated("no credentials".into());
        assert_eq!(err.kind(), "unauthenticated");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn rate_limited_display_includes_wait() {
        let err = Error::RateLimited {
            retry_after: Some(Duration::from_secs(12)),
        };
        assert_eq!(err.to_string(), "rate limited, retry in 12s");
    }
}
