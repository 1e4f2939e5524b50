//! Error types for the API client

use serde_json::Value;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
///
/// Every failure is surfaced to the immediate caller exactly once; nothing in
/// this crate retries, and no variant is fatal at the process level.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The call exceeded its deadline. Carries no status by contract.
    #[error("Request timeout")]
    Timeout,

    /// The origin answered with a non-2xx status
    #[error("{message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Message extracted from the error payload, or synthesized
        message: String,
        /// Parsed error payload, when the origin sent one
        data: Option<Value>,
    },

    /// Transport-level failure (DNS, connection refusal, malformed body)
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record came back without its native key or a canonical `id`
    #[error("record has no '{0}' field to derive an id from")]
    MissingKey(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation is deliberately not implemented
    #[error("{0} is not supported by this adapter")]
    Unsupported(&'static str),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify a non-2xx response into an [`ApiError::Http`]
    ///
    /// The message is taken from the payload's `message` field, then its
    /// `error` field, then synthesized as `HTTP Error: <status>`.
    #[must_use]
    pub fn http(status: u16, payload: Option<Value>) -> Self {
        let message = payload
            .as_ref()
            .and_then(|body| {
                body.get("message")
                    .or_else(|| body.get("error"))
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
            })
            .unwrap_or_else(|| format!("HTTP Error: {status}"));

        Self::Http {
            status,
            message,
            data: payload,
        }
    }

    /// HTTP status code, when this error carries one
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed error payload, when the origin sent one
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Http { data, .. } => data.as_ref(),
            _ => None,
        }
    }

    /// Check if this error is a timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if *status >= 500)
    }

    /// Check if this is a "not found" response
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
