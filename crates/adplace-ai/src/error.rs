//! AI client error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for AI client operations.
pub type AiResult<T> = Result<T, AiError>;

/// Errors from the external AI services.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} rate limited")]
    RateLimited {
        service: &'static str,
        retry_after_ms: Option<u64>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AiError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(
        service: &'static str,
        status: StatusCode,
        body: impl Into<String>,
        retry_after_ms: Option<u64>,
    ) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited {
                service,
                retry_after_ms,
            }
        } else {
            Self::Status {
                service,
                status: status.as_u16(),
                body: body.into(),
            }
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Server-requested delay before the next attempt.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }
}

/// Parse a `Retry-After` header given in seconds.
pub(crate) fn retry_after_header(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1000))
}

/// Turn a non-success response into an [`AiError`].
pub(crate) async fn error_for_status(
    service: &'static str,
    response: reqwest::Response,
) -> AiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let retry_after = retry_after_header(response.headers());
    let body = response.text().await.unwrap_or_default();
    Err(AiError::from_http_status(service, status, body, retry_after))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let err = AiError::from_http_status("gemini", StatusCode::TOO_MANY_REQUESTS, "", Some(2000));
        assert!(err.is_retryable());
        assert_eq!(err.retry_after_ms(), Some(2000));

        let err = AiError::from_http_status("gemini", StatusCode::BAD_GATEWAY, "upstream", None);
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "gemini returned 502: upstream");

        let err = AiError::from_http_status("twelvelabs", StatusCode::UNAUTHORIZED, "bad key", None);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_parse_errors_are_not_retryable() {
        assert!(!AiError::invalid_response("no candidates").is_retryable());
        assert!(!AiError::config("missing key").is_retryable());
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "3".parse().unwrap());
        assert_eq!(retry_after_header(&headers), Some(3000));

        headers.insert(reqwest::header::RETRY_AFTER, "soon".parse().unwrap());
        assert_eq!(retry_after_header(&headers), None);
    }
}
