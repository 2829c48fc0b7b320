//! Retry policy with exponential backoff and jitter.
//!
//! Retries network errors, HTTP 429 (honoring Retry-After) and 5xx.
//! Other 4xx responses and parse failures fail immediately.

use std::future::Future;
use std::time::{Duration, Instant, SystemTime};

use tracing::{info_span, warn, Instrument};

use crate::error::AiResult;
use crate::metrics::{record_call, record_retry};

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 250,
            max_delay_ms: 8000,
        }
    }
}

impl RetryConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: env_parse("AI_RETRY_MAX", defaults.max_retries),
            base_delay_ms: env_parse("AI_RETRY_BASE_MS", defaults.base_delay_ms),
            max_delay_ms: env_parse("AI_RETRY_MAX_MS", defaults.max_delay_ms),
        }
    }

    /// No retries; used by tests that assert on single failures.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Run an async operation, retrying transient failures.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    service: &'static str,
    operation: &'static str,
    op: F,
) -> AiResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = AiResult<T>>,
{
    let started = Instant::now();
    let mut attempt = 0;

    let result = loop {
        let span = info_span!("ai_call", service, operation, attempt = attempt + 1);

        match op().instrument(span).await {
            Ok(value) => break Ok(value),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                let delay = calculate_delay(config, attempt, e.retry_after_ms());
                warn!(
                    service,
                    operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "AI call failed, retrying: {}",
                    e
                );
                record_retry(service, operation);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => break Err(e),
        }
    };

    record_call(
        service,
        operation,
        result.is_ok(),
        started.elapsed().as_secs_f64(),
    );
    result
}

/// Exponential backoff with full jitter, floored at the base delay.
fn calculate_delay(config: &RetryConfig, attempt: u32, retry_after_ms: Option<u64>) -> Duration {
    if let Some(after) = retry_after_ms {
        return Duration::from_millis(after);
    }

    let exp_delay = config
        .base_delay_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    let capped = exp_delay.min(config.max_delay_ms);

    // time-based jitter, no rand dependency
    let jittered = if capped > 0 {
        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        let factor = (nanos % 1000) as f64 / 1000.0;
        ((capped as f64) * factor) as u64
    } else {
        0
    };

    Duration::from_millis(jittered.max(config.base_delay_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AiError;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 2,
        }
    }

    #[test]
    fn test_delay_respects_cap_and_floor() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 400,
        };
        for attempt in 0..10 {
            let delay = calculate_delay(&config, attempt, None);
            assert!(delay.as_millis() >= 100);
            assert!(delay.as_millis() <= 400);
        }
    }

    #[test]
    fn test_delay_honors_retry_after() {
        let delay = calculate_delay(&RetryConfig::default(), 0, Some(1500));
        assert_eq!(delay, Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast(), "test", "op", || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AiError::from_http_status("test", StatusCode::SERVICE_UNAVAILABLE, "", None))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: AiResult<()> = with_retry(&fast(), "test", "op", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AiError::from_http_status("test", StatusCode::BAD_REQUEST, "bad", None))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: AiResult<()> = with_retry(&fast(), "test", "op", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AiError::from_http_status("test", StatusCode::INTERNAL_SERVER_ERROR, "", None))
        })
        .await;

        assert!(matches!(result, Err(AiError::Status { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
