//! AI service call metrics.

use metrics::{counter, histogram};

pub mod names {
    /// Calls by service, operation and outcome.
    pub const CALLS_TOTAL: &str = "adplace_ai_calls_total";

    /// Retry attempts by service and operation.
    pub const RETRIES_TOTAL: &str = "adplace_ai_retries_total";

    /// Call latency in seconds.
    pub const LATENCY_SECONDS: &str = "adplace_ai_latency_seconds";
}

/// Record a finished call, including all of its retries.
pub fn record_call(service: &'static str, operation: &'static str, ok: bool, latency_secs: f64) {
    counter!(
        names::CALLS_TOTAL,
        "service" => service,
        "operation" => operation,
        "outcome" => if ok { "ok" } else { "error" }
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "service" => service,
        "operation" => operation
    )
    .record(latency_secs);
}

pub fn record_retry(service: &'static str, operation: &'static str) {
    counter!(
        names::RETRIES_TOTAL,
        "service" => service,
        "operation" => operation
    )
    .increment(1);
}
