//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return its render handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "adplace_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "adplace_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "adplace_http_requests_in_flight";

    // Pipeline metrics
    pub const PLACEMENT_RUNS_TOTAL: &str = "adplace_placement_runs_total";
    pub const PLACEMENT_DURATION_SECONDS: &str = "adplace_placement_duration_seconds";
    pub const PERSONA_ANALYSES_TOTAL: &str = "adplace_persona_analyses_total";
    pub const RANKED_CANDIDATES: &str = "adplace_ranked_candidates";

    pub const RATE_LIMIT_HITS_TOTAL: &str = "adplace_rate_limit_hits_total";
}

/// Routes served by the API. Anything else is labelled `other`.
const KNOWN_PATHS: [&str; 11] = [
    "/",
    "/health",
    "/healthz",
    "/ready",
    "/metrics",
    "/ad_placement",
    "/get_file_ad",
    "/rank",
    "/create-stitched-video",
    "/test-stitching",
    "/personas",
];

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a finished placement run.
pub fn record_placement_run(ok: bool, duration_secs: f64) {
    let labels = [("outcome", if ok { "success" } else { "error" }.to_string())];
    counter!(names::PLACEMENT_RUNS_TOTAL, &labels).increment(1);
    histogram!(names::PLACEMENT_DURATION_SECONDS).record(duration_secs);
}

/// Record one persona analysis outcome.
pub fn record_persona_analysis(category: &str, ok: bool) {
    let labels = [
        ("category", category.to_string()),
        ("status", if ok { "success" } else { "error" }.to_string()),
    ];
    counter!(names::PERSONA_ANALYSES_TOTAL, &labels).increment(1);
}

/// Number of candidates in the latest ranking.
pub fn set_ranked_candidates(count: usize) {
    gauge!(names::RANKED_CANDIDATES).set(count as f64);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Collapse unknown paths so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };
    if KNOWN_PATHS.contains(&trimmed) {
        trimmed.to_string()
    } else {
        "other".to_string()
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/ad_placement"), "/ad_placement");
        assert_eq!(sanitize_path("/rank/"), "/rank");
        assert_eq!(sanitize_path("/"), "/");
        assert_eq!(sanitize_path("/wp-admin/setup.php"), "other");
    }
}
