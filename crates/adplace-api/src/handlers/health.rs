//! Health, readiness and informational handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the FastAPI model API!" }))
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub video_understanding: CheckStatus,
    pub generative_text: CheckStatus,
    pub ad_match: CheckStatus,
    pub persona_catalog: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckStatus {
    fn from_flag(ok: bool, reason: &str) -> Self {
        if ok {
            Self {
                status: "ok".to_string(),
                error: None,
            }
        } else {
            Self {
                status: "error".to_string(),
                error: Some(reason.to_string()),
            }
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Readiness check endpoint (readiness probe).
///
/// Reports which AI services have credentials and whether personas loaded.
/// Ranking and stitching work regardless; placement runs need all of it.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let checks = ReadinessChecks {
        video_understanding: CheckStatus::from_flag(state.video.is_some(), "not configured"),
        generative_text: CheckStatus::from_flag(state.text.is_some(), "not configured"),
        ad_match: CheckStatus::from_flag(state.ad_match.is_some(), "not configured"),
        persona_catalog: CheckStatus::from_flag(!state.catalog.is_empty(), "no personas loaded"),
    };

    let all_ok = checks.video_understanding.is_ok()
        && checks.generative_text.is_ok()
        && checks.ad_match.is_ok()
        && checks.persona_catalog.is_ok();

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks,
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Loaded personas and their categories.
pub async fn list_personas(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "personas": state.catalog.personas(),
        "categories": state.catalog.categories(),
        "required_scores": state.prompts.required_scores(),
    }))
}
