//! Stitching handlers.

use std::time::Instant;

use axum::Json;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use validator::Validate;

use adplace_models::{StitchingRequest, StitchingResponse};

/// Lay the requested sequence out on a stitched timeline.
///
/// Invalid requests get an unsuccessful response body rather than an
/// error status.
pub async fn create_stitched_video(Json(request): Json<StitchingRequest>) -> Json<StitchingResponse> {
    let started = Instant::now();

    if let Err(e) = request.validate() {
        warn!(error = %e, "Rejected stitching request");
        let mut metadata = Map::new();
        metadata.insert("error".to_string(), Value::String(e.to_string()));
        return Json(StitchingResponse::failure(metadata));
    }

    let now = Utc::now();
    let id = StitchingResponse::new_id(now);
    let response = request.process(&id, started.elapsed(), now);

    info!(
        stitched_video_id = %id,
        items = response.sequence.len(),
        ad_segments = request.ad_segments.len(),
        "Stitched video timeline"
    );
    Json(response)
}

pub async fn test_stitching() -> Json<Value> {
    Json(json!({
        "message": "Stitching API is working!",
        "endpoint": "/create-stitched-video",
        "method": "POST",
        "status": "ready",
    }))
}
