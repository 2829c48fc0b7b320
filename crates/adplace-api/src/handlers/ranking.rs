//! Ranking over caller-supplied analyses.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use adplace_models::VideoRecord;
use adplace_scoring::{
    rescore_videos, score_videos, validate_videos, AdRankingReport, RankingWeights,
};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Videos with their persona analyses plus optional overrides.
#[derive(Debug, Deserialize, Validate)]
pub struct RankRequest {
    #[validate(length(max = 1000, message = "too many videos"))]
    pub videos: Vec<VideoRecord>,

    /// Name of the video ads are placed into
    #[validate(length(min = 1, max = 256))]
    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub weights: Option<RankingWeights>,

    #[serde(default)]
    pub normalize: Option<bool>,
}

/// Score and rank the candidates without calling any external service.
///
/// Supplied `overall_score` values are ignored. Each analysis is rescored
/// from its sub-scores before ranking.
pub async fn rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> ApiResult<Json<AdRankingReport>> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validate_videos(&request.videos)?;

    let mut config = (*state.scoring).clone();
    if let Some(reference) = request.reference {
        config.reference_video = reference;
    }
    if let Some(weights) = request.weights {
        config.weights = weights;
    }
    if let Some(normalize) = request.normalize {
        config.normalize = normalize;
    }
    config.validate()?;

    let mut videos = request.videos;
    rescore_videos(&mut videos, &config.required_scores);

    let report = score_videos(&videos, &config);
    metrics::set_ranked_candidates(report.final_ranking.len());
    info!(
        videos = videos.len(),
        ranked = report.final_ranking.len(),
        "Ranking request served"
    );

    Ok(Json(report))
}
