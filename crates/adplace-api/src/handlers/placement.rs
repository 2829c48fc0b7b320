//! Placement run and ad upload handlers.

use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use adplace_models::VideoId;

use crate::error::{ApiError, ApiResult};
use crate::services::{index_upload, PlacementPipeline};
use crate::state::AppState;

const NO_INPUT_MESSAGE: &str = "No file or video_id provided. Either provide one of them";

#[derive(Debug, Default, Deserialize)]
pub struct PlacementQuery {
    #[serde(default)]
    pub video_id: Option<String>,
}

/// An uploaded video file.
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

enum VideoSource {
    Upload(Upload),
    Indexed(VideoId),
}

/// Take the `file` field of a multipart body, if present and non-empty.
async fn read_upload(multipart: Option<Multipart>) -> ApiResult<Option<Upload>> {
    let Some(mut multipart) = multipart else {
        return Ok(None);
    };

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.mp4").to_string();
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(Upload {
            file_name,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// Run a full placement over an uploaded file or an indexed video id.
///
/// An uploaded file takes precedence over `video_id`.
pub async fn ad_placement(
    State(state): State<AppState>,
    Query(query): Query<PlacementQuery>,
    multipart: Option<Multipart>,
) -> ApiResult<Json<Value>> {
    let upload = read_upload(multipart).await?;
    let video_id = query
        .video_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let source = match (upload, video_id) {
        (Some(upload), _) => VideoSource::Upload(upload),
        (None, Some(id)) => VideoSource::Indexed(VideoId::from(id)),
        (None, None) => return Ok(Json(json!({ "result": NO_INPUT_MESSAGE }))),
    };

    let pipeline = PlacementPipeline::from_state(&state)?;
    let video_id = match source {
        VideoSource::Upload(upload) => {
            info!(file_name = %upload.file_name, size = upload.bytes.len(), "Placement for uploaded file");
            pipeline.upload(&upload.file_name, upload.bytes).await?
        }
        VideoSource::Indexed(id) => id,
    };

    let outcome = pipeline.run(video_id).await?;
    Ok(Json(json!({ "result": outcome })))
}

/// Upload an ad video and return its id.
pub async fn get_file_ad(
    State(state): State<AppState>,
    multipart: Option<Multipart>,
) -> ApiResult<Json<Value>> {
    let upload = read_upload(multipart)
        .await?
        .ok_or_else(|| ApiError::bad_request("multipart field `file` is required"))?;

    let video = state.video_client()?;
    let ad_id = index_upload(&video, &state.config, &upload.file_name, upload.bytes).await?;
    info!(ad_id = %ad_id, "Ad video indexed");

    Ok(Json(json!({ "result": { "ad_id": ad_id } })))
}
