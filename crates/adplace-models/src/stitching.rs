//! Stitching request/response models.
//!
//! No media is rendered. Stitching lays the requested sequence end to end
//! on a fresh timeline and reports the resulting timestamps.

use std::time::Duration;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

/// An ad segment offered for insertion.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdSegment {
    pub id: String,
    #[serde(default)]
    pub ad_data: Map<String, Value>,
    pub duration: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One entry in the requested playback order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SequenceItem {
    pub id: String,
    #[serde(default)]
    pub order: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl SequenceItem {
    /// Length of the source span; reversed spans count as empty.
    pub fn span(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }
}

/// Request to stitch ads into the main video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StitchingRequest {
    #[serde(default)]
    pub main_video: Map<String, Value>,
    #[serde(default)]
    pub ad_segments: Vec<AdSegment>,
    #[validate(length(min = 1, message = "sequence must not be empty"))]
    #[serde(default)]
    pub sequence: Vec<SequenceItem>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A sequence entry placed on the stitched timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSequenceItem {
    pub id: String,
    pub order: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub processed: bool,
}

/// Summary of the stitched output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResults {
    pub video_segments: usize,
    pub ad_segments: usize,
    pub transitions: usize,
    pub quality: String,
    pub format: String,
    pub codec: String,
    pub total_duration: f64,
    pub processing_time: String,
}

/// Stitching response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StitchingResponse {
    pub success: bool,
    pub stitched_video_id: String,
    pub stitched_video_url: String,
    pub sequence: Vec<ProcessedSequenceItem>,
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_results: Option<ProcessingResults>,
}

impl StitchingResponse {
    /// Generate an id of the form `stitched_<unix>_<8 hex>`.
    pub fn new_id(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("stitched_{}_{}", now.timestamp(), &suffix[..8])
    }

    /// Unsuccessful response, optionally carrying error metadata.
    pub fn failure(metadata: Map<String, Value>) -> Self {
        Self {
            success: false,
            stitched_video_id: String::new(),
            stitched_video_url: String::new(),
            sequence: Vec::new(),
            metadata,
            processing_results: None,
        }
    }
}

fn format_processing_time(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

impl StitchingRequest {
    /// Place every sequence item back to back on a new timeline.
    pub fn layout(&self) -> (Vec<ProcessedSequenceItem>, f64) {
        let mut total = 0.0;
        let items = self
            .sequence
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let start = total;
                let end = start + item.span();
                total = end;
                ProcessedSequenceItem {
                    id: item.id.clone(),
                    order: i,
                    kind: item.kind.clone(),
                    start_time: start,
                    end_time: end,
                    duration: end - start,
                    processed: true,
                }
            })
            .collect();
        (items, total)
    }

    /// Build the full response for an accepted request.
    pub fn process(
        &self,
        stitched_video_id: &str,
        elapsed: Duration,
        now: DateTime<Utc>,
    ) -> StitchingResponse {
        if self.main_video.is_empty() || self.sequence.is_empty() {
            return StitchingResponse::failure(Map::new());
        }

        let (sequence, total_duration) = self.layout();
        let processing_time = format_processing_time(elapsed);

        let count_kind = |kind: &str| self.sequence.iter().filter(|s| s.kind == kind).count();

        let processing_results = ProcessingResults {
            video_segments: count_kind("video"),
            ad_segments: count_kind("ad"),
            transitions: self.sequence.len().saturating_sub(1),
            quality: "1080p".to_string(),
            format: "mp4".to_string(),
            codec: "h264".to_string(),
            total_duration,
            processing_time: processing_time.clone(),
        };

        let mut metadata = self.metadata.clone();
        metadata.insert("totalDuration".to_string(), Value::from(total_duration));
        metadata.insert("processingTime".to_string(), Value::from(processing_time));
        metadata.insert(
            "timestamp".to_string(),
            Value::from(now.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()),
        );
        metadata.insert(
            "stitchedVideoId".to_string(),
            Value::from(stitched_video_id.to_string()),
        );

        let stitched_video_url = self
            .main_video
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        StitchingResponse {
            success: true,
            stitched_video_id: stitched_video_id.to_string(),
            stitched_video_url,
            sequence,
            metadata,
            processing_results: Some(processing_results),
        }
    }
}
