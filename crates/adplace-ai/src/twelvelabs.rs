//! Video-understanding client (TwelveLabs v1.3 API).
//!
//! Endpoints used:
//! - `POST /tasks` multipart upload into an index
//! - `GET /tasks/{id}` indexing status
//! - `POST /analyze` open-ended generation over a video
//! - `POST /summarize` summary generation

use std::time::Duration;

use adplace_models::{Persona, VideoId};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{require, AiConfig};
use crate::error::{error_for_status, AiError, AiResult};
use crate::prompts::{PersonaPromptBuilder, PersonaReply};
use crate::retry::{with_retry, RetryConfig};

const SERVICE: &str = "twelvelabs";

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    video_id: &'a str,
    prompt: &'a str,
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    data: String,
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    video_id: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    prompt: &'a str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    #[serde(default)]
    summary: String,
}

/// Result of an upload request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedVideo {
    #[serde(rename = "_id")]
    pub task_id: String,
    pub video_id: VideoId,
}

#[derive(Debug, Deserialize)]
struct TaskStatus {
    status: String,
}

/// Client for the video-understanding service.
#[derive(Debug, Clone)]
pub struct VideoUnderstandingClient {
    client: Client,
    upload_client: Client,
    api_key: String,
    base_url: String,
    index_id: Option<String>,
    temperature: f32,
    retry: RetryConfig,
}

impl VideoUnderstandingClient {
    pub fn new(config: &AiConfig) -> AiResult<Self> {
        let api_key = require(&config.twelvelabs.api_key, "TWELVELABS_API_KEY")?;
        Ok(Self {
            client: Client::builder().timeout(config.request_timeout).build()?,
            upload_client: Client::builder().timeout(config.upload_timeout).build()?,
            api_key,
            base_url: config.twelvelabs.base_url.trim_end_matches('/').to_string(),
            index_id: config.twelvelabs.index_id.clone(),
            temperature: config.twelvelabs.temperature,
            retry: config.retry.clone(),
        })
    }

    pub fn index_id(&self) -> Option<&str> {
        self.index_id.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Upload a video file into the configured index.
    pub async fn upload_video(&self, file_name: &str, bytes: Vec<u8>) -> AiResult<UploadedVideo> {
        let index_id = self
            .index_id
            .clone()
            .ok_or_else(|| AiError::config("TWELVELABS_INDEX_ID not set"))?;

        let size = bytes.len();
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new()
            .text("index_id", index_id)
            .part("video_file", part);

        info!(file_name, size, "Uploading video");
        let response = self
            .upload_client
            .post(self.url("tasks"))
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;
        let response = error_for_status(SERVICE, response).await?;
        let uploaded: UploadedVideo = response.json().await?;

        info!(task_id = %uploaded.task_id, video_id = %uploaded.video_id, "Video upload accepted");
        Ok(uploaded)
    }

    /// Poll an indexing task until it reports `ready`.
    pub async fn wait_until_ready(
        &self,
        task_id: &str,
        poll_interval: Duration,
        max_polls: u32,
    ) -> AiResult<()> {
        for poll in 0..max_polls {
            let response = self
                .client
                .get(self.url(&format!("tasks/{}", task_id)))
                .header("x-api-key", &self.api_key)
                .send()
                .await?;
            let task: TaskStatus = error_for_status(SERVICE, response).await?.json().await?;

            debug!(task_id, poll, status = %task.status, "Indexing status");
            match task.status.as_str() {
                "ready" => return Ok(()),
                "failed" => {
                    return Err(AiError::invalid_response(format!(
                        "indexing task {} failed",
                        task_id
                    )))
                }
                _ => tokio::time::sleep(poll_interval).await,
            }
        }
        Err(AiError::invalid_response(format!(
            "indexing task {} not ready after {} polls",
            task_id, max_polls
        )))
    }

    /// Open-ended generation over a video.
    pub async fn analyze(
        &self,
        video_id: &VideoId,
        prompt: &str,
        response_format: Option<Value>,
    ) -> AiResult<String> {
        with_retry(&self.retry, SERVICE, "analyze", || async {
            let request = AnalyzeRequest {
                video_id: video_id.as_str(),
                prompt,
                temperature: self.temperature,
                stream: false,
                response_format: response_format.clone(),
            };
            let response = self
                .client
                .post(self.url("analyze"))
                .header("x-api-key", &self.api_key)
                .json(&request)
                .send()
                .await?;
            let body: AnalyzeResponse = error_for_status(SERVICE, response).await?.json().await?;
            Ok(body.data)
        })
        .await
    }

    /// Summary of a video guided by a prompt.
    pub async fn summarize(&self, video_id: &VideoId, prompt: &str) -> AiResult<String> {
        with_retry(&self.retry, SERVICE, "summarize", || async {
            let request = SummarizeRequest {
                video_id: video_id.as_str(),
                kind: "summary",
                prompt,
                temperature: self.temperature,
            };
            let response = self
                .client
                .post(self.url("summarize"))
                .header("x-api-key", &self.api_key)
                .json(&request)
                .send()
                .await?;
            let body: SummarizeResponse =
                error_for_status(SERVICE, response).await?.json().await?;
            Ok(body.summary)
        })
        .await
    }

    /// Analyze a video from one persona's point of view.
    pub async fn analyze_persona(
        &self,
        video_id: &VideoId,
        persona: &Persona,
        prompts: &PersonaPromptBuilder,
    ) -> AiResult<PersonaReply> {
        let prompt = prompts.render(persona);
        let format = serde_json::json!({
            "type": "json_schema",
            "json_schema": prompts.response_schema(),
        });
        let text = self.analyze(video_id, &prompt, Some(format)).await?;
        Ok(PersonaReply::parse(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let err = VideoUnderstandingClient::new(&AiConfig::default()).unwrap_err();
        assert!(err.to_string().contains("TWELVELABS_API_KEY"));
    }

    #[test]
    fn test_uploaded_video_shape() {
        let uploaded: UploadedVideo =
            serde_json::from_str(r#"{"_id": "task1", "video_id": "vid1"}"#).unwrap();
        assert_eq!(uploaded.task_id, "task1");
        assert_eq!(uploaded.video_id.as_str(), "vid1");
    }
}
