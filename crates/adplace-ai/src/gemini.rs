//! Generative text client (Gemini `generateContent`).
//!
//! Each call walks the configured model list and returns the first
//! successful answer.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{require, AiConfig};
use crate::error::{error_for_status, AiError, AiResult};
use crate::prompts::{ad_category_prompt, emotion_csv_prompt, parse_json_reply, strip_code_fence};
use crate::retry::{with_retry, RetryConfig};

const SERVICE: &str = "gemini";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Ad categories suggested for the key frames of a video.
#[derive(Debug, Clone, PartialEq)]
pub struct AdCategories {
    /// Parsed JSON when the model returned JSON, otherwise the raw text
    pub value: Value,
}

impl AdCategories {
    /// Text form handed to later prompts.
    pub fn as_prompt_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Client for the generative text service.
#[derive(Debug, Clone)]
pub struct GenerativeTextClient {
    client: Client,
    api_key: String,
    base_url: String,
    models: Vec<String>,
    retry: RetryConfig,
}

impl GenerativeTextClient {
    pub fn new(config: &AiConfig) -> AiResult<Self> {
        let api_key = require(&config.gemini.api_key, "GEMINI_API_KEY")?;
        if config.gemini.models.is_empty() {
            return Err(AiError::config("GEMINI_MODELS is empty"));
        }
        Ok(Self {
            client: Client::builder().timeout(config.request_timeout).build()?,
            api_key,
            base_url: config.gemini.base_url.trim_end_matches('/').to_string(),
            models: config.gemini.models.clone(),
            retry: config.retry.clone(),
        })
    }

    /// Generate text, falling back through the model list.
    pub async fn generate(&self, prompt: &str, json: bool) -> AiResult<String> {
        let mut last_error = None;

        for model in &self.models {
            info!(model = %model, "Calling Gemini");
            match self.call_model(model, prompt, json).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(model = %model, "Gemini model failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AiError::invalid_response("All Gemini models failed")))
    }

    async fn call_model(&self, model: &str, prompt: &str, json: bool) -> AiResult<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        with_retry(&self.retry, SERVICE, "generate", || async {
            let request = GeminiRequest {
                contents: vec![Content {
                    parts: vec![Part {
                        text: prompt.to_string(),
                    }],
                }],
                generation_config: json.then(|| GenerationConfig {
                    response_mime_type: "application/json".to_string(),
                }),
            };

            let response = self
                .client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&request)
                .send()
                .await?;
            let body: GeminiResponse = error_for_status(SERVICE, response).await?.json().await?;

            body.candidates
                .into_iter()
                .next()
                .and_then(|c| c.content.parts.into_iter().next())
                .map(|p| p.text)
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| AiError::invalid_response("No content in Gemini response"))
        })
        .await
    }

    /// Suggest ad categories for a key-frame description.
    pub async fn ad_categories(&self, key_frames: &str) -> AiResult<AdCategories> {
        let text = self.generate(&ad_category_prompt(key_frames), true).await?;
        let value = parse_json_reply(&text).unwrap_or_else(|| Value::String(text.trim().to_string()));
        Ok(AdCategories { value })
    }

    /// Turn an emotion chaptering into a CSV timeline.
    pub async fn emotion_csv(&self, chapters: &str) -> AiResult<String> {
        let text = self.generate(&emotion_csv_prompt(chapters), false).await?;
        Ok(strip_code_fence(&text).to_string())
    }
}
