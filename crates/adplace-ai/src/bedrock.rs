//! Ad-matching client (Bedrock Converse API with a bearer token).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::{require, AiConfig};
use crate::error::{error_for_status, AiError, AiResult};
use crate::prompts::{ad_match_prompt, parse_json_reply};
use crate::retry::{with_retry, RetryConfig};

const SERVICE: &str = "bedrock";

#[derive(Debug, Serialize)]
struct ConverseRequest<'a> {
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<TextBlock<'a>>,
}

#[derive(Debug, Serialize)]
struct TextBlock<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConverseResponse {
    output: ConverseOutput,
}

#[derive(Debug, Deserialize)]
struct ConverseOutput {
    message: OutputMessage,
}

#[derive(Debug, Deserialize)]
struct OutputMessage {
    #[serde(default)]
    content: Vec<Value>,
}

impl ConverseResponse {
    /// First text block. Reasoning models put a reasoning block before it.
    fn text(&self) -> Option<&str> {
        self.output
            .message
            .content
            .iter()
            .find_map(|block| block.get("text").and_then(Value::as_str))
    }
}

/// Client for the ad-matching LLM.
#[derive(Debug, Clone)]
pub struct AdMatchClient {
    client: Client,
    bearer_token: String,
    converse_url: Url,
    retry: RetryConfig,
}

impl AdMatchClient {
    pub fn new(config: &AiConfig) -> AiResult<Self> {
        let bearer_token = require(&config.bedrock.bearer_token, "AWS_BEARER_TOKEN_BEDROCK")?;

        let mut converse_url = Url::parse(&config.bedrock.runtime_url())
            .map_err(|e| AiError::config(format!("invalid Bedrock endpoint: {}", e)))?;
        converse_url
            .path_segments_mut()
            .map_err(|_| AiError::config("Bedrock endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend(["model", config.bedrock.model_id.as_str(), "converse"]);

        Ok(Self {
            client: Client::builder().timeout(config.request_timeout).build()?,
            bearer_token,
            converse_url,
            retry: config.retry.clone(),
        })
    }

    /// Send one user message and return the reply text.
    pub async fn converse(&self, prompt: &str) -> AiResult<String> {
        with_retry(&self.retry, SERVICE, "converse", || async {
            let request = ConverseRequest {
                messages: vec![Message {
                    role: "user",
                    content: vec![TextBlock { text: prompt }],
                }],
            };
            let response = self
                .client
                .post(self.converse_url.clone())
                .bearer_auth(&self.bearer_token)
                .json(&request)
                .send()
                .await?;
            let body: ConverseResponse = error_for_status(SERVICE, response).await?.json().await?;
            body.text()
                .map(str::to_string)
                .ok_or_else(|| AiError::invalid_response("No text block in Converse response"))
        })
        .await
    }

    /// Ask whether a product fits any segment of the emotion timeline.
    ///
    /// Returns parsed JSON when the reply is JSON, otherwise the raw text.
    pub async fn suggest_placement(
        &self,
        product: &str,
        segments_csv: &str,
        categories: &str,
    ) -> AiResult<Value> {
        let text = self
            .converse(&ad_match_prompt(product, segments_csv, categories))
            .await?;
        debug!(product, chars = text.len(), "Placement suggestion received");
        Ok(parse_json_reply(&text).unwrap_or_else(|| Value::String(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converse_url() {
        let mut config = AiConfig::default();
        config.bedrock.bearer_token = Some("token".to_string());
        let client = AdMatchClient::new(&config).unwrap();
        assert_eq!(
            client.converse_url.as_str(),
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/openai.gpt-oss-120b-1:0/converse"
        );
    }

    #[test]
    fn test_text_skips_reasoning_block() {
        let response: ConverseResponse = serde_json::from_value(serde_json::json!({
            "output": {"message": {"role": "assistant", "content": [
                {"reasoningContent": {"reasoningText": {"text": "thinking"}}},
                {"text": "{\"fit\": true}"}
            ]}}
        }))
        .unwrap();
        assert_eq!(response.text(), Some("{\"fit\": true}"));
    }
}
