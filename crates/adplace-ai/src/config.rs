//! AI service configuration.

use std::time::Duration;

use crate::error::{AiError, AiResult};
use crate::retry::RetryConfig;

pub const DEFAULT_TWELVELABS_URL: &str = "https://api.twelvelabs.io/v1.3";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_BEDROCK_REGION: &str = "us-east-1";
pub const DEFAULT_BEDROCK_MODEL: &str = "openai.gpt-oss-120b-1:0";

/// Gemini models tried in order until one answers.
pub const DEFAULT_GEMINI_MODELS: [&str; 3] =
    ["gemini-2.5-flash", "gemini-2.5-flash-lite", "gemini-2.5-pro"];

/// Video-understanding service settings.
#[derive(Debug, Clone)]
pub struct TwelveLabsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub index_id: Option<String>,
    /// Sampling temperature for persona analyses
    pub temperature: f32,
}

/// Generative text service settings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: Vec<String>,
}

/// Ad-matching LLM settings.
#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub bearer_token: Option<String>,
    pub region: String,
    pub model_id: String,
    /// Overrides the regional runtime endpoint
    pub endpoint: Option<String>,
}

impl BedrockConfig {
    pub fn runtime_url(&self) -> String {
        match &self.endpoint {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region),
        }
    }
}

/// All AI client settings.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub twelvelabs: TwelveLabsConfig,
    pub gemini: GeminiConfig,
    pub bedrock: BedrockConfig,
    pub request_timeout: Duration,
    /// Uploads wait on indexing, so they get a longer timeout
    pub upload_timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            twelvelabs: TwelveLabsConfig {
                api_key: None,
                base_url: DEFAULT_TWELVELABS_URL.to_string(),
                index_id: None,
                temperature: 0.3,
            },
            gemini: GeminiConfig {
                api_key: None,
                base_url: DEFAULT_GEMINI_URL.to_string(),
                models: DEFAULT_GEMINI_MODELS.iter().map(|m| m.to_string()).collect(),
            },
            bedrock: BedrockConfig {
                bearer_token: None,
                region: DEFAULT_BEDROCK_REGION.to_string(),
                model_id: DEFAULT_BEDROCK_MODEL.to_string(),
                endpoint: None,
            },
            request_timeout: Duration::from_secs(120),
            upload_timeout: Duration::from_secs(600),
            retry: RetryConfig::default(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    non_empty_env(key).unwrap_or_else(|| default.to_string())
}

impl AiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let models = non_empty_env("GEMINI_MODELS")
            .map(|raw| {
                raw.split(',')
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|m| !m.is_empty())
            .unwrap_or(defaults.gemini.models);

        let timeout_secs = |key: &str, default: Duration| {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            twelvelabs: TwelveLabsConfig {
                api_key: non_empty_env("TWELVELABS_API_KEY"),
                base_url: env_or("TWELVELABS_BASE_URL", DEFAULT_TWELVELABS_URL),
                index_id: non_empty_env("TWELVELABS_INDEX_ID"),
                temperature: std::env::var("TWELVELABS_TEMPERATURE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.twelvelabs.temperature),
            },
            gemini: GeminiConfig {
                api_key: non_empty_env("GEMINI_API_KEY"),
                base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_URL),
                models,
            },
            bedrock: BedrockConfig {
                bearer_token: non_empty_env("AWS_BEARER_TOKEN_BEDROCK"),
                region: env_or("BEDROCK_REGION", DEFAULT_BEDROCK_REGION),
                model_id: env_or("BEDROCK_MODEL_ID", DEFAULT_BEDROCK_MODEL),
                endpoint: non_empty_env("BEDROCK_ENDPOINT"),
            },
            request_timeout: timeout_secs("AI_REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            upload_timeout: timeout_secs("AI_UPLOAD_TIMEOUT_SECS", defaults.upload_timeout),
            retry: RetryConfig::from_env(),
        }
    }

    /// Point every client at one base URL. Used with mock servers.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        self.twelvelabs.base_url = base.clone();
        self.gemini.base_url = base.clone();
        self.bedrock.endpoint = Some(base);
        self
    }

    pub fn video_understanding_configured(&self) -> bool {
        self.twelvelabs.api_key.is_some()
    }

    pub fn generative_text_configured(&self) -> bool {
        self.gemini.api_key.is_some()
    }

    pub fn ad_match_configured(&self) -> bool {
        self.bedrock.bearer_token.is_some()
    }
}

/// Fetch a required secret, naming the variable when absent.
pub(crate) fn require(value: &Option<String>, name: &str) -> AiResult<String> {
    value
        .clone()
        .ok_or_else(|| AiError::config(format!("{} not set", name)))
}
