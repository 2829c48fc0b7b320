//! Application state.

use std::sync::Arc;

use adplace_ai::{
    AdMatchClient, AiConfig, AiError, AiResult, GenerativeTextClient, PersonaCatalog,
    PersonaPromptBuilder, VideoUnderstandingClient,
};
use adplace_scoring::ScoringConfig;
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::ReportSink;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub scoring: Arc<ScoringConfig>,
    pub catalog: Arc<PersonaCatalog>,
    pub prompts: Arc<PersonaPromptBuilder>,
    pub video: Option<Arc<VideoUnderstandingClient>>,
    pub text: Option<Arc<GenerativeTextClient>>,
    pub ad_match: Option<Arc<AdMatchClient>>,
    pub sink: ReportSink,
}

/// Build a client, treating missing credentials as "not configured".
fn optional_client<T>(name: &str, built: AiResult<T>) -> AiResult<Option<Arc<T>>> {
    match built {
        Ok(client) => Ok(Some(Arc::new(client))),
        Err(AiError::Config(reason)) => {
            warn!(client = name, %reason, "AI client disabled");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig, ai: &AiConfig) -> ApiResult<Self> {
        let scoring = ScoringConfig::from_optional_file(config.scoring_config_file.as_deref())?;
        let catalog = PersonaCatalog::load(&config.persona_file);
        let prompts = PersonaPromptBuilder::new(scoring.required_scores.clone());

        let video = optional_client("video_understanding", VideoUnderstandingClient::new(ai))?;
        let text = optional_client("generative_text", GenerativeTextClient::new(ai))?;
        let ad_match = optional_client("ad_match", AdMatchClient::new(ai))?;

        if config.ad_candidates.is_empty() {
            warn!("AD_VIDEOS is empty; placement runs will rank no candidates");
        }
        info!(
            personas = catalog.len(),
            ad_candidates = config.ad_candidates.len(),
            reference_video = %scoring.reference_video,
            "Application state ready"
        );

        Ok(Self {
            sink: ReportSink::new(config.output_dir.clone()),
            config,
            scoring: Arc::new(scoring),
            catalog: Arc::new(catalog),
            prompts: Arc::new(prompts),
            video,
            text,
            ad_match,
        })
    }

    pub fn video_client(&self) -> ApiResult<Arc<VideoUnderstandingClient>> {
        self.video
            .clone()
            .ok_or_else(|| ApiError::unavailable("video understanding service is not configured"))
    }

    pub fn text_client(&self) -> ApiResult<Arc<GenerativeTextClient>> {
        self.text
            .clone()
            .ok_or_else(|| ApiError::unavailable("generative text service is not configured"))
    }

    pub fn ad_match_client(&self) -> ApiResult<Arc<AdMatchClient>> {
        self.ad_match
            .clone()
            .ok_or_else(|| ApiError::unavailable("ad matching service is not configured"))
    }
}
