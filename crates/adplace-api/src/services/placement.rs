//! The end-to-end ad placement run.
//!
//! 1. Emotion chaptering and key frames for the main video
//! 2. Ad categories and an emotion CSV timeline from those texts
//! 3. Persona analyses over the main video and every ad candidate
//! 4. Contextual ranking of the candidates
//! 5. One placement suggestion per ranked candidate

use std::sync::Arc;
use std::time::{Duration, Instant};

use adplace_ai::prompts::{EMOTION_CHAPTER_PROMPT, KEY_FRAMES_PROMPT};
use adplace_ai::{AdMatchClient, GenerativeTextClient, VideoUnderstandingClient};
use adplace_models::{AdPlacementSuggestion, VideoId, VideoRecord, VideoRole};
use adplace_scoring::{
    score_videos, validate_videos, PersonaScoreExtractor, RankingEntry, ScoringConfig,
};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, Instrument};

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::metrics;
use crate::services::{PersonaAnalyzer, ReportSink, RunLogger};
use crate::state::AppState;

/// Result body of a placement run.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementOutcome {
    pub video_id: VideoId,
    /// Emotion chaptering of the main video
    pub emotion: String,
    /// Emotion timeline as CSV
    pub emotion_graph: String,
    pub ad_categories: Value,
    pub ranking: Vec<RankingEntry>,
    pub ad_placement_report: Vec<AdPlacementSuggestion>,
}

/// Upload a video file and wait until it is indexed.
pub async fn index_upload(
    video: &VideoUnderstandingClient,
    config: &ApiConfig,
    file_name: &str,
    bytes: Vec<u8>,
) -> ApiResult<VideoId> {
    let uploaded = video.upload_video(file_name, bytes).await?;
    video
        .wait_until_ready(
            &uploaded.task_id,
            Duration::from_millis(config.index_poll_interval_ms),
            config.index_max_polls,
        )
        .await?;
    Ok(uploaded.video_id)
}

/// All collaborators of a placement run.
pub struct PlacementPipeline {
    video: Arc<VideoUnderstandingClient>,
    text: Arc<GenerativeTextClient>,
    ad_match: Arc<AdMatchClient>,
    analyzer: PersonaAnalyzer,
    scoring: Arc<ScoringConfig>,
    sink: ReportSink,
    config: ApiConfig,
}

impl PlacementPipeline {
    /// Fails with 503 when any AI client is not configured.
    pub fn from_state(state: &AppState) -> ApiResult<Self> {
        let video = state.video_client()?;
        Ok(Self {
            analyzer: PersonaAnalyzer::new(
                Arc::clone(&video),
                Arc::clone(&state.catalog),
                Arc::clone(&state.prompts),
                state.config.analysis_concurrency,
            ),
            video,
            text: state.text_client()?,
            ad_match: state.ad_match_client()?,
            scoring: Arc::clone(&state.scoring),
            sink: state.sink.clone(),
            config: state.config.clone(),
        })
    }

    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<VideoId> {
        index_upload(&self.video, &self.config, file_name, bytes).await
    }

    /// Main video first, then the configured ad candidates.
    fn targets(&self, video_id: &VideoId) -> Vec<VideoRecord> {
        let main = VideoRecord::new(video_id.clone(), &self.scoring.reference_video, VideoRole::Main)
            .with_description(&self.config.main_video_description);

        std::iter::once(main)
            .chain(self.config.ad_candidates.iter().map(|ad| {
                let record = VideoRecord::new(ad.id.clone(), &ad.name, VideoRole::Ad);
                match &ad.description {
                    Some(d) => record.with_description(d),
                    None => record,
                }
            }))
            .collect()
    }

    pub async fn run(&self, video_id: VideoId) -> ApiResult<PlacementOutcome> {
        let logger = RunLogger::new(video_id.as_str());
        let started = Instant::now();

        let result = self.execute(&logger, video_id).instrument(logger.span()).await;

        metrics::record_placement_run(result.is_ok(), started.elapsed().as_secs_f64());
        match &result {
            Ok(outcome) => logger.log_completion(&format!(
                "{} candidates ranked in {:.1}s",
                outcome.ranking.len(),
                started.elapsed().as_secs_f64()
            )),
            Err(e) => logger.log_error(&e.to_string()),
        }
        result
    }

    async fn execute(&self, logger: &RunLogger, video_id: VideoId) -> ApiResult<PlacementOutcome> {
        logger.log_start("emotion chaptering and key frames");
        let (emotion, key_frames) = tokio::try_join!(
            self.video.analyze(&video_id, EMOTION_CHAPTER_PROMPT, None),
            self.video.analyze(&video_id, KEY_FRAMES_PROMPT, None),
        )?;

        logger.log_step("timeline", "ad categories and emotion timeline");
        let (categories, emotion_csv) = tokio::try_join!(
            self.text.ad_categories(&key_frames),
            self.text.emotion_csv(&emotion),
        )?;

        logger.log_step("personas", "persona analyses");
        let analysis = self.analyzer.analyze_videos(self.targets(&video_id)).await;
        let affinity =
            PersonaScoreExtractor::new(&self.scoring).affinity_metrics(&analysis.video_analyses);
        let analysis = analysis.with_affinity_metrics(affinity);
        self.sink.write_analysis(&analysis).await?;

        validate_videos(&analysis.video_analyses)?;
        let report = score_videos(&analysis.video_analyses, &self.scoring);
        self.sink.write_report(&report).await?;
        debug!("{}", report.summary_text());
        metrics::set_ranked_candidates(report.final_ranking.len());
        if report.analysis_metadata.missing_reference {
            logger.log_warning("main video produced no content text; nothing ranked");
        }

        logger.log_step("suggestions", "placement suggestions");
        let category_text = categories.as_prompt_text();
        let suggestions = self
            .suggest(&report.final_ranking, &emotion_csv, &category_text, logger)
            .await;

        Ok(PlacementOutcome {
            video_id,
            emotion,
            emotion_graph: emotion_csv,
            ad_categories: categories.value,
            ranking: report.final_ranking,
            ad_placement_report: suggestions,
        })
    }

    /// One suggestion per ranked candidate, in rank order.
    ///
    /// A failed suggestion is reported inline rather than failing the run.
    async fn suggest(
        &self,
        ranking: &[RankingEntry],
        emotion_csv: &str,
        categories: &str,
        logger: &RunLogger,
    ) -> Vec<AdPlacementSuggestion> {
        let futures: Vec<_> = ranking
            .iter()
            .map(|entry| async move {
                let suggestion = match self
                    .ad_match
                    .suggest_placement(&entry.candidate, emotion_csv, categories)
                    .await
                {
                    Ok(value) => value,
                    Err(e) => {
                        logger.log_warning(&format!(
                            "suggestion for {} failed: {}",
                            entry.candidate, e
                        ));
                        json!({ "error": e.to_string() })
                    }
                };
                AdPlacementSuggestion {
                    candidate: entry.candidate.clone(),
                    rank: entry.rank,
                    suggestion,
                }
            })
            .collect();
        stream::iter(futures)
            .buffered(self.config.analysis_concurrency.max(1))
            .collect()
            .await
    }
}
