//! Persona analyses over a set of videos.
//!
//! Every persona in the catalog analyzes every video. Personas for one
//! video run concurrently up to a fixed bound; videos run one after the
//! other. Results keep catalog order regardless of completion order.

use std::sync::Arc;

use adplace_ai::{PersonaCatalog, PersonaPromptBuilder, VideoUnderstandingClient};
use adplace_models::{MultiVideoAnalysis, Persona, PersonaAnalysis, VideoRecord};
use adplace_scoring::persona::successful_analysis;
use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::metrics;

/// Runs the persona fan-out for placement runs.
#[derive(Clone)]
pub struct PersonaAnalyzer {
    client: Arc<VideoUnderstandingClient>,
    catalog: Arc<PersonaCatalog>,
    prompts: Arc<PersonaPromptBuilder>,
    concurrency: usize,
}

impl PersonaAnalyzer {
    pub fn new(
        client: Arc<VideoUnderstandingClient>,
        catalog: Arc<PersonaCatalog>,
        prompts: Arc<PersonaPromptBuilder>,
        concurrency: usize,
    ) -> Self {
        Self {
            client,
            catalog,
            prompts,
            concurrency: concurrency.max(1),
        }
    }

    async fn analyze_persona(&self, video: &VideoRecord, persona: &Persona) -> PersonaAnalysis {
        let analysis = match self
            .client
            .analyze_persona(&video.id, persona, &self.prompts)
            .await
        {
            Ok(reply) => successful_analysis(
                persona,
                reply.content_overview,
                &reply.scores,
                self.prompts.required_scores(),
            ),
            Err(e) => {
                warn!(
                    video = %video.name,
                    persona = %persona.name,
                    error = %e,
                    "Persona analysis failed"
                );
                let failed = PersonaAnalysis::failed(&persona.name, &persona.category, e.to_string());
                if persona.motto.is_empty() {
                    failed
                } else {
                    failed.with_motto(&persona.motto)
                }
            }
        };

        metrics::record_persona_analysis(&persona.category, analysis.is_success());
        analysis
    }

    /// Fill `video.persona_analyses` with one analysis per persona.
    pub async fn analyze_video(&self, mut video: VideoRecord) -> VideoRecord {
        let video_ref = &video;
        let futures: Vec<_> = self
            .catalog
            .personas()
            .iter()
            .enumerate()
            .map(|(i, persona)| async move { (i, self.analyze_persona(video_ref, persona).await) })
            .collect();
        let mut results: Vec<(usize, PersonaAnalysis)> =
            stream::iter(futures)
                .buffer_unordered(self.concurrency)
                .collect()
                .await;
        results.sort_by_key(|(i, _)| *i);

        for (_, analysis) in results {
            video
                .persona_analyses
                .insert(analysis.persona.clone(), analysis);
        }
        video
    }

    /// Analyze each video in turn and collect the run summary.
    pub async fn analyze_videos(&self, videos: Vec<VideoRecord>) -> MultiVideoAnalysis {
        let mut analyzed = Vec::with_capacity(videos.len());
        for video in videos {
            info!(
                video = %video.name,
                video_id = %video.id,
                personas = self.catalog.len(),
                "Analyzing video"
            );
            analyzed.push(self.analyze_video(video).await);
        }

        let results = MultiVideoAnalysis::new(
            analyzed,
            self.catalog.len(),
            self.client.index_id().map(str::to_string),
        );
        info!(
            successful = results.summary.successful_analyses,
            failed = results.summary.failed_analyses,
            "Persona analysis finished"
        );
        results
    }
}
