//! Ranking report assembly.

use std::fmt::Write as _;

use adplace_models::{OrderedMap, VideoRecord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ScoringConfig;
use crate::persona::{PersonaScoreExtractor, VideoAffinity};
use crate::ranking::{CompositeRanker, CompositeScore, Ranking, RankingEntry};
use crate::similarity::{ContentSimilarityScorer, SimilarityOutcome, SimilarityResult};

pub const METHOD: &str = "sports_contextual_similarity_analysis";
pub const CONTEXT_METHOD: &str = "keyword_based_weighted_similarity";

/// Report header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportMetadata {
    pub method: String,
    pub content_relevance_weight: f64,
    pub audience_alignment_weight: f64,
    pub sports_context_method: String,
    pub normalization: String,
    pub normalized: bool,
    pub reference_video: String,
    /// The reference video had no content text, so nothing was ranked
    pub missing_reference: bool,
}

/// Complete scoring output handed to sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AdRankingReport {
    pub analysis_metadata: ReportMetadata,
    pub sports_contextual_similarities: OrderedMap<SimilarityResult>,
    pub persona_affinity_scores: OrderedMap<f64>,
    pub persona_affinity_metrics: OrderedMap<VideoAffinity>,
    pub comprehensive_scores: OrderedMap<CompositeScore>,
    pub final_ranking: Vec<RankingEntry>,
}

/// Packages scorer outputs into an [`AdRankingReport`].
#[derive(Debug, Clone, Copy)]
pub struct ReportAssembler<'a> {
    config: &'a ScoringConfig,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    pub fn assemble(
        &self,
        similarity: SimilarityOutcome,
        affinity_metrics: OrderedMap<VideoAffinity>,
        ranking: Ranking,
    ) -> AdRankingReport {
        let missing_reference = similarity.is_missing_reference();
        let normalization = if self.config.normalize {
            "both_metrics_0_to_1_range"
        } else {
            "affinity_only_0_to_1_range"
        };

        let persona_affinity_scores = affinity_metrics
            .iter()
            .map(|(name, a)| (name, a.persona_affinity))
            .collect();

        AdRankingReport {
            analysis_metadata: ReportMetadata {
                method: METHOD.to_string(),
                content_relevance_weight: self.config.weights.content_relevance_weight,
                audience_alignment_weight: self.config.weights.audience_alignment_weight,
                sports_context_method: CONTEXT_METHOD.to_string(),
                normalization: normalization.to_string(),
                normalized: self.config.normalize,
                reference_video: self.config.reference_video.clone(),
                missing_reference,
            },
            sports_contextual_similarities: similarity.into_results(),
            persona_affinity_scores,
            persona_affinity_metrics: affinity_metrics,
            comprehensive_scores: ranking.scores,
            final_ranking: ranking.ranking,
        }
    }
}

/// Run the full scoring pipeline over a snapshot of analysed videos.
pub fn score_videos(videos: &[VideoRecord], config: &ScoringConfig) -> AdRankingReport {
    let extractor = PersonaScoreExtractor::new(config);
    let affinity_metrics = extractor.affinities(videos);
    let affinity_scores = extractor.affinity_scores(videos);
    let texts = extractor.content_overviews(videos);

    let similarity =
        ContentSimilarityScorer::from_config(config).score(&texts, &config.reference_video);

    let ranking = match &similarity {
        SimilarityOutcome::Scored(results) => {
            CompositeRanker::from_config(config).rank(results, &affinity_scores, &config.reference_video)
        }
        SimilarityOutcome::MissingReference => Ranking::default(),
    };

    info!(
        videos = videos.len(),
        candidates = ranking.scores.len(),
        missing_reference = similarity.is_missing_reference(),
        "Scored ad candidates"
    );

    ReportAssembler::new(config).assemble(similarity, affinity_metrics, ranking)
}

impl AdRankingReport {
    /// Human-readable summary for logs and the CLI-style text output.
    pub fn summary_text(&self) -> String {
        let mut out = String::new();
        let meta = &self.analysis_metadata;

        let _ = writeln!(out, "CONTEXTUAL AD RANKING ({})", meta.reference_video);
        if meta.missing_reference {
            let _ = writeln!(out, "Reference video has no content text; nothing ranked.");
        }

        let _ = writeln!(out, "\nContent similarity:");
        for (name, result) in self.sports_contextual_similarities.iter() {
            let _ = writeln!(out, "  {}: {:.4}", name, result.overall_similarity);
            for (context, score) in result.context_scores.iter() {
                let _ = writeln!(
                    out,
                    "    {}: {:.4} (weight: {:.1}) = {:.4}",
                    context, score.similarity, score.weight, score.weighted_score
                );
            }
        }

        let _ = writeln!(out, "\nPersona affinity:");
        for (name, score) in self.persona_affinity_scores.iter() {
            let _ = writeln!(out, "  {:<20}: {:.2}/10", name, score);
        }

        let _ = writeln!(
            out,
            "\nFinal ranking ({:.0}% content relevance, {:.0}% audience alignment):",
            meta.content_relevance_weight * 100.0,
            meta.audience_alignment_weight * 100.0
        );
        if self.final_ranking.is_empty() {
            let _ = writeln!(out, "  (no candidates)");
        }
        for entry in &self.final_ranking {
            let _ = writeln!(out, "  {}. {:<20} Score: {:.4}", entry.rank, entry.candidate, entry.score);
        }

        out
    }
}
