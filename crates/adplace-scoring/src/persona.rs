//! Persona score extraction.
//!
//! Turns raw per-persona analyses into:
//! - a persona's `overall_score` (mean of the required sub-scores)
//! - a per-video affinity (category means blended by configured weights)
//! - a per-video combined content text for the similarity scorer

use std::cmp::Ordering;
use std::collections::BTreeMap;

pub use adplace_models::{CategoryAverage, VideoAffinity};
use adplace_models::{
    AffinityRankEntry, AnalysisStatus, OrderedMap, Persona, PersonaAffinityMetrics,
    PersonaAnalysis, PersonaAverage, VideoRecord,
};

use crate::config::ScoringConfig;
use crate::round_dp;

/// Upper bound of every persona sub-score.
pub const MAX_SUB_SCORE: f64 = 10.0;

/// Mean of the required sub-scores, or 0 when any of them is missing.
///
/// An empty required set also yields 0.
pub fn overall_score(scores: &BTreeMap<String, f64>, required: &[String]) -> f64 {
    if required.is_empty() {
        return 0.0;
    }

    let mut total = 0.0;
    for name in required {
        match scores.get(name) {
            Some(value) => total += value,
            None => return 0.0,
        }
    }
    total / required.len() as f64
}

/// Clamp every sub-score into [0, 10] and add the missing required names as 0.
pub fn complete_scores(scores: &BTreeMap<String, f64>, required: &[String]) -> BTreeMap<String, f64> {
    let mut out: BTreeMap<String, f64> = scores
        .iter()
        .map(|(k, v)| (k.clone(), v.clamp(0.0, MAX_SUB_SCORE)))
        .collect();
    for name in required {
        out.entry(name.clone()).or_insert(0.0);
    }
    out
}

/// Build a successful analysis from provider output.
///
/// The overall score is computed before missing names are filled in, so an
/// incomplete score set yields 0 rather than a partial mean.
pub fn successful_analysis(
    persona: &Persona,
    content_overview: impl Into<String>,
    raw_scores: &BTreeMap<String, f64>,
    required: &[String],
) -> PersonaAnalysis {
    let mut analysis = PersonaAnalysis {
        persona: persona.name.clone(),
        status: AnalysisStatus::Success,
        category: persona.category.clone(),
        motto: (!persona.motto.is_empty()).then(|| persona.motto.clone()),
        content_overview: content_overview.into(),
        scores: raw_scores.clone(),
        overall_score: 0.0,
        error: None,
    };
    rescore_analysis(&mut analysis, required);
    analysis
}

/// Recompute `scores` and `overall_score` from the sub-scores alone.
///
/// Sub-scores are clamped to 0-10 and missing required names are filled
/// with 0 after the mean is taken. Whatever overall score the record
/// carried is discarded. Failed analyses get an overall score of 0.
pub fn rescore_analysis(analysis: &mut PersonaAnalysis, required: &[String]) {
    if !analysis.is_success() {
        analysis.overall_score = 0.0;
        return;
    }

    let clamped: BTreeMap<String, f64> = analysis
        .scores
        .iter()
        .map(|(k, v)| (k.clone(), v.clamp(0.0, MAX_SUB_SCORE)))
        .collect();
    analysis.overall_score = round_dp(overall_score(&clamped, required), 2);
    analysis.scores = complete_scores(&clamped, required);
}

/// Extracts affinity scores and content text from analysis records.
#[derive(Debug, Clone, Copy)]
pub struct PersonaScoreExtractor<'a> {
    config: &'a ScoringConfig,
}

impl<'a> PersonaScoreExtractor<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    /// Affinity of a single video.
    ///
    /// Failed analyses are left out of the means. Categories without a
    /// configured weight are ignored. An empty category contributes 0 to
    /// the blend.
    pub fn video_affinity(&self, video: &VideoRecord) -> VideoAffinity {
        let mut categories = OrderedMap::new();
        let mut affinity = 0.0;

        for (category, weight) in self.config.category_weights.iter() {
            let scores: Vec<f64> = video
                .persona_analyses
                .values()
                .filter(|a| a.is_success() && a.category == category)
                .map(|a| a.overall_score.clamp(0.0, MAX_SUB_SCORE))
                .collect();

            let average = if scores.is_empty() {
                0.0
            } else {
                scores.iter().sum::<f64>() / scores.len() as f64
            };

            affinity += average * weight;
            categories.insert(
                category,
                CategoryAverage {
                    average: round_dp(average, 2),
                    count: scores.len(),
                    weight: *weight,
                },
            );
        }

        VideoAffinity {
            persona_affinity: round_dp(affinity, 2),
            categories,
        }
    }

    /// Affinity breakdown for every video, keyed by display name.
    pub fn affinities(&self, videos: &[VideoRecord]) -> OrderedMap<VideoAffinity> {
        videos
            .iter()
            .map(|v| (v.name.clone(), self.video_affinity(v)))
            .collect()
    }

    /// The affinity section of the analysis document: per-video breakdowns,
    /// videos ranked by affinity and personas ranked by their mean overall
    /// score across videos. Both rankings keep input order on ties.
    pub fn affinity_metrics(&self, videos: &[VideoRecord]) -> PersonaAffinityMetrics {
        let weighting = self
            .config
            .category_weights
            .iter()
            .map(|(category, weight)| {
                (format!("{}_personas", category), format!("{}%", (weight * 100.0).round()))
            })
            .collect();

        let video_affinities = self.affinities(videos);
        let mut by_affinity: Vec<(&str, f64)> = video_affinities
            .iter()
            .map(|(name, a)| (name, a.persona_affinity))
            .collect();
        by_affinity.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        let ranking = by_affinity
            .into_iter()
            .enumerate()
            .map(|(i, (video, affinity))| AffinityRankEntry {
                rank: i + 1,
                video: video.to_string(),
                affinity,
            })
            .collect();

        let mut per_persona: OrderedMap<Vec<f64>> = OrderedMap::new();
        for analysis in videos
            .iter()
            .flat_map(|v| v.persona_analyses.values())
            .filter(|a| a.is_success())
        {
            let mut scores = per_persona.get(&analysis.persona).cloned().unwrap_or_default();
            scores.push(analysis.overall_score.clamp(0.0, MAX_SUB_SCORE));
            per_persona.insert(analysis.persona.clone(), scores);
        }
        let mut averages: Vec<(String, f64, usize)> = per_persona
            .into_iter()
            .map(|(persona, scores)| {
                let mean = scores.iter().sum::<f64>() / scores.len() as f64;
                (persona, mean, scores.len())
            })
            .collect();
        averages.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        let persona_ranking = averages
            .into_iter()
            .enumerate()
            .map(|(i, (persona, mean, count))| PersonaAverage {
                rank: i + 1,
                persona,
                average_score: round_dp(mean, 2),
                video_count: count,
            })
            .collect();

        PersonaAffinityMetrics {
            weighting,
            video_affinities,
            ranking,
            persona_ranking,
        }
    }

    /// Affinity score (0-10) for every video, keyed by display name.
    pub fn affinity_scores(&self, videos: &[VideoRecord]) -> OrderedMap<f64> {
        videos
            .iter()
            .map(|v| (v.name.clone(), self.video_affinity(v).persona_affinity))
            .collect()
    }

    /// Successful, non-empty content overviews of each video, space-joined
    /// in persona order.
    pub fn content_overviews(&self, videos: &[VideoRecord]) -> OrderedMap<String> {
        videos
            .iter()
            .map(|v| {
                let combined = v
                    .persona_analyses
                    .values()
                    .filter(|a| a.is_success() && !a.content_overview.is_empty())
                    .map(|a| a.content_overview.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                (v.name.clone(), combined)
            })
            .collect()
    }
}
