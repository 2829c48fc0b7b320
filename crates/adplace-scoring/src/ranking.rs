//! Composite ranking of ad candidates.
//!
//! Content relevance is min-max scaled across candidates. Audience alignment
//! is the closeness of a candidate's affinity to the reference video's
//! affinity, both scaled from 0-10 down to 0-1.

use adplace_models::OrderedMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{RankingWeights, ScoringConfig};
use crate::round_dp;
use crate::similarity::{ContextScore, SimilarityResult};

/// Scores of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompositeScore {
    /// Raw overall similarity
    pub content_relevance: f64,
    pub normalized_content_relevance: f64,
    pub audience_alignment: f64,
    pub composite_score: f64,
    pub main_affinity: f64,
    pub ad_affinity: f64,
    pub normalized_main_affinity: f64,
    pub normalized_ad_affinity: f64,
    pub content_relevance_weight: f64,
    pub audience_alignment_weight: f64,
    pub normalized: bool,
    pub context_scores: OrderedMap<ContextScore>,
}

/// One row of the final ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankingEntry {
    /// 1-based position
    pub rank: usize,
    pub candidate: String,
    pub score: f64,
}

/// Composite scores plus their descending order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Ranking {
    pub scores: OrderedMap<CompositeScore>,
    pub ranking: Vec<RankingEntry>,
}

impl Ranking {
    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }

    /// Sort a score map descending by composite score. Ties keep map order.
    pub fn order(scores: &OrderedMap<CompositeScore>) -> Vec<RankingEntry> {
        let mut rows: Vec<(&str, f64)> = scores
            .iter()
            .map(|(name, s)| (name, s.composite_score))
            .collect();
        // sort_by is stable
        rows.sort_by(|a, b| b.1.total_cmp(&a.1));

        rows.into_iter()
            .enumerate()
            .map(|(i, (name, score))| RankingEntry {
                rank: i + 1,
                candidate: name.to_string(),
                score,
            })
            .collect()
    }
}

/// Blends content relevance and audience alignment into one ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeRanker {
    pub weights: RankingWeights,
    pub normalize: bool,
}

impl Default for CompositeRanker {
    fn default() -> Self {
        Self {
            weights: RankingWeights::default(),
            normalize: true,
        }
    }
}

/// Min-max scale values into [0, 1]. A zero range leaves them unscaled.
fn min_max(values: &OrderedMap<f64>) -> OrderedMap<f64> {
    let mut iter = values.values().copied();
    let Some(first) = iter.next() else {
        return OrderedMap::new();
    };
    let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let range = max - min;

    if range > 0.0 {
        values
            .iter()
            .map(|(name, v)| (name, (v - min) / range))
            .collect()
    } else {
        debug!(value = min, "Degenerate relevance range, normalization skipped");
        values.clone()
    }
}

impl CompositeRanker {
    pub fn new(weights: RankingWeights, normalize: bool) -> Self {
        Self { weights, normalize }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.weights, config.normalize)
    }

    /// Rank candidates.
    ///
    /// `affinities` holds 0-10 affinity per video name, including the
    /// reference. A video without an affinity counts as 0. Empty
    /// similarities or empty affinities produce an empty ranking.
    pub fn rank(
        &self,
        similarities: &OrderedMap<SimilarityResult>,
        affinities: &OrderedMap<f64>,
        reference: &str,
    ) -> Ranking {
        if similarities.is_empty() || affinities.is_empty() {
            return Ranking::default();
        }

        let relevance: OrderedMap<f64> = similarities
            .iter()
            .map(|(name, s)| (name, s.overall_similarity))
            .collect();
        let normalized = if self.normalize {
            min_max(&relevance)
        } else {
            relevance.clone()
        };

        let main_affinity = affinities.get(reference).copied().unwrap_or(0.0);
        let normalized_main = main_affinity / 10.0;

        let mut scores = OrderedMap::new();
        for (name, result) in similarities.iter() {
            let ad_affinity = affinities.get(name).copied().unwrap_or(0.0);
            let normalized_ad = ad_affinity / 10.0;
            let content = result.overall_similarity;
            let normalized_content = normalized.get(name).copied().unwrap_or(content);

            let alignment = 1.0 - (normalized_main - normalized_ad).abs();
            let composite = normalized_content * self.weights.content_relevance_weight
                + alignment * self.weights.audience_alignment_weight;

            scores.insert(
                name,
                CompositeScore {
                    content_relevance: content,
                    normalized_content_relevance: round_dp(normalized_content, 4),
                    audience_alignment: round_dp(alignment, 4),
                    composite_score: round_dp(composite, 4),
                    main_affinity,
                    ad_affinity,
                    normalized_main_affinity: round_dp(normalized_main, 4),
                    normalized_ad_affinity: round_dp(normalized_ad, 4),
                    content_relevance_weight: self.weights.content_relevance_weight,
                    audience_alignment_weight: self.weights.audience_alignment_weight,
                    normalized: self.normalize,
                    context_scores: result.context_scores.clone(),
                },
            );
        }

        let ranking = Ranking::order(&scores);
        Ranking { scores, ranking }
    }
}
