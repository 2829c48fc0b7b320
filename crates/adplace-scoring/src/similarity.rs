//! Keyword-overlap content similarity.
//!
//! This is a bag-of-words measure, not an embedding distance: both texts are
//! lower-cased and split on whitespace, each token set is reduced to the
//! keywords of one context, and the two reduced sets are compared with
//! Jaccard. Punctuation is not stripped, so `drink.` does not match `drink`.

use std::collections::BTreeSet;

use adplace_models::OrderedMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{ContextCategory, ScoringConfig};
use crate::round_dp;

/// Similarity within one context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContextScore {
    /// Jaccard of the matched keyword subsets, 0-1
    pub similarity: f64,
    pub weight: f64,
    pub weighted_score: f64,
}

/// Similarity of one candidate to the reference video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SimilarityResult {
    pub overall_similarity: f64,
    pub context_scores: OrderedMap<ContextScore>,
}

/// Result of a scoring pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SimilarityOutcome {
    /// Candidate name -> result, in input order
    Scored(OrderedMap<SimilarityResult>),
    /// The reference video had no content text
    MissingReference,
}

impl SimilarityOutcome {
    pub fn is_missing_reference(&self) -> bool {
        matches!(self, Self::MissingReference)
    }

    /// Scored results; empty when the reference is missing.
    pub fn into_results(self) -> OrderedMap<SimilarityResult> {
        match self {
            Self::Scored(results) => results,
            Self::MissingReference => OrderedMap::new(),
        }
    }
}

fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn jaccard(a: &BTreeSet<&String>, b: &BTreeSet<&String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Scores candidates against a reference text over the configured contexts.
#[derive(Debug, Clone, Copy)]
pub struct ContentSimilarityScorer<'a> {
    contexts: &'a [ContextCategory],
}

impl<'a> ContentSimilarityScorer<'a> {
    pub fn new(contexts: &'a [ContextCategory]) -> Self {
        Self { contexts }
    }

    pub fn from_config(config: &'a ScoringConfig) -> Self {
        Self::new(&config.contexts)
    }

    /// Compare two texts directly.
    pub fn compare(&self, reference: &str, candidate: &str) -> SimilarityResult {
        let reference_tokens = tokenize(reference);
        let candidate_tokens = tokenize(candidate);

        let mut context_scores = OrderedMap::new();
        let mut total = 0.0;

        for context in self.contexts {
            let matched_ref: BTreeSet<&String> =
                reference_tokens.intersection(&context.keywords).collect();
            let matched_cand: BTreeSet<&String> =
                candidate_tokens.intersection(&context.keywords).collect();

            let similarity = jaccard(&matched_ref, &matched_cand);
            let weighted = similarity * context.weight;
            total += weighted;

            context_scores.insert(
                context.name.clone(),
                ContextScore {
                    similarity: round_dp(similarity, 4),
                    weight: context.weight,
                    weighted_score: round_dp(weighted, 4),
                },
            );
        }

        let overall = if self.contexts.is_empty() {
            0.0
        } else {
            total / self.contexts.len() as f64
        };

        SimilarityResult {
            overall_similarity: round_dp(overall, 4),
            context_scores,
        }
    }

    /// Score every video except the reference against the reference text.
    pub fn score(&self, texts: &OrderedMap<String>, reference: &str) -> SimilarityOutcome {
        let Some(reference_text) = texts.get(reference) else {
            warn!(reference = %reference, "Reference video has no content text");
            return SimilarityOutcome::MissingReference;
        };

        let results = texts
            .iter()
            .filter(|(name, _)| *name != reference)
            .map(|(name, text)| (name, self.compare(reference_text, text)))
            .collect();

        SimilarityOutcome::Scored(results)
    }
}
