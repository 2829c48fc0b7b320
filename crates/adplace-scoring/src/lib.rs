//! Contextual ad-ranking scorer.
//!
//! Pure, synchronous scoring over an in-memory snapshot of analysis
//! results:
//! - [`PersonaScoreExtractor`]: persona overall scores and per-video affinity
//! - [`ContentSimilarityScorer`]: keyword-overlap similarity per topical context
//! - [`CompositeRanker`]: normalization and blending into one ranking
//! - [`ReportAssembler`]: the serializable report handed to sinks
//!
//! Data-shape anomalies (missing reference video, incomplete score sets,
//! no candidates, degenerate normalization range) produce well-defined
//! degraded values. Only [`validate_videos`] and config loading return errors.

pub mod config;
pub mod error;
pub mod persona;
pub mod ranking;
pub mod report;
pub mod similarity;
pub mod validate;

pub use config::{ContextCategory, RankingWeights, ScoringConfig};
pub use error::{ScoringError, ScoringResult};
pub use persona::{CategoryAverage, PersonaScoreExtractor, VideoAffinity};
pub use ranking::{CompositeRanker, CompositeScore, Ranking, RankingEntry};
pub use report::{score_videos, AdRankingReport, ReportAssembler, ReportMetadata};
pub use similarity::{ContentSimilarityScorer, ContextScore, SimilarityOutcome, SimilarityResult};
pub use validate::{rescore_videos, validate_videos};

/// Round to a fixed number of decimal places.
pub(crate) fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
