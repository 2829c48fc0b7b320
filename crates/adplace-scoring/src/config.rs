//! Scoring configuration.
//!
//! The context catalog, the required sub-score names and the affinity
//! category weights are plain data passed into the scorers. Defaults match
//! the sports-placement setup the service ships with; a JSON file can
//! override any part of it.

use std::collections::BTreeSet;
use std::path::Path;

use adplace_models::{OrderedMap, CATEGORY_GENERAL, CATEGORY_SPORTS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ScoringError, ScoringResult};

/// Default display name of the reference video.
pub const DEFAULT_REFERENCE_VIDEO: &str = "Main Sports Video";

/// Sub-scores every persona analysis must report.
pub const DEFAULT_REQUIRED_SCORES: [&str; 5] = [
    "content_alignment",
    "emotional_resonance",
    "engagement_potential",
    "visual_appeal",
    "brand_suitability",
];

/// A topical context an ad can share with the main video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContextCategory {
    pub name: String,

    /// Lower-case keywords; matched against whole whitespace tokens
    pub keywords: BTreeSet<String>,

    /// Relevance weight in [0, 1]
    pub weight: f64,

    /// Example brands, informational only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl ContextCategory {
    pub fn new(name: impl Into<String>, keywords: &[&str], weight: f64) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            weight,
            examples: Vec::new(),
        }
    }

    pub fn with_examples(mut self, examples: &[&str]) -> Self {
        self.examples = examples.iter().map(|e| e.to_string()).collect();
        self
    }
}

/// Blend weights for the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankingWeights {
    pub content_relevance_weight: f64,
    pub audience_alignment_weight: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            content_relevance_weight: 0.5,
            audience_alignment_weight: 0.5,
        }
    }
}

impl RankingWeights {
    pub fn new(content_relevance_weight: f64, audience_alignment_weight: f64) -> Self {
        Self {
            content_relevance_weight,
            audience_alignment_weight,
        }
    }

    pub fn sum(&self) -> f64 {
        self.content_relevance_weight + self.audience_alignment_weight
    }
}

/// Full scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScoringConfig {
    /// Display name of the video ads are placed into
    pub reference_video: String,

    /// Topical contexts used by the similarity scorer
    pub contexts: Vec<ContextCategory>,

    /// Sub-score names averaged into a persona's overall score
    pub required_scores: Vec<String>,

    /// Persona category -> weight in the affinity blend
    pub category_weights: OrderedMap<f64>,

    pub weights: RankingWeights,

    /// Min-max scale content relevance across candidates
    pub normalize: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            reference_video: DEFAULT_REFERENCE_VIDEO.to_string(),
            contexts: default_contexts(),
            required_scores: DEFAULT_REQUIRED_SCORES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            category_weights: [(CATEGORY_GENERAL, 0.4), (CATEGORY_SPORTS, 0.6)]
                .into_iter()
                .collect(),
            weights: RankingWeights::default(),
            normalize: true,
        }
    }
}

/// The built-in sports placement catalog.
pub fn default_contexts() -> Vec<ContextCategory> {
    vec![
        ContextCategory::new(
            "refreshment",
            &[
                "drink", "beverage", "snack", "food", "refresh", "thirst", "energy", "cola",
                "soda", "coke", "pepsi", "gatorade", "water", "juice",
            ],
            0.9,
        )
        .with_examples(&["Coca-Cola", "Pepsi", "Gatorade", "snacks"]),
        ContextCategory::new(
            "automotive",
            &[
                "car", "vehicle", "drive", "transport", "luxury", "performance", "volkswagen",
                "bmw", "mercedes", "automobile", "driving",
            ],
            0.6,
        )
        .with_examples(&["Volkswagen", "BMW", "Mercedes"]),
        ContextCategory::new(
            "personal_care",
            &[
                "hygiene", "clean", "fresh", "grooming", "care", "beauty", "shampoo", "soap",
                "toothpaste", "deodorant", "skincare",
            ],
            0.3,
        )
        .with_examples(&["PG", "Unilever", "personal care products"]),
        ContextCategory::new(
            "sports_equipment",
            &[
                "gear", "equipment", "apparel", "shoes", "training", "fitness", "nike", "adidas",
                "sports", "athletic", "performance",
            ],
            1.0,
        )
        .with_examples(&["Nike", "Adidas", "sports brands"]),
    ]
}

impl ScoringConfig {
    /// Load a config file, filling absent sections with defaults.
    pub fn from_file(path: impl AsRef<Path>) -> ScoringResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ScoringError::config(format!("{}: {}", path.display(), e)))?;
        let mut config: ScoringConfig = serde_json::from_str(&raw)
            .map_err(|e| ScoringError::config(format!("{}: {}", path.display(), e)))?;
        config.normalize_keywords();
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional path, using defaults when none is given.
    pub fn from_optional_file(path: Option<&Path>) -> ScoringResult<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    fn normalize_keywords(&mut self) {
        for context in &mut self.contexts {
            context.keywords = context
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
        }
    }

    /// Check ranges. The two ranking weights are not required to sum to 1.
    pub fn validate(&self) -> ScoringResult<()> {
        if self.reference_video.trim().is_empty() {
            return Err(ScoringError::invalid_input(
                "reference_video",
                "must not be empty",
            ));
        }

        for (i, context) in self.contexts.iter().enumerate() {
            if !(0.0..=1.0).contains(&context.weight) {
                return Err(ScoringError::invalid_input(
                    format!("contexts[{}].weight", i),
                    format!("{} is outside [0, 1]", context.weight),
                ));
            }
        }

        for (category, weight) in self.category_weights.iter() {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ScoringError::invalid_input(
                    format!("category_weights.{}", category),
                    format!("{} must be a non-negative number", weight),
                ));
            }
        }

        for (field, value) in [
            ("weights.content_relevance_weight", self.weights.content_relevance_weight),
            ("weights.audience_alignment_weight", self.weights.audience_alignment_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::invalid_input(
                    field,
                    format!("{} must be a non-negative number", value),
                ));
            }
        }

        Ok(())
    }
}
