//! Persona definitions.
//!
//! Personas are audience archetypes loaded from `persona_categories.json`.
//! Each one drives a persona-specific prompt for the video-understanding
//! service and is grouped by category when computing affinity.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::CATEGORY_GENERAL;

fn default_category() -> String {
    CATEGORY_GENERAL.to_string()
}

fn default_tone() -> String {
    "neutral".to_string()
}

/// What makes a persona react.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngagementStyle {
    #[serde(default)]
    pub emotional_triggers: Vec<String>,
}

/// Positive and negative content biases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Biases {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
}

/// A named audience archetype with a scoring rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Persona {
    pub name: String,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default)]
    pub motto: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub evaluation_focus: Vec<String>,

    #[serde(default)]
    pub engagement_style: EngagementStyle,

    #[serde(default)]
    pub biases: Biases,

    #[serde(default = "default_tone")]
    pub output_tone: String,
}

impl Persona {
    /// Minimal persona, mostly useful in tests and fixtures.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            motto: String::new(),
            summary: String::new(),
            evaluation_focus: Vec::new(),
            engagement_style: EngagementStyle::default(),
            biases: Biases::default(),
            output_tone: default_tone(),
        }
    }
}

/// On-disk layout of the persona catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PersonaCatalogFile {
    #[serde(default)]
    pub personas: Vec<Persona>,
}
