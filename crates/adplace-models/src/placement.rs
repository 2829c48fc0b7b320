//! Ad placement models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::video::VideoId;

/// A candidate advertisement video registered with the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AdCandidate {
    pub id: VideoId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AdCandidate {
    pub fn new(id: impl Into<VideoId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    /// Parse `id=Name` pairs, falling back to `Ad <n>` when no name is given.
    ///
    /// ```
    /// use adplace_models::AdCandidate;
    /// let ads = AdCandidate::parse_list("abc=Cola Ad, def");
    /// assert_eq!(ads[0].name, "Cola Ad");
    /// assert_eq!(ads[1].name, "Ad 2");
    /// ```
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .enumerate()
            .map(|(i, entry)| match entry.split_once('=') {
                Some((id, name)) if !name.trim().is_empty() => {
                    Self::new(id.trim(), name.trim())
                }
                Some((id, _)) => Self::new(id.trim(), format!("Ad {}", i + 1)),
                None => Self::new(entry, format!("Ad {}", i + 1)),
            })
            .collect()
    }
}

/// LLM suggestion for where a ranked ad fits in the main video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AdPlacementSuggestion {
    /// Candidate name as ranked
    pub candidate: String,

    /// Rank in the final ranking (1-based)
    pub rank: usize,

    /// Structured suggestion returned by the model, or the raw text when it
    /// was not valid JSON
    pub suggestion: serde_json::Value,
}
