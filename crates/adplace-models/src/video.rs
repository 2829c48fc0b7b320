//! Video models.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::PersonaAnalysis;
use crate::ordered_map::OrderedMap;

/// Identifier assigned to a video by the video-understanding service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Role of a video in a placement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoRole {
    /// The video ads are placed into
    Main,
    /// A candidate advertisement
    #[default]
    Ad,
}

/// A video together with its per-persona analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    /// External video identifier
    pub id: VideoId,

    /// Display name, used as the key throughout scoring
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub role: VideoRole,

    /// Persona name -> analysis, in persona catalog order
    #[serde(default)]
    pub persona_analyses: OrderedMap<PersonaAnalysis>,
}

impl VideoRecord {
    pub fn new(id: impl Into<VideoId>, name: impl Into<String>, role: VideoRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            role,
            persona_analyses: OrderedMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_main(&self) -> bool {
        self.role == VideoRole::Main
    }
}
