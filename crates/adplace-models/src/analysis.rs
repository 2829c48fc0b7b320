//! Persona analysis data models.
//!
//! A placement run analyzes every video (the main video and each ad
//! candidate) once per persona. Each analysis yields a free-text content
//! overview plus a fixed-schema object of numeric sub-scores.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ordered_map::OrderedMap;
use crate::video::VideoRecord;

/// Persona category for broad-audience personas.
pub const CATEGORY_GENERAL: &str = "general";

/// Persona category for sports-audience personas.
pub const CATEGORY_SPORTS: &str = "sports";

fn default_category() -> String {
    CATEGORY_GENERAL.to_string()
}

/// Outcome of a single persona analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Success,
    Error,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// One persona's view of one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PersonaAnalysis {
    /// Persona name
    pub persona: String,

    /// Whether the external analysis call succeeded
    pub status: AnalysisStatus,

    /// Persona category (e.g. "general", "sports")
    #[serde(default = "default_category")]
    pub category: String,

    /// Persona motto, carried through for display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motto: Option<String>,

    /// Free-text description of the video content
    #[serde(default)]
    pub content_overview: String,

    /// Named sub-scores, each 0-10
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,

    /// Mean of the required sub-scores, 0 when any is missing
    #[serde(default)]
    pub overall_score: f64,

    /// Error detail for failed analyses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PersonaAnalysis {
    /// Create a failed analysis record.
    pub fn failed(
        persona: impl Into<String>,
        category: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            persona: persona.into(),
            status: AnalysisStatus::Error,
            category: category.into(),
            motto: None,
            content_overview: String::new(),
            scores: BTreeMap::new(),
            overall_score: 0.0,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AnalysisStatus::Success
    }

    pub fn with_motto(mut self, motto: impl Into<String>) -> Self {
        self.motto = Some(motto.into());
        self
    }
}

/// Run-level metadata of a multi-video analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisRunMetadata {
    pub total_videos: usize,
    pub total_personas: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_timestamp: Option<DateTime<Utc>>,
}

/// Success/failure counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisSummary {
    pub total_analyses: usize,
    pub successful_analyses: usize,
    pub failed_analyses: usize,
}

impl AnalysisSummary {
    /// Count outcomes over a single video's analyses.
    pub fn for_video(video: &VideoRecord) -> Self {
        let successful = video
            .persona_analyses
            .values()
            .filter(|a| a.is_success())
            .count();
        let total = video.persona_analyses.len();
        Self {
            total_analyses: total,
            successful_analyses: successful,
            failed_analyses: total - successful,
        }
    }

    pub fn merge(&mut self, other: AnalysisSummary) {
        self.total_analyses += other.total_analyses;
        self.successful_analyses += other.successful_analyses;
        self.failed_analyses += other.failed_analyses;
    }
}

/// Mean overall score of one persona category within a video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryAverage {
    pub average: f64,
    pub count: usize,
    pub weight: f64,
}

/// Affinity of one video with its category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoAffinity {
    /// Weighted blend of category means, 0-10, rounded to 2 places
    pub persona_affinity: f64,
    pub categories: OrderedMap<CategoryAverage>,
}

/// A video's place in the affinity ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AffinityRankEntry {
    pub rank: usize,
    pub video: String,
    pub affinity: f64,
}

/// A persona's mean overall score across every video it analyzed successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PersonaAverage {
    pub rank: usize,
    pub persona: String,
    pub average_score: f64,
    pub video_count: usize,
}

/// Affinity section of the multi-video analysis document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PersonaAffinityMetrics {
    /// Category share of the affinity blend, e.g. `general_personas: "40%"`
    pub weighting: OrderedMap<String>,
    pub video_affinities: OrderedMap<VideoAffinity>,
    /// Videos by descending affinity
    pub ranking: Vec<AffinityRankEntry>,
    /// Personas by descending mean overall score across videos
    pub persona_ranking: Vec<PersonaAverage>,
}

/// Results of analyzing several videos for every persona.
///
/// This is the document written to `comprehensive_video_analysis_results.json`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MultiVideoAnalysis {
    pub analysis_metadata: AnalysisRunMetadata,
    pub video_analyses: Vec<VideoRecord>,
    pub summary: AnalysisSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_affinity_metrics: Option<PersonaAffinityMetrics>,
}

impl MultiVideoAnalysis {
    /// Assemble results, computing the summary counters.
    pub fn new(
        videos: Vec<VideoRecord>,
        total_personas: usize,
        index_id: Option<String>,
    ) -> Self {
        let mut summary = AnalysisSummary::default();
        for video in &videos {
            summary.merge(AnalysisSummary::for_video(video));
        }

        Self {
            analysis_metadata: AnalysisRunMetadata {
                total_videos: videos.len(),
                total_personas,
                index_id,
                analysis_timestamp: Some(Utc::now()),
            },
            video_analyses: videos,
            summary,
            persona_affinity_metrics: None,
        }
    }

    pub fn with_affinity_metrics(mut self, metrics: PersonaAffinityMetrics) -> Self {
        self.persona_affinity_metrics = Some(metrics);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::{VideoId, VideoRole};
    use crate::OrderedMap;

    fn success(persona: &str) -> PersonaAnalysis {
        PersonaAnalysis {
            persona: persona.to_string(),
            status: AnalysisStatus::Success,
            category: CATEGORY_SPORTS.to_string(),
            motto: None,
            content_overview: "a match".to_string(),
            scores: BTreeMap::new(),
            overall_score: 7.0,
            error: None,
        }
    }

    #[test]
    fn test_category_defaults_to_general() {
        let json = r#"{"persona": "Casual Viewer", "status": "success"}"#;
        let analysis: PersonaAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.category, CATEGORY_GENERAL);
        assert_eq!(analysis.overall_score, 0.0);
        assert!(analysis.scores.is_empty());
    }

    #[test]
    fn test_failed_analysis_serializes_error() {
        let analysis = PersonaAnalysis::failed("Fan", CATEGORY_SPORTS, "API Error: 500");
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "API Error: 500");
        assert!(value.get("motto").is_none());
    }

    #[test]
    fn test_multi_video_summary_counts() {
        let mut analyses = OrderedMap::new();
        analyses.insert("Fan", success("Fan"));
        analyses.insert("Critic", PersonaAnalysis::failed("Critic", CATEGORY_GENERAL, "timeout"));

        let video = VideoRecord {
            id: VideoId::from("vid-1"),
            name: "Main Sports Video".to_string(),
            description: None,
            role: VideoRole::Main,
            persona_analyses: analyses,
        };

        let results = MultiVideoAnalysis::new(vec![video.clone(), video], 2, None);
        assert_eq!(results.summary.total_analyses, 4);
        assert_eq!(results.summary.successful_analyses, 2);
        assert_eq!(results.summary.failed_analyses, 2);
        assert_eq!(results.analysis_metadata.total_videos, 2);
        assert!(results.analysis_metadata.analysis_timestamp.is_some());
    }

    #[test]
    fn test_affinity_metrics_section() {
        let results = MultiVideoAnalysis::new(Vec::new(), 0, None);
        let value = serde_json::to_value(&results).unwrap();
        assert!(value.get("persona_affinity_metrics").is_none());

        let mut weighting = OrderedMap::new();
        weighting.insert("general_personas", "40%".to_string());
        let metrics = PersonaAffinityMetrics {
            weighting,
            ranking: vec![AffinityRankEntry {
                rank: 1,
                video: "Cola Ad".to_string(),
                affinity: 7.4,
            }],
            ..Default::default()
        };
        let value = serde_json::to_value(results.with_affinity_metrics(metrics)).unwrap();
        let section = &value["persona_affinity_metrics"];
        assert_eq!(section["weighting"]["general_personas"], "40%");
        assert_eq!(section["ranking"][0]["video"], "Cola Ad");
        assert!(section["persona_ranking"].as_array().unwrap().is_empty());
    }
}
