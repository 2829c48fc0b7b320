//! Shared data models for the AdPlace backend.
//!
//! This crate provides Serde-serializable types for:
//! - Videos and their role in a placement run (main video or ad candidate)
//! - Persona definitions and per-persona analysis records
//! - Multi-video analysis results written by the analysis pipeline
//! - Stitching requests and responses
//! - LLM ad placement suggestions

pub mod analysis;
pub mod ordered_map;
pub mod persona;
pub mod placement;
pub mod stitching;
pub mod video;

// Re-export common types
pub use analysis::{
    AffinityRankEntry, AnalysisRunMetadata, AnalysisStatus, AnalysisSummary, CategoryAverage,
    MultiVideoAnalysis, PersonaAffinityMetrics, PersonaAnalysis, PersonaAverage, VideoAffinity,
    CATEGORY_GENERAL, CATEGORY_SPORTS,
};
pub use ordered_map::OrderedMap;
pub use persona::{Biases, EngagementStyle, Persona, PersonaCatalogFile};
pub use placement::{AdCandidate, AdPlacementSuggestion};
pub use stitching::{
    AdSegment, ProcessedSequenceItem, ProcessingResults, SequenceItem, StitchingRequest,
    StitchingResponse,
};
pub use video::{VideoId, VideoRecord, VideoRole};
