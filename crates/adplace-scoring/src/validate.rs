//! Boundary validation of scoring input.
//!
//! The scorers accept any well-typed snapshot. [`validate_videos`] rejects
//! input that is well-typed but meaningless, naming the offending field.
//! [`rescore_videos`] then rebuilds every analysis's derived scores so that
//! caller-supplied overall scores never reach the ranker.

use std::collections::BTreeSet;

use adplace_models::VideoRecord;

use crate::error::{ScoringError, ScoringResult};
use crate::persona::rescore_analysis;

pub fn validate_videos(videos: &[VideoRecord]) -> ScoringResult<()> {
    let mut seen = BTreeSet::new();

    for (i, video) in videos.iter().enumerate() {
        if video.name.trim().is_empty() {
            return Err(ScoringError::invalid_input(
                format!("videos[{}].name", i),
                "must not be empty",
            ));
        }
        if !seen.insert(video.name.as_str()) {
            return Err(ScoringError::invalid_input(
                format!("videos[{}].name", i),
                format!("duplicate video name `{}`", video.name),
            ));
        }

        for (persona, analysis) in video.persona_analyses.iter() {
            if !analysis.overall_score.is_finite() {
                return Err(ScoringError::invalid_input(
                    format!("videos[{}].persona_analyses.{}.overall_score", i, persona),
                    "must be a finite number",
                ));
            }
            if let Some((name, _)) = analysis.scores.iter().find(|(_, v)| !v.is_finite()) {
                return Err(ScoringError::invalid_input(
                    format!("videos[{}].persona_analyses.{}.scores.{}", i, persona, name),
                    "must be a finite number",
                ));
            }
        }
    }

    Ok(())
}

/// Recompute `scores` and `overall_score` of every analysis from its
/// sub-scores and the required score names.
pub fn rescore_videos(videos: &mut [VideoRecord], required: &[String]) {
    for video in videos.iter_mut() {
        for analysis in video.persona_analyses.values_mut() {
            rescore_analysis(analysis, required);
        }
    }
}
