//! Scoring error types.

use thiserror::Error;

pub type ScoringResult<T> = Result<T, ScoringError>;

/// Boundary errors. Scoring itself never fails on data-shape anomalies.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input at `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl ScoringError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Offending field path, when the error is about input shape.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { field, .. } => Some(field),
            Self::Config(_) => None,
        }
    }
}
