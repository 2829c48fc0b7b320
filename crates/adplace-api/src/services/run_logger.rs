//! Structured logging for placement runs.

use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Logs the lifecycle of one placement run with a stable run id.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    video_id: String,
}

impl RunLogger {
    /// New logger with a generated run id.
    pub fn new(video_id: &str) -> Self {
        Self {
            run_id: Uuid::new_v4().simple().to_string(),
            video_id: video_id.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(run_id = %self.run_id, video_id = %self.video_id, "Run started: {}", message);
    }

    pub fn log_step(&self, step: &str, message: &str) {
        info!(run_id = %self.run_id, video_id = %self.video_id, step, "{}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(run_id = %self.run_id, video_id = %self.video_id, "Run warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(run_id = %self.run_id, video_id = %self.video_id, "Run failed: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(run_id = %self.run_id, video_id = %self.video_id, "Run completed: {}", message);
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Span carrying the run context, for instrumenting futures.
    pub fn span(&self) -> Span {
        tracing::info_span!("placement_run", run_id = %self.run_id, video_id = %self.video_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        let a = RunLogger::new("vid-1");
        let b = RunLogger::new("vid-1");
        assert_ne!(a.run_id(), b.run_id());
        assert_eq!(a.run_id().len(), 32);
    }
}
