//! Flat-file sink for analysis results and ranking reports.

use std::path::{Path, PathBuf};

use adplace_models::MultiVideoAnalysis;
use adplace_scoring::AdRankingReport;
use serde::Serialize;
use tracing::info;

use crate::error::ApiResult;

/// File holding the multi-video persona analysis.
pub const ANALYSIS_FILE: &str = "comprehensive_video_analysis_results.json";

/// File holding the ranking report.
pub const REPORT_FILE: &str = "embedding_similarity_results.json";

/// Writes pretty-printed JSON documents into one output directory.
#[derive(Debug, Clone)]
pub struct ReportSink {
    output_dir: PathBuf,
}

impl ReportSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub async fn write_analysis(&self, analysis: &MultiVideoAnalysis) -> ApiResult<PathBuf> {
        self.write_json(ANALYSIS_FILE, analysis).await
    }

    pub async fn write_report(&self, report: &AdRankingReport) -> ApiResult<PathBuf> {
        self.write_json(REPORT_FILE, report).await
    }

    async fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> ApiResult<PathBuf> {
        let bytes = serde_json::to_vec_pretty(value).map_err(std::io::Error::from)?;
        tokio::fs::create_dir_all(&self.output_dir).await?;

        // Write then rename so readers never see a partial document
        let path = self.output_dir.join(file_name);
        let tmp = self.output_dir.join(format!(".{}.tmp", file_name));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        info!(path = %path.display(), bytes = bytes.len(), "Wrote results file");
        Ok(path)
    }
}
