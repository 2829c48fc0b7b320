//! Services behind the HTTP handlers.

mod persona_analyzer;
mod placement;
mod report_sink;
mod run_logger;

pub use persona_analyzer::PersonaAnalyzer;
pub use placement::{index_upload, PlacementOutcome, PlacementPipeline};
pub use report_sink::{ReportSink, ANALYSIS_FILE, REPORT_FILE};
pub use run_logger::RunLogger;
