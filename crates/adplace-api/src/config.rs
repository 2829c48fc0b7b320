//! API configuration.

use std::path::PathBuf;

use adplace_models::AdCandidate;

/// Default display name of the video ads are placed into.
pub const DEFAULT_MAIN_VIDEO_DESCRIPTION: &str = "Main sports video where ads would be placed";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second
    pub rate_limit_rps: u32,
    /// Rate limit burst
    pub rate_limit_burst: u32,
    /// Max request body size (video uploads go through this limit)
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Directory for report files
    pub output_dir: PathBuf,
    /// Persona catalog file
    pub persona_file: PathBuf,
    /// Optional scoring config override
    pub scoring_config_file: Option<PathBuf>,
    /// Ad candidates analyzed against every main video
    pub ad_candidates: Vec<AdCandidate>,
    pub main_video_description: String,
    /// Concurrent persona analyses per video
    pub analysis_concurrency: usize,
    /// Interval between indexing status polls after an upload
    pub index_poll_interval_ms: u64,
    pub index_max_polls: u32,
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            rate_limit_rps: 10,
            rate_limit_burst: 20,
            max_body_size: 512 * 1024 * 1024, // 512MB
            environment: "development".to_string(),
            output_dir: PathBuf::from("json"),
            persona_file: PathBuf::from("persona_categories.json"),
            scoring_config_file: None,
            ad_candidates: Vec::new(),
            main_video_description: DEFAULT_MAIN_VIDEO_DESCRIPTION.to_string(),
            analysis_concurrency: 4,
            index_poll_interval_ms: 5_000,
            index_max_polls: 120,
            metrics_enabled: true,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_parse("API_PORT").unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: env_parse("RATE_LIMIT_RPS").unwrap_or(defaults.rate_limit_rps),
            rate_limit_burst: env_parse("RATE_LIMIT_BURST").unwrap_or(defaults.rate_limit_burst),
            max_body_size: env_parse("MAX_BODY_SIZE").unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            persona_file: std::env::var("PERSONA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.persona_file),
            scoring_config_file: std::env::var("SCORING_CONFIG_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            ad_candidates: std::env::var("AD_VIDEOS")
                .map(|s| AdCandidate::parse_list(&s))
                .unwrap_or_default(),
            main_video_description: std::env::var("MAIN_VIDEO_DESCRIPTION")
                .unwrap_or(defaults.main_video_description),
            analysis_concurrency: env_parse::<usize>("ANALYSIS_CONCURRENCY")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.analysis_concurrency),
            index_poll_interval_ms: env_parse("INDEX_POLL_INTERVAL_MS")
                .unwrap_or(defaults.index_poll_interval_ms),
            index_max_polls: env_parse("INDEX_MAX_POLLS").unwrap_or(defaults.index_max_polls),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}
