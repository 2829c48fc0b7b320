//! Axum HTTP API for contextual ad placement.
//!
//! This crate provides:
//! - The placement pipeline over the external AI services
//! - Ranking over caller-supplied analyses
//! - Timeline stitching
//! - Rate limiting, security headers and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
