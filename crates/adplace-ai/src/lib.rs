//! Clients for the external AI services feeding ad placement.
//!
//! - [`VideoUnderstandingClient`]: upload, chaptering and persona analyses
//! - [`GenerativeTextClient`]: ad categories and emotion timelines
//! - [`AdMatchClient`]: per-product placement suggestions
//!
//! All clients share [`AiConfig`], the retry policy in [`retry`] and the
//! [`AiError`] taxonomy.

pub mod bedrock;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gemini;
pub mod metrics;
pub mod prompts;
pub mod retry;
pub mod twelvelabs;

pub use bedrock::AdMatchClient;
pub use catalog::PersonaCatalog;
pub use config::AiConfig;
pub use error::{AiError, AiResult};
pub use gemini::{AdCategories, GenerativeTextClient};
pub use prompts::{PersonaPromptBuilder, PersonaReply};
pub use retry::RetryConfig;
pub use twelvelabs::{UploadedVideo, VideoUnderstandingClient};
