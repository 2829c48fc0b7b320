//! HTTP handlers.

pub mod health;
pub mod placement;
pub mod ranking;
pub mod stitching;

pub use health::{health, list_personas, ready, root};
