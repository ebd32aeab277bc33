//! Bughouse Elo - team ratings and statistics for bughouse game archives
//!
//! This crate fetches bughouse game records one id at a time, normalizes
//! them into a game table, folds the games in order through a team Elo
//! engine and summarizes the result per team and per player.

pub mod config;
pub mod error;
pub mod metrics;
pub mod rating;
pub mod report;
pub mod service;
pub mod source;
pub mod stats;
pub mod table;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{BughouseError, Result};
pub use types::*;

// Re-export key components
pub use rating::{elo_prob, elo_update, RatingEngine, RatingMap};
pub use service::{Pipeline, PipelineReport};
pub use source::{RecordFetcher, RecordSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
