//! Elo rating engine for bughouse partnerships
//!
//! This module provides the Elo maths, pluggable K-factor policies, the
//! per-run team rating map and the engine that folds games into it in
//! arrival order.

pub mod calculator;
pub mod engine;
pub mod k_factor;
pub mod storage;

// Re-export commonly used types
pub use calculator::{elo_prob, elo_update, EloCalculator, PairedUpdate};
pub use engine::{RatingEngine, RatingRun};
pub use k_factor::{ConstantKFactor, KFactorPolicy, TieredKFactor};
pub use storage::{RatingMap, TeamRatingEntry};
