//! Metrics for the rating pipeline
//!
//! Counters and timings of a run are collected in a Prometheus registry and
//! can be exported in the text exposition format at the end of the run.

pub mod collector;

pub use collector::{FetchMetrics, MetricsCollector, MetricsTimer, RatingMetrics};
