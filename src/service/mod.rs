//! Service layer for the rating pipeline
//!
//! Wires record fetching, table building, the rating engine and the
//! aggregator into a single run that produces a report.

pub mod pipeline;

pub use pipeline::{
    compute_standings, extract_all, source_from_config, Pipeline, PipelineReport, Standings,
};
