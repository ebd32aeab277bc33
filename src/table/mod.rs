//! Game table construction
//!
//! Turns extracted records into normalized [`crate::types::GameRow`]s:
//! numeric scores, canonical team keys and a short outcome reason.

pub mod builder;

pub use builder::{
    build_row, build_table, coalesce_outcome, parse_reason, parse_result, parse_round, GameTable,
    SkippedRow, OTHER_REASON, REASON_MARKER,
};
