//! Utility functions for the rating pipeline

use crate::types::GameId;
use chrono::NaiveDate;

/// Round a rating to two decimal places
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build the composite game identifier `{game_index}-{match_id}-{round}`
pub fn game_id(game_index: u64, match_id: u64, round: u32) -> GameId {
    format!("{}-{}-{}", game_index, match_id, round)
}

/// Parse a PGN style `YYYY.MM.DD` date, tolerating `-` separators
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y.%m.%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// Ratio that yields 0.0 instead of NaN for an empty denominator
pub fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}
