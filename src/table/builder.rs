//! Normalization of raw records into game rows
//!
//! Rows that cannot be rated (bad result or round) are skipped and logged;
//! the table keeps a list of what was skipped and why so the caller can
//! report it.

use crate::error::BughouseError;
use crate::types::{team_key, GameRow, RawRecord};
use crate::utils::parse_game_date;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Text that precedes the reason in an outcome description
pub const REASON_MARKER: &str = "by ";

/// Reason used when the outcome does not contain [`REASON_MARKER`]
pub const OTHER_REASON: &str = "other";

/// A record that did not make it into the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub game_index: u64,
    pub kind: String,
    pub message: String,
}

/// Normalized games in arrival order plus the rows that were rejected
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameTable {
    pub rows: Vec<GameRow>,
    pub skipped: Vec<SkippedRow>,
}

/// Split a `"<red>-<blue>"` result into the two team scores
pub fn parse_result(result: &str, game_index: u64) -> crate::error::Result<(u32, u32)> {
    let malformed = || BughouseError::MalformedResult {
        game_index,
        value: result.to_string(),
    };

    let cleaned = result.trim().trim_matches('"');
    let parts: Vec<&str> = cleaned.split('-').collect();
    if parts.len() != 2 {
        return Err(malformed().into());
    }

    let red = parts[0].trim().parse::<u32>().map_err(|_| malformed())?;
    let blue = parts[1].trim().parse::<u32>().map_err(|_| malformed())?;
    Ok((red, blue))
}

/// Parse the round number; it must be present and at least 1
pub fn parse_round(round: Option<&str>, game_index: u64) -> crate::error::Result<u32> {
    let raw = round.ok_or_else(|| BughouseError::InvalidGameData {
        game_index,
        reason: "missing round".to_string(),
    })?;

    let value = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| BughouseError::InvalidGameData {
            game_index,
            reason: format!("non-numeric round {:?}", raw),
        })?;

    if value == 0 {
        return Err(BughouseError::InvalidGameData {
            game_index,
            reason: "round must be at least 1".to_string(),
        }
        .into());
    }

    Ok(value)
}

/// Use the outcome text, falling back to the termination text when it is empty
pub fn coalesce_outcome(outcome: Option<&str>, termination: Option<&str>) -> String {
    match outcome {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => termination.unwrap_or_default().to_string(),
    }
}

/// Short reason tag: the text after the first `"by "` up to the next one
pub fn parse_reason(outcome: &str) -> String {
    match outcome.split(REASON_MARKER).nth(1) {
        Some(reason) => reason.trim().to_string(),
        None => OTHER_REASON.to_string(),
    }
}

/// Normalize a single record
pub fn build_row(record: &RawRecord) -> crate::error::Result<GameRow> {
    let game_index = record.game_index;

    let result = record.result.clone().ok_or_else(|| BughouseError::MalformedResult {
        game_index,
        value: String::new(),
    })?;
    let (score_red, score_blue) = parse_result(&result, game_index)?;
    let round = parse_round(record.round.as_deref(), game_index)?;

    let player = |value: &Option<String>| value.clone().unwrap_or_default();
    let white_a = player(&record.white_a);
    let white_b = player(&record.white_b);
    let black_a = player(&record.black_a);
    let black_b = player(&record.black_b);

    let date = record.date.clone().unwrap_or_default();
    let played_on = parse_game_date(&date);
    let outcome = coalesce_outcome(record.outcome.as_deref(), record.termination.as_deref());
    let reason = parse_reason(&outcome);

    Ok(GameRow {
        game_index,
        red: team_key(&white_a, &black_b),
        blue: team_key(&white_b, &black_a),
        white_a,
        white_b,
        black_a,
        black_b,
        date,
        played_on,
        round,
        result,
        score_red,
        score_blue,
        outcome,
        reason,
    })
}

/// Normalize records into a table ordered by `game_index`.
///
/// Invalid rows are skipped, logged at warn level and listed in
/// [`GameTable::skipped`]. Errors that are not row-level data problems abort
/// the whole build.
pub fn build_table(records: &[RawRecord]) -> crate::error::Result<GameTable> {
    let mut ordered: Vec<&RawRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.game_index);

    let mut table = GameTable::default();
    for record in ordered {
        match build_row(record) {
            Ok(row) => table.rows.push(row),
            Err(e) => {
                let row_error = e
                    .downcast_ref::<BughouseError>()
                    .filter(|error| {
                        matches!(
                            error,
                            BughouseError::MalformedResult { .. }
                                | BughouseError::InvalidGameData { .. }
                        )
                    })
                    .cloned();
                let Some(error) = row_error else {
                    return Err(e);
                };
                warn!("Skipping game {}: {}", record.game_index, error);
                table.skipped.push(SkippedRow {
                    game_index: record.game_index,
                    kind: error.kind().to_string(),
                    message: error.to_string(),
                });
            }
        }
    }

    debug!(
        "Built game table: {} rows, {} skipped",
        table.rows.len(),
        table.skipped.len()
    );
    Ok(table)
}
