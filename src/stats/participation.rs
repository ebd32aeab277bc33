//! One row per player per game
//!
//! Seat mapping of the four rows of a game:
//!
//! | player | side | board | colour | opponent |
//! |--------|------|-------|--------|----------|
//! | WhiteA | Red  | A     | White  | BlackA   |
//! | BlackB | Red  | B     | Black  | WhiteB   |
//! | BlackA | Blue | A     | Black  | WhiteA   |
//! | WhiteB | Blue | B     | White  | BlackB   |

use crate::error::BughouseError;
use crate::types::{Board, Color, GameId, GameResult, GameRow, PlayerId, Side, TeamKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A player's part in one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerParticipation {
    pub player: PlayerId,
    pub team: TeamKey,
    pub side: Side,
    pub board: Board,
    pub color: Color,
    pub opponent: PlayerId,
    /// Score of the player's team in this game
    pub score: u32,
    /// Rating of the player's team after this game
    pub rating: f64,
    pub game_id: GameId,
}

/// Game-level columns joined onto participation rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetadata {
    pub match_id: u64,
    pub game_index: u64,
    pub round: u32,
    pub date: String,
    pub outcome: String,
    pub reason: String,
}

/// Participation row with its game metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    #[serde(flatten)]
    pub participation: PlayerParticipation,
    #[serde(flatten)]
    pub game: GameMetadata,
}

/// The four participation rows of one rated game
pub fn explode_game(row: &GameRow, result: &GameResult) -> [PlayerParticipation; 4] {
    let seat = |player: &str, side: Side, board: Board, color: Color, opponent: &str| {
        let (team, score, rating) = match side {
            Side::Red => (&result.red, result.score_red, result.red_rating),
            Side::Blue => (&result.blue, result.score_blue, result.blue_rating),
        };
        PlayerParticipation {
            player: player.to_string(),
            team: team.clone(),
            side,
            board,
            color,
            opponent: opponent.to_string(),
            score,
            rating,
            game_id: result.game_id.clone(),
        }
    };

    [
        seat(&row.white_a, Side::Red, Board::A, Color::White, &row.black_a),
        seat(&row.black_b, Side::Red, Board::B, Color::Black, &row.white_b),
        seat(&row.black_a, Side::Blue, Board::A, Color::Black, &row.white_a),
        seat(&row.white_b, Side::Blue, Board::B, Color::White, &row.black_b),
    ]
}

/// Metadata of every rated game keyed by game id
pub fn game_metadata(
    rows: &[GameRow],
    results: &[GameResult],
) -> crate::error::Result<HashMap<GameId, GameMetadata>> {
    let rows_by_index = index_rows(rows)?;
    let mut metadata = HashMap::with_capacity(results.len());

    for result in results {
        let row = row_for(&rows_by_index, result)?;
        let previous = metadata.insert(
            result.game_id.clone(),
            GameMetadata {
                match_id: result.match_id,
                game_index: result.game_index,
                round: result.round,
                date: row.date.clone(),
                outcome: row.outcome.clone(),
                reason: row.reason.clone(),
            },
        );
        if previous.is_some() {
            return Err(BughouseError::InternalError {
                message: format!("duplicate game id {}", result.game_id),
            }
            .into());
        }
    }

    Ok(metadata)
}

/// Attach game metadata to each participation row; every row must match exactly one game
pub fn join_metadata(
    participations: Vec<PlayerParticipation>,
    metadata: &HashMap<GameId, GameMetadata>,
) -> crate::error::Result<Vec<ParticipationRecord>> {
    let mut records = participations
        .into_iter()
        .map(|participation| -> crate::error::Result<ParticipationRecord> {
            let game = metadata
                .get(&participation.game_id)
                .cloned()
                .ok_or_else(|| BughouseError::InternalError {
                    message: format!("no game row for game id {}", participation.game_id),
                })?;
            Ok(ParticipationRecord {
                participation,
                game,
            })
        })
        .collect::<crate::error::Result<Vec<_>>>()?;

    records.sort_by_key(|record| record.game.game_index);
    Ok(records)
}

/// Explode and join all rated games, ordered by game index
pub fn participation_table(
    rows: &[GameRow],
    results: &[GameResult],
) -> crate::error::Result<Vec<ParticipationRecord>> {
    let rows_by_index = index_rows(rows)?;
    let mut participations = Vec::with_capacity(results.len() * 4);
    for result in results {
        let row = row_for(&rows_by_index, result)?;
        participations.extend(explode_game(row, result));
    }

    let metadata = game_metadata(rows, results)?;
    join_metadata(participations, &metadata)
}

fn index_rows(rows: &[GameRow]) -> crate::error::Result<HashMap<u64, &GameRow>> {
    let mut by_index = HashMap::with_capacity(rows.len());
    for row in rows {
        if by_index.insert(row.game_index, row).is_some() {
            return Err(BughouseError::InternalError {
                message: format!("duplicate game index {}", row.game_index),
            }
            .into());
        }
    }
    Ok(by_index)
}

fn row_for<'a>(
    rows_by_index: &HashMap<u64, &'a GameRow>,
    result: &GameResult,
) -> crate::error::Result<&'a GameRow> {
    rows_by_index
        .get(&result.game_index)
        .copied()
        .ok_or_else(|| {
            BughouseError::InternalError {
                message: format!("no game row for game index {}", result.game_index),
            }
            .into()
        })
}
