//! Common types used throughout the rating pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a single player as it appears in the game record
pub type PlayerId = String;

/// Composite game identifier: `{game_index}-{match_id}-{round}`
pub type GameId = String;

/// Canonical identity of a two-player partnership.
///
/// The two player ids are sorted lexicographically and joined with a comma,
/// so `TeamKey::new("bob", "alice")` and `TeamKey::new("alice", "bob")` are
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamKey(String);

impl TeamKey {
    pub fn new(first: &str, second: &str) -> Self {
        let (low, high) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        Self(format!("{},{}", low, high))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TeamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical team key for a pair of players
pub fn team_key(first: &str, second: &str) -> TeamKey {
    TeamKey::new(first, second)
}

/// The two partnerships of a bughouse game.
///
/// Red is WhiteA + BlackB, Blue is WhiteB + BlackA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Red,
    Blue,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Red => write!(f, "Red"),
            Side::Blue => write!(f, "Blue"),
        }
    }
}

/// Board of a bughouse game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Board {
    A,
    B,
}

/// Piece colour a player had on their board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// Fields extracted from one fetched game record.
///
/// `None` means the tag was not present in the record at all, which is not
/// the same as a tag present with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub game_index: u64,
    pub white_a: Option<String>,
    pub white_b: Option<String>,
    pub black_a: Option<String>,
    pub black_b: Option<String>,
    pub date: Option<String>,
    pub round: Option<String>,
    pub result: Option<String>,
    pub termination: Option<String>,
    pub outcome: Option<String>,
}

/// One normalized game, ready for the rating engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRow {
    /// Fetch sequence index; the arrival order the engine folds in
    pub game_index: u64,
    pub white_a: PlayerId,
    pub white_b: PlayerId,
    pub black_a: PlayerId,
    pub black_b: PlayerId,
    pub date: String,
    pub played_on: Option<NaiveDate>,
    pub round: u32,
    pub result: String,
    pub score_red: u32,
    pub score_blue: u32,
    pub outcome: String,
    pub reason: String,
    pub red: TeamKey,
    pub blue: TeamKey,
}

/// Rating snapshot emitted by the engine for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: GameId,
    pub game_index: u64,
    pub match_id: u64,
    pub round: u32,
    pub red: TeamKey,
    pub blue: TeamKey,
    pub score_red: u32,
    pub score_blue: u32,
    pub red_rating_before: f64,
    pub blue_rating_before: f64,
    pub red_rating: f64,
    pub blue_rating: f64,
}
