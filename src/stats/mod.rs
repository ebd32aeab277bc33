//! Player and team statistics
//!
//! Each rated game is exploded into one participation row per player, joined
//! back to the game's metadata, then grouped by team and by player.

pub mod aggregate;
pub mod participation;

pub use aggregate::{player_stats, team_stats, PlayerStat, TeamStat};
pub use participation::{
    explode_game, game_metadata, join_metadata, participation_table, GameMetadata,
    ParticipationRecord, PlayerParticipation,
};
