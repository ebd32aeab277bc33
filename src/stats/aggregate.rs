//! Team and player summaries over participation rows

use crate::rating::RatingMap;
use crate::stats::participation::ParticipationRecord;
use crate::types::{GameId, PlayerId, TeamKey};
use crate::utils::ratio;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// Summary of one team over every game it played
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStat {
    pub team: TeamKey,
    pub matches: usize,
    pub games: usize,
    pub score: f64,
    pub win_rate: f64,
    /// Latest rating of the team
    pub rating: f64,
}

/// Summary of one player over every game they played
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub player: PlayerId,
    pub matches: usize,
    pub games: usize,
    pub teams: usize,
    pub score: f64,
    pub win_rate: f64,
}

#[derive(Default)]
struct Tally {
    matches: HashSet<u64>,
    games: HashSet<GameId>,
    teams: HashSet<TeamKey>,
    score: u64,
    last_rating: f64,
}

impl Tally {
    fn add(&mut self, record: &ParticipationRecord) {
        let participation = &record.participation;
        self.matches.insert(record.game.match_id);
        self.games.insert(participation.game_id.clone());
        self.teams.insert(participation.team.clone());
        self.score += u64::from(participation.score);
        self.last_rating = participation.rating;
    }
}

/// Per-team summary, best win rate first.
///
/// A team appears twice in each of its games' participation rows (once per
/// member), so the summed score is halved.
pub fn team_stats(records: &[ParticipationRecord], ratings: &RatingMap) -> Vec<TeamStat> {
    let mut tallies: BTreeMap<&TeamKey, Tally> = BTreeMap::new();
    for record in records {
        tallies
            .entry(&record.participation.team)
            .or_default()
            .add(record);
    }

    let mut stats: Vec<TeamStat> = tallies
        .into_iter()
        .map(|(team, tally)| {
            let games = tally.games.len();
            let score = tally.score as f64 / 2.0;
            TeamStat {
                team: team.clone(),
                matches: tally.matches.len(),
                games,
                score,
                win_rate: ratio(score, games),
                rating: ratings.rating(team).unwrap_or(tally.last_rating),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        by_win_rate_then_games((a.win_rate, a.games), (b.win_rate, b.games))
            .then_with(|| a.team.cmp(&b.team))
    });
    stats
}

/// Per-player summary, best win rate first
pub fn player_stats(records: &[ParticipationRecord]) -> Vec<PlayerStat> {
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    for record in records {
        tallies
            .entry(record.participation.player.as_str())
            .or_default()
            .add(record);
    }

    let mut stats: Vec<PlayerStat> = tallies
        .into_iter()
        .map(|(player, tally)| {
            let games = tally.games.len();
            let score = tally.score as f64;
            PlayerStat {
                player: player.to_string(),
                matches: tally.matches.len(),
                games,
                teams: tally.teams.len(),
                score,
                win_rate: ratio(score, games),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        by_win_rate_then_games((a.win_rate, a.games), (b.win_rate, b.games))
            .then_with(|| a.player.cmp(&b.player))
    });
    stats
}

fn by_win_rate_then_games(a: (f64, usize), b: (f64, usize)) -> Ordering {
    b.0.partial_cmp(&a.0)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.1.cmp(&a.1))
}
