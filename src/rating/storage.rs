//! Team rating map
//!
//! Holds the current rating of every team seen during one run. Entries are
//! created the first time a team plays and are never removed.

use crate::types::TeamKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Current rating of a team with its game count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRatingEntry {
    pub team: TeamKey,
    pub rating: f64,
    pub games_played: u32,
}

impl TeamRatingEntry {
    /// Create a new entry for a team that has not played yet
    pub fn new(team: TeamKey, initial_rating: f64) -> Self {
        Self {
            team,
            rating: initial_rating,
            games_played: 0,
        }
    }

    /// Update the rating and increment games played
    pub fn update_rating(&mut self, new_rating: f64) {
        self.rating = new_rating;
        self.games_played += 1;
    }
}

/// Mapping from team key to current rating
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingMap {
    entries: HashMap<TeamKey, TeamRatingEntry>,
}

impl RatingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rating of a team, if it has played
    pub fn rating(&self, team: &TeamKey) -> Option<f64> {
        self.entries.get(team).map(|entry| entry.rating)
    }

    /// Entry for a team, or a fresh one at `initial_rating` if it has not played.
    ///
    /// The map is not modified.
    pub fn entry_or_initial(&self, team: &TeamKey, initial_rating: f64) -> TeamRatingEntry {
        self.entries
            .get(team)
            .cloned()
            .unwrap_or_else(|| TeamRatingEntry::new(team.clone(), initial_rating))
    }

    /// Store several entries together, overwriting existing ones
    pub fn store_all(&mut self, entries: impl IntoIterator<Item = TeamRatingEntry>) {
        for entry in entries {
            self.entries.insert(entry.team.clone(), entry);
        }
    }

    pub fn contains(&self, team: &TeamKey) -> bool {
        self.entries.contains_key(team)
    }

    /// Get total number of rated teams
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain `team -> rating` view with a stable key order
    pub fn to_btree(&self) -> BTreeMap<String, f64> {
        self.entries
            .iter()
            .map(|(team, entry)| (team.to_string(), entry.rating))
            .collect()
    }
}
