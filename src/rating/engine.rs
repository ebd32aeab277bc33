//! Incremental rating engine
//!
//! Folds games strictly in the order they are given. Each game updates the
//! red and blue team ratings from their pre-game values and is assigned to a
//! match: a game with round 1 opens a new match.

use crate::config::RatingConfig;
use crate::error::BughouseError;
use crate::rating::calculator::{EloCalculator, SideState};
use crate::rating::k_factor::{policy_from_settings, KFactorPolicy};
use crate::rating::storage::RatingMap;
use crate::table::SkippedRow;
use crate::types::{GameResult, GameRow, TeamKey};
use crate::utils::game_id;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Per-game results of folding a table, plus games the engine refused
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingRun {
    pub results: Vec<GameResult>,
    pub skipped: Vec<SkippedRow>,
}

/// Owns the rating state of one pass over a game sequence
#[derive(Debug)]
pub struct RatingEngine {
    start_rating: f64,
    calculator: EloCalculator,
    ratings: RatingMap,
    match_id: u64,
    games_processed: u64,
}

impl RatingEngine {
    /// Create an engine with the K-factor policy named in `config`
    pub fn new(config: &RatingConfig) -> crate::error::Result<Self> {
        Self::with_policy(config, policy_from_settings(&config.k_factor))
    }

    /// Create an engine with an explicit K-factor policy
    pub fn with_policy(
        config: &RatingConfig,
        policy: Box<dyn KFactorPolicy>,
    ) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self {
            start_rating: config.start_rating,
            calculator: EloCalculator::new(policy),
            ratings: RatingMap::new(),
            match_id: config.match_id_base,
            games_processed: 0,
        })
    }

    /// Rate one game.
    ///
    /// On error nothing is changed: neither ratings nor the match counter.
    pub fn process_game(&mut self, game: &GameRow) -> crate::error::Result<GameResult> {
        validate_game(game)?;

        let match_id = if game.round == 1 {
            self.match_id
                .checked_add(1)
                .ok_or_else(|| BughouseError::InternalError {
                    message: format!(
                        "match id overflow at game {} (current id {})",
                        game.game_index, self.match_id
                    ),
                })?
        } else {
            self.match_id
        };

        let mut red = self.ratings.entry_or_initial(&game.red, self.start_rating);
        let mut blue = self.ratings.entry_or_initial(&game.blue, self.start_rating);

        let update = self.calculator.calculate_pair(
            SideState {
                rating: red.rating,
                games_played: red.games_played,
            },
            SideState {
                rating: blue.rating,
                games_played: blue.games_played,
            },
            f64::from(game.score_red),
            f64::from(game.score_blue),
        );

        red.update_rating(update.red_after);
        blue.update_rating(update.blue_after);
        self.ratings.store_all([red, blue]);
        self.match_id = match_id;
        self.games_processed += 1;

        let result = GameResult {
            game_id: game_id(game.game_index, self.match_id, game.round),
            game_index: game.game_index,
            match_id: self.match_id,
            round: game.round,
            red: game.red.clone(),
            blue: game.blue.clone(),
            score_red: game.score_red,
            score_blue: game.score_blue,
            red_rating_before: update.red_before,
            blue_rating_before: update.blue_before,
            red_rating: update.red_after,
            blue_rating: update.blue_after,
        };

        debug!(
            "Game {} (match {}, round {}): {} {:.2} -> {:.2}, {} {:.2} -> {:.2}",
            result.game_id,
            result.match_id,
            result.round,
            result.red,
            result.red_rating_before,
            result.red_rating,
            result.blue,
            result.blue_rating_before,
            result.blue_rating
        );

        Ok(result)
    }

    /// Fold a whole table in order. Games the engine rejects are skipped and logged.
    pub fn process_table(&mut self, games: &[GameRow]) -> crate::error::Result<RatingRun> {
        let mut run = RatingRun::default();

        for game in games {
            match self.process_game(game) {
                Ok(result) => run.results.push(result),
                Err(e) => {
                    let Some(error) = e.downcast_ref::<BughouseError>().cloned() else {
                        return Err(e);
                    };
                    if !matches!(error, BughouseError::InvalidGameData { .. }) {
                        return Err(e);
                    }
                    warn!("Not rating game {}: {}", game.game_index, error);
                    run.skipped.push(SkippedRow {
                        game_index: game.game_index,
                        kind: error.kind().to_string(),
                        message: error.to_string(),
                    });
                }
            }
        }

        info!(
            "Rated {} games across {} teams using {} K-factor ({} skipped)",
            run.results.len(),
            self.ratings.len(),
            self.calculator.policy().name(),
            run.skipped.len()
        );
        Ok(run)
    }

    /// Current rating map
    pub fn ratings(&self) -> &RatingMap {
        &self.ratings
    }

    /// Consume the engine, keeping the final ratings
    pub fn into_ratings(self) -> RatingMap {
        self.ratings
    }

    /// Rating of a team; teams that have not played are at the start rating
    pub fn rating_of(&self, team: &TeamKey) -> f64 {
        self.ratings.rating(team).unwrap_or(self.start_rating)
    }

    /// Id of the match the last game belonged to
    pub fn current_match_id(&self) -> u64 {
        self.match_id
    }

    pub fn games_processed(&self) -> u64 {
        self.games_processed
    }
}

fn validate_game(game: &GameRow) -> crate::error::Result<()> {
    if game.round == 0 {
        return Err(BughouseError::InvalidGameData {
            game_index: game.game_index,
            reason: "round must be at least 1".to_string(),
        }
        .into());
    }

    if game.red == game.blue {
        return Err(BughouseError::InvalidGameData {
            game_index: game.game_index,
            reason: format!("team {} cannot play itself", game.red),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KFactorSettings;
    use crate::types::team_key;

    fn game(
        game_index: u64,
        round: u32,
        red: (&str, &str),
        blue: (&str, &str),
        score: (u32, u32),
    ) -> GameRow {
        GameRow {
            game_index,
            white_a: red.0.to_string(),
            black_b: red.1.to_string(),
            white_b: blue.0.to_string(),
            black_a: blue.1.to_string(),
            date: "2019.05.12".to_string(),
            played_on: None,
            round,
            result: format!("{}-{}", score.0, score.1),
            score_red: score.0,
            score_blue: score.1,
            outcome: String::new(),
            reason: "other".to_string(),
            red: team_key(red.0, red.1),
            blue: team_key(blue.0, blue.1),
        }
    }

    fn engine() -> RatingEngine {
        RatingEngine::new(&RatingConfig::default()).unwrap()
    }

    #[test]
    fn test_first_game_example() {
        let mut engine = engine();
        let result = engine
            .process_game(&game(1, 1, ("alice", "bob"), ("carol", "dave"), (1, 0)))
            .unwrap();

        assert_eq!(result.match_id, 1001);
        assert_eq!(result.game_id, "1-1001-1");
        assert_eq!(result.red_rating_before, 1600.0);
        assert_eq!(result.red_rating, 1610.0);
        assert_eq!(result.blue_rating, 1590.0);
        assert_eq!(engine.rating_of(&team_key("bob", "alice")), 1610.0);
        assert_eq!(engine.rating_of(&team_key("carol", "dave")), 1590.0);
    }

    #[test]
    fn test_match_id_follows_round_one() {
        let mut engine = engine();
        let rounds = [1, 2, 3, 1, 2, 1];
        let match_ids: Vec<u64> = rounds
            .iter()
            .enumerate()
            .map(|(i, round)| {
                engine
                    .process_game(&game(i as u64 + 1, *round, ("a", "b"), ("c", "d"), (1, 0)))
                    .unwrap()
                    .match_id
            })
            .collect();

        assert_eq!(match_ids, vec![1001, 1001, 1001, 1002, 1002, 1003]);
        assert_eq!(engine.current_match_id(), 1003);
    }

    #[test]
    fn test_sequence_starting_mid_match_keeps_base_id() {
        let mut engine = engine();
        let result = engine
            .process_game(&game(1, 2, ("a", "b"), ("c", "d"), (0, 1)))
            .unwrap();
        assert_eq!(result.match_id, 1000);
    }

    #[test]
    fn test_new_team_equals_team_at_start_rating() {
        let mut engine = engine();
        engine
            .process_game(&game(1, 1, ("a", "b"), ("c", "d"), (1, 0)))
            .unwrap();
        engine
            .process_game(&game(2, 2, ("a", "b"), ("c", "d"), (0, 1)))
            .unwrap();

        // a,b went 1610 -> back toward 1600; a brand new team starts at 1600
        let returning = engine.rating_of(&team_key("a", "b"));
        let fresh = engine.rating_of(&team_key("x", "y"));
        assert_eq!(fresh, 1600.0);
        assert!(!engine.ratings().contains(&team_key("x", "y")));
        assert!(returning < 1610.0);
    }

    #[test]
    fn test_invalid_game_does_not_mutate_state() {
        let mut engine = engine();
        engine
            .process_game(&game(1, 1, ("a", "b"), ("c", "d"), (1, 0)))
            .unwrap();
        let before = engine.ratings().clone();

        let mut bad = game(2, 1, ("a", "b"), ("e", "f"), (1, 0));
        bad.round = 0;
        let err = engine.process_game(&bad).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BughouseError>().unwrap().kind(),
            "invalid_game_data"
        );

        let self_play = game(3, 1, ("a", "b"), ("b", "a"), (1, 0));
        assert!(engine.process_game(&self_play).is_err());

        assert_eq!(engine.ratings(), &before);
        assert_eq!(engine.current_match_id(), 1001);
        assert_eq!(engine.games_processed(), 1);
    }

    #[test]
    fn test_match_id_overflow_is_an_error() {
        let config = RatingConfig {
            match_id_base: u64::MAX,
            ..RatingConfig::default()
        };
        let mut engine = RatingEngine::new(&config).unwrap();

        let continuing = engine
            .process_game(&game(1, 2, ("a", "b"), ("c", "d"), (1, 0)))
            .unwrap();
        assert_eq!(continuing.match_id, u64::MAX);
        let before = engine.ratings().clone();

        let err = engine
            .process_game(&game(2, 1, ("a", "b"), ("c", "d"), (1, 0)))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<BughouseError>().unwrap().kind(),
            "internal"
        );
        assert_eq!(engine.ratings(), &before);
        assert_eq!(engine.current_match_id(), u64::MAX);

        // Not a row-level problem, so the fold stops
        assert!(engine
            .process_table(&[game(3, 1, ("a", "b"), ("c", "d"), (1, 0))])
            .is_err());
    }

    #[test]
    fn test_process_table_skips_rejected_games() {
        let mut engine = engine();
        let games = vec![
            game(1, 1, ("a", "b"), ("c", "d"), (1, 0)),
            game(2, 2, ("a", "b"), ("a", "b"), (1, 0)),
            game(3, 3, ("a", "b"), ("c", "d"), (1, 0)),
        ];

        let run = engine.process_table(&games).unwrap();
        assert_eq!(run.results.len(), 2);
        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.skipped[0].game_index, 2);
        assert_eq!(run.results[1].game_id, "3-1001-3");
    }

    #[test]
    fn test_fold_is_order_sensitive() {
        let g1 = game(1, 1, ("a", "b"), ("c", "d"), (1, 0));
        let g2 = game(2, 2, ("a", "b"), ("e", "f"), (0, 1));
        let g3 = game(3, 3, ("c", "d"), ("e", "f"), (1, 0));

        let mut forward = engine();
        forward
            .process_table(&[g1.clone(), g2.clone(), g3.clone()])
            .unwrap();

        let mut reversed = engine();
        reversed.process_table(&[g3, g2, g1]).unwrap();

        assert_ne!(forward.ratings(), reversed.ratings());
    }

    #[test]
    fn test_tiered_policy_from_config() {
        let config = RatingConfig {
            k_factor: KFactorSettings::tiered(),
            ..RatingConfig::default()
        };
        let mut engine = RatingEngine::new(&config).unwrap();
        let result = engine
            .process_game(&game(1, 1, ("a", "b"), ("c", "d"), (1, 0)))
            .unwrap();

        assert_eq!(result.red_rating, 1620.0);
        assert_eq!(result.blue_rating, 1580.0);
    }

    #[test]
    fn test_independent_engines() {
        let mut first = engine();
        let second = engine();
        first
            .process_game(&game(1, 1, ("a", "b"), ("c", "d"), (1, 0)))
            .unwrap();

        assert_eq!(first.ratings().len(), 2);
        assert!(second.ratings().is_empty());
    }
}
