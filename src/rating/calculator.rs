//! Elo expected score and paired rating updates
//!
//! Both sides of a game are updated from each other's pre-game rating: the
//! red update never sees the new blue rating and vice versa.

use crate::rating::k_factor::{ConstantKFactor, KFactorPolicy};
use crate::utils::round_to_cents;
use serde::{Deserialize, Serialize};
use skillratings::elo::{expected_score, EloRating};

/// Probability that a player rated `rating` beats one rated `opponent_rating`.
///
/// `elo_prob(2882.0, 2722.0)` is about 0.7152.
pub fn elo_prob(rating: f64, opponent_rating: f64) -> f64 {
    let (expected, _) = expected_score(
        &EloRating { rating },
        &EloRating {
            rating: opponent_rating,
        },
    );
    expected
}

/// New rating after scoring `score` against `opponent_rating`, rounded to cents.
///
/// `score` is not clamped to [0, 1].
pub fn elo_update(rating: f64, opponent_rating: f64, score: f64, k: f64) -> f64 {
    let expected = elo_prob(rating, opponent_rating);
    round_to_cents(rating + k * (score - expected))
}

/// Pre-game state of one side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideState {
    pub rating: f64,
    pub games_played: u32,
}

/// Result of updating both sides of one game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairedUpdate {
    pub red_before: f64,
    pub blue_before: f64,
    pub red_after: f64,
    pub blue_after: f64,
    pub expected_red: f64,
    pub expected_blue: f64,
    pub k_red: f64,
    pub k_blue: f64,
}

impl PairedUpdate {
    pub fn red_delta(&self) -> f64 {
        self.red_after - self.red_before
    }

    pub fn blue_delta(&self) -> f64 {
        self.blue_after - self.blue_before
    }
}

/// Elo calculator with a pluggable K-factor policy
#[derive(Debug)]
pub struct EloCalculator {
    policy: Box<dyn KFactorPolicy>,
}

impl EloCalculator {
    pub fn new(policy: Box<dyn KFactorPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &dyn KFactorPolicy {
        self.policy.as_ref()
    }

    /// Update both sides simultaneously from their pre-game states
    pub fn calculate_pair(
        &self,
        red: SideState,
        blue: SideState,
        score_red: f64,
        score_blue: f64,
    ) -> PairedUpdate {
        let k_red = self.policy.k_factor(red.rating, red.games_played);
        let k_blue = self.policy.k_factor(blue.rating, blue.games_played);

        PairedUpdate {
            red_before: red.rating,
            blue_before: blue.rating,
            red_after: elo_update(red.rating, blue.rating, score_red, k_red),
            blue_after: elo_update(blue.rating, red.rating, score_blue, k_blue),
            expected_red: elo_prob(red.rating, blue.rating),
            expected_blue: elo_prob(blue.rating, red.rating),
            k_red,
            k_blue,
        }
    }
}

impl Default for EloCalculator {
    fn default() -> Self {
        Self::new(Box::new(ConstantKFactor::default()))
    }
}
