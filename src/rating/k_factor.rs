//! K-factor policies
//!
//! The step size of an Elo update can depend on how established a team is.
//! Only the constant policy is used by default.

use crate::config::rating::KFactorSettings;

/// Chooses the K-factor for one side of a game
pub trait KFactorPolicy: Send + Sync + std::fmt::Debug {
    /// K-factor for a team with the given pre-game rating and game count
    fn k_factor(&self, rating: f64, games_played: u32) -> f64;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Same K for every game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantKFactor {
    k: f64,
}

impl ConstantKFactor {
    pub fn new(k: f64) -> Self {
        Self { k }
    }
}

impl Default for ConstantKFactor {
    fn default() -> Self {
        Self::new(crate::config::rating::DEFAULT_K_FACTOR)
    }
}

impl KFactorPolicy for ConstantKFactor {
    fn k_factor(&self, _rating: f64, _games_played: u32) -> f64 {
        self.k
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

/// Provisional K for new teams, reduced K above an elite threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TieredKFactor {
    pub provisional_games: u32,
    pub provisional_k: f64,
    pub established_k: f64,
    pub elite_rating: f64,
    pub elite_k: f64,
}

impl KFactorPolicy for TieredKFactor {
    fn k_factor(&self, rating: f64, games_played: u32) -> f64 {
        if games_played < self.provisional_games {
            self.provisional_k
        } else if rating > self.elite_rating {
            self.elite_k
        } else {
            self.established_k
        }
    }

    fn name(&self) -> &'static str {
        "tiered"
    }
}

/// Build the policy selected in configuration
pub fn policy_from_settings(settings: &KFactorSettings) -> Box<dyn KFactorPolicy> {
    match settings {
        KFactorSettings::Constant { k } => Box::new(ConstantKFactor::new(*k)),
        KFactorSettings::Tiered {
            provisional_games,
            provisional_k,
            established_k,
            elite_rating,
            elite_k,
        } => Box::new(TieredKFactor {
            provisional_games: *provisional_games,
            provisional_k: *provisional_k,
            established_k: *established_k,
            elite_rating: *elite_rating,
            elite_k: *elite_k,
        }),
    }
}
