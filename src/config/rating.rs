//! Rating system configuration

use serde::{Deserialize, Serialize};

/// Rating value every team starts from
pub const DEFAULT_START_RATING: f64 = 1600.0;

/// Match counter value before the first match; the first match is base + 1
pub const DEFAULT_MATCH_ID_BASE: u64 = 1000;

/// Step size of the constant K-factor policy
pub const DEFAULT_K_FACTOR: f64 = 20.0;

/// Parameters of the Elo fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub start_rating: f64,
    pub match_id_base: u64,
    pub k_factor: KFactorSettings,
}

/// Which K-factor policy the engine uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum KFactorSettings {
    /// Same K for every game
    Constant { k: f64 },
    /// Faster movement for new teams, slower for the top of the table
    Tiered {
        provisional_games: u32,
        provisional_k: f64,
        established_k: f64,
        elite_rating: f64,
        elite_k: f64,
    },
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            start_rating: DEFAULT_START_RATING,
            match_id_base: DEFAULT_MATCH_ID_BASE,
            k_factor: KFactorSettings::default(),
        }
    }
}

impl Default for KFactorSettings {
    fn default() -> Self {
        KFactorSettings::Constant {
            k: DEFAULT_K_FACTOR,
        }
    }
}

impl KFactorSettings {
    /// Tiered preset: K 40 for the first 30 games, K 10 above 2500, else 20
    pub fn tiered() -> Self {
        KFactorSettings::Tiered {
            provisional_games: 30,
            provisional_k: 40.0,
            established_k: DEFAULT_K_FACTOR,
            elite_rating: 2500.0,
            elite_k: 10.0,
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.start_rating.is_finite() {
            return Err(crate::error::BughouseError::ConfigurationError {
                message: "Start rating must be finite".to_string(),
            }
            .into());
        }

        let ks: Vec<f64> = match &self.k_factor {
            KFactorSettings::Constant { k } => vec![*k],
            KFactorSettings::Tiered {
                provisional_k,
                established_k,
                elite_rating,
                elite_k,
                ..
            } => {
                if !elite_rating.is_finite() {
                    return Err(crate::error::BughouseError::ConfigurationError {
                        message: "Elite rating threshold must be finite".to_string(),
                    }
                    .into());
                }
                vec![*provisional_k, *established_k, *elite_k]
            }
        };

        if ks.iter().any(|k| !k.is_finite() || *k <= 0.0) {
            return Err(crate::error::BughouseError::ConfigurationError {
                message: "K-factor must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_config_default() {
        let config = RatingConfig::default();
        assert_eq!(config.start_rating, 1600.0);
        assert_eq!(config.match_id_base, 1000);
        assert_eq!(config.k_factor, KFactorSettings::Constant { k: 20.0 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rating_config_validation() {
        let mut config = RatingConfig::default();
        config.k_factor = KFactorSettings::Constant { k: 0.0 };
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.start_rating = f64::NAN;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.k_factor = KFactorSettings::tiered();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_k_factor_settings_from_toml() {
        let config: RatingConfig = toml::from_str(
            r#"
            start_rating = 1500.0

            [k_factor]
            policy = "tiered"
            provisional_games = 10
            provisional_k = 32.0
            established_k = 16.0
            elite_rating = 2400.0
            elite_k = 8.0
            "#,
        )
        .unwrap();

        assert_eq!(config.start_rating, 1500.0);
        assert_eq!(config.match_id_base, 1000);
        assert!(matches!(
            config.k_factor,
            KFactorSettings::Tiered {
                provisional_games: 10,
                ..
            }
        ));
    }
}
