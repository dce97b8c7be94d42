//! # Engine Configuration
//!
//! Every tuning constant of the simulation lives here, grouped by concern.
//!
//! ## Usage
//! ```rust
//! use bb_core::engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let live = EngineConfig::live_ball();
//! assert!(live.league.hr > config.league.hr);
//! ```

mod log5_config;
mod pitching_config;
mod rules_config;
mod tactics_config;

pub use log5_config::Log5Config;
pub use pitching_config::PitchingConfig;
pub use rules_config::{GameRulesConfig, SchedulerConfig};
pub use tactics_config::TacticsConfig;

use serde::{Deserialize, Serialize};

use crate::engine::rates::LeagueRates;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// League-average outcome rates
    #[serde(default)]
    pub league: LeagueRates,
    #[serde(default)]
    pub log5: Log5Config,
    #[serde(default)]
    pub pitching: PitchingConfig,
    #[serde(default)]
    pub tactics: TacticsConfig,
    #[serde(default)]
    pub rules: GameRulesConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl EngineConfig {
    pub fn realistic() -> Self {
        Self::default()
    }

    /// Juiced-ball environment: more home runs, fewer strikeouts.
    pub fn live_ball() -> Self {
        let mut cfg = Self::default();
        cfg.league.hr *= 1.25;
        cfg.league.k *= 0.92;
        cfg.league.babip_fly *= 1.08;
        cfg
    }

    /// Low-offense environment.
    pub fn dead_ball() -> Self {
        let mut cfg = Self::default();
        cfg.league.hr *= 0.65;
        cfg.league.k *= 0.85;
        cfg.league.babip_ground *= 1.05;
        cfg.tactics.steal_attempt_base *= 2.0;
        cfg.tactics.bunt_max_offense += 40.0;
        cfg
    }

    /// Plain plate appearances with no tactical interventions (tests).
    pub fn deterministic_tactics() -> Self {
        let mut cfg = Self::default();
        cfg.tactics.enabled = false;
        cfg
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: EngineConfig = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: EngineConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let league = &self.league;
        let rates = [
            ("league.k", league.k),
            ("league.bb", league.bb),
            ("league.hbp", league.hbp),
            ("league.hr", league.hr),
            ("league.babip_ground", league.babip_ground),
            ("league.babip_fly", league.babip_fly),
            ("league.babip_line", league.babip_line),
            ("league.babip_popup", league.babip_popup),
        ];
        for (name, value) in rates {
            if !value.is_finite() || !(0.0..1.0).contains(&value) {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be in [0, 1): {}",
                    name, value
                )));
            }
        }
        if league.k + league.bb + league.hbp + league.hr >= 1.0 - self.log5.min_ball_in_play {
            return Err(EngineError::InvalidConfig(
                "non-contact rates leave no room for balls in play".into(),
            ));
        }
        let weights = [
            self.log5.k_pitcher_control,
            self.log5.bb_pitcher_control,
            self.log5.hbp_pitcher_control,
            self.log5.hr_pitcher_control,
        ];
        if weights.iter().any(|w| !w.is_finite() || !(0.0..=1.0).contains(w)) {
            return Err(EngineError::InvalidConfig("control weights must lie in [0, 1]".into()));
        }
        if !(self.log5.squash_max > 0.0 && self.log5.squash_max < 1.0) {
            return Err(EngineError::InvalidConfig("squash_max must lie in (0, 1)".into()));
        }
        let rules = &self.rules;
        if rules.regulation_innings == 0 || rules.max_innings < rules.regulation_innings {
            return Err(EngineError::InvalidConfig(
                "max_innings must be at least regulation_innings".into(),
            ));
        }
        if self.scheduler.batch_size == 0 {
            return Err(EngineError::InvalidConfig("batch_size must be positive".into()));
        }
        Ok(())
    }
}
