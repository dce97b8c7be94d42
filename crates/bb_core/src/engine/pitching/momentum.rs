//! Pitcher confidence within a game.
//!
//! Rises with consecutive outs, falls with baserunners and runs allowed.
//! Mental toughness damps the negative swings. Between innings part of the
//! confidence carries over; a pitching change starts from neutral.

use serde::{Deserialize, Serialize};

use crate::engine::config::PitchingConfig;
use crate::models::player::attr_delta;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MomentumState {
    pub consecutive_outs: u32,
    pub consecutive_baserunners: u32,
    pub runs_this_inning: u32,
    /// Bounded confidence, `[-momentum_max, momentum_max]`.
    pub confidence: f64,
}

impl MomentumState {
    pub fn fresh() -> Self {
        Self::default()
    }

    /// Multiplier on negative swings: 0.7 at 550 toughness, 1.4 at 100.
    fn resilience(mental_toughness: u16) -> f64 {
        (1.0 - 0.2 * attr_delta(mental_toughness)).clamp(0.7, 1.4)
    }

    fn apply(&mut self, delta: f64, cfg: &PitchingConfig) {
        self.confidence = (self.confidence + delta).clamp(-cfg.momentum_max, cfg.momentum_max);
    }

    pub fn record_out(&mut self, outs: u8, cfg: &PitchingConfig) {
        for _ in 0..outs {
            self.consecutive_outs += 1;
            let streak = f64::from(self.consecutive_outs.min(6)) / 6.0;
            self.apply(0.01 * (1.0 + 0.5 * streak), cfg);
        }
        self.consecutive_baserunners = 0;
    }

    pub fn record_baserunner(&mut self, mental_toughness: u16, cfg: &PitchingConfig) {
        self.consecutive_baserunners += 1;
        self.consecutive_outs = 0;
        let streak = f64::from(self.consecutive_baserunners.min(4)) / 4.0;
        self.apply(-0.012 * (1.0 + streak) * Self::resilience(mental_toughness), cfg);
    }

    pub fn record_runs(&mut self, runs: u32, mental_toughness: u16, cfg: &PitchingConfig) {
        if runs == 0 {
            return;
        }
        self.runs_this_inning += runs;
        self.apply(-0.02 * f64::from(runs) * Self::resilience(mental_toughness), cfg);
    }

    /// Partial regression toward neutral for the same pitcher's next inning.
    pub fn end_inning(&mut self, cfg: &PitchingConfig) {
        self.confidence *= cfg.momentum_carry.clamp(0.0, 1.0);
        self.consecutive_outs = 0;
        self.consecutive_baserunners = 0;
        self.runs_this_inning = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outs_build_confidence_to_cap() {
        let cfg = PitchingConfig::default();
        let mut m = MomentumState::fresh();
        for _ in 0..40 {
            m.record_out(1, &cfg);
        }
        assert!((m.confidence - cfg.momentum_max).abs() < 1e-12);
    }

    #[test]
    fn test_toughness_damps_bad_innings() {
        let cfg = PitchingConfig::default();
        let mut tough = MomentumState::fresh();
        let mut fragile = MomentumState::fresh();
        for _ in 0..3 {
            tough.record_baserunner(540, &cfg);
            fragile.record_baserunner(200, &cfg);
        }
        tough.record_runs(2, 540, &cfg);
        fragile.record_runs(2, 200, &cfg);
        assert!(tough.confidence > fragile.confidence);
        assert!(fragile.confidence >= -cfg.momentum_max);
    }

    #[test]
    fn test_inning_break_decays_without_reset() {
        let cfg = PitchingConfig::default();
        let mut m = MomentumState::fresh();
        m.record_out(3, &cfg);
        let before = m.confidence;
        m.end_inning(&cfg);
        assert!(m.confidence > 0.0 && m.confidence < before);
        assert_eq!(m.consecutive_outs, 0);
    }
}
