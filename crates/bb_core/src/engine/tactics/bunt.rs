//! Sacrifice bunts.

use serde::{Deserialize, Serialize};

use crate::engine::baserunning::{self, MarkovState, Transition, FIRST, SECOND, THIRD};
use crate::engine::config::TacticsConfig;
use crate::engine::probability;
use crate::engine::rng::Generator;
use crate::models::player::{attr_delta, HitterAttributes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuntOutcome {
    /// Batter out, runners advance.
    Sacrifice,
    BuntHit,
    /// Fielder's choice on the lead runner.
    LeadRunnerOut,
    DoublePlay,
    /// Popped up or struck out bunting; runners hold.
    Failed,
}

/// Weak bat, runner on first or second with third open, nobody out, late
/// and close.
pub fn should_bunt(
    batter: &HitterAttributes,
    state: MarkovState,
    inning: u8,
    batting_lead: i32,
    cfg: &TacticsConfig,
) -> bool {
    cfg.bunt_enabled
        && state.outs == 0
        && state.runners & (FIRST | SECOND) != 0
        && state.runners & THIRD == 0
        && inning >= cfg.bunt_min_inning
        && (-1..=0).contains(&batting_lead)
        && batter.offense_rating() <= cfg.bunt_max_offense
}

/// `[sacrifice, hit, lead_runner_out, double_play, failed]`.
pub fn bunt_weights(batter: &HitterAttributes) -> [f64; 5] {
    let hit = 0.06 * (0.8 * attr_delta(batter.speed)).exp();
    let failed = 0.10 * (-0.3 * attr_delta(batter.contact)).exp();
    let lead_out = 0.12;
    let double_play = 0.03;
    let ([hit, lead_out, double_play, failed], sacrifice) =
        probability::with_remainder([hit, lead_out, double_play, failed], 0.4);
    [sacrifice, hit, lead_out, double_play, failed]
}

pub fn resolve_bunt(batter: &HitterAttributes, gen: Generator) -> (BuntOutcome, Generator) {
    let (idx, gen) = gen.choose_weighted(&bunt_weights(batter));
    let outcome = match idx {
        0 => BuntOutcome::Sacrifice,
        1 => BuntOutcome::BuntHit,
        2 => BuntOutcome::LeadRunnerOut,
        3 => BuntOutcome::DoublePlay,
        _ => BuntOutcome::Failed,
    };
    (outcome, gen)
}

pub fn apply_bunt(state: MarkovState, outcome: BuntOutcome) -> Transition {
    match outcome {
        BuntOutcome::Sacrifice => baserunning::sacrifice_bunt(state),
        BuntOutcome::BuntHit => baserunning::bunt_hit(state),
        BuntOutcome::LeadRunnerOut => baserunning::fielders_choice(state),
        BuntOutcome::DoublePlay => baserunning::batter_and_lead_runner_out(state),
        BuntOutcome::Failed => baserunning::batter_out(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bunt_gate() {
        let cfg = TacticsConfig::default();
        let weak = HitterAttributes::uniform(300);
        let state = MarkovState::new(FIRST, 0);
        assert!(should_bunt(&weak, state, 8, 0, &cfg));
        assert!(!should_bunt(&weak, state, 3, 0, &cfg));
        assert!(!should_bunt(&weak, MarkovState::new(FIRST, 1), 8, 0, &cfg));
        assert!(!should_bunt(&HitterAttributes::uniform(450), state, 8, 0, &cfg));
        assert!(!should_bunt(&weak, state, 8, 3, &cfg));
    }

    #[test]
    fn test_sacrifice_is_most_likely() {
        let w = bunt_weights(&HitterAttributes::default());
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(w[0] > 0.6);
    }

    #[test]
    fn test_apply_sacrifice_moves_runner() {
        let t = apply_bunt(MarkovState::new(FIRST, 0), BuntOutcome::Sacrifice);
        assert_eq!(t.state, MarkovState::new(SECOND, 1));
        let t = apply_bunt(MarkovState::new(FIRST | SECOND, 0), BuntOutcome::DoublePlay);
        assert_eq!(t.state.outs, 2);
        assert_eq!(t.state.runners, FIRST);
    }
}
