//! Stolen-base attempts, evaluated before each plate appearance.

use crate::engine::baserunning::{MarkovState, FIRST, SECOND, THIRD};
use crate::engine::config::TacticsConfig;
use crate::engine::probability::clamp_probability;
use crate::engine::rng::Generator;
use crate::models::player::attr_delta;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StealInputs {
    pub state: MarkovState,
    /// Base the runner is leaving (1 or 2).
    pub from: u8,
    pub runner_speed: u16,
    pub runner_iq: u16,
    pub pitcher_hold: u16,
    /// Catcher arm strength; drives pop time.
    pub catcher_arm: Option<u16>,
    pub batting_lead: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StealAttempt {
    pub from: u8,
    pub success: bool,
}

/// Runner who could steal: the runner on second with third open, otherwise
/// the runner on first with second open.
pub fn steal_candidate(state: MarkovState) -> Option<u8> {
    if state.outs >= 3 {
        return None;
    }
    let r = state.runners;
    if r & SECOND != 0 && r & THIRD == 0 {
        Some(2)
    } else if r & FIRST != 0 && r & SECOND == 0 {
        Some(1)
    } else {
        None
    }
}

pub fn attempt_probability(inputs: &StealInputs, cfg: &TacticsConfig) -> f64 {
    if inputs.runner_speed < cfg.steal_min_speed || inputs.state.outs >= 3 {
        return 0.0;
    }
    // Nobody runs when down big or when the game is out of reach.
    if inputs.batting_lead <= -4 || inputs.batting_lead >= 6 {
        return 0.0;
    }
    let mut p = cfg.steal_attempt_base
        * (1.2 * attr_delta(inputs.runner_speed) + 0.3 * attr_delta(inputs.runner_iq)
            - 0.4 * attr_delta(inputs.pitcher_hold))
        .exp();
    if inputs.from == 2 {
        p *= 0.35;
    }
    if inputs.state.outs == 2 {
        p *= 0.8;
    }
    clamp_probability(p).min(0.5)
}

pub fn success_probability(inputs: &StealInputs, cfg: &TacticsConfig) -> f64 {
    let arm = inputs.catcher_arm.map(attr_delta).unwrap_or(0.0);
    let mut p = cfg.steal_success_base + 0.10 * attr_delta(inputs.runner_speed)
        + 0.03 * attr_delta(inputs.runner_iq)
        - 0.05 * attr_delta(inputs.pitcher_hold)
        - 0.06 * arm;
    if inputs.from == 2 {
        p -= 0.04;
    }
    p.clamp(0.30, 0.95)
}

/// Zero draws when no attempt is possible, one when the runner holds, two
/// when the runner goes.
pub fn consider_steal(
    inputs: &StealInputs,
    cfg: &TacticsConfig,
    gen: Generator,
) -> (Option<StealAttempt>, Generator) {
    let p = attempt_probability(inputs, cfg);
    if p <= 0.0 {
        return (None, gen);
    }
    let (goes, gen) = gen.chance(p);
    if !goes {
        return (None, gen);
    }
    let (success, gen) = gen.chance(success_probability(inputs, cfg));
    (Some(StealAttempt { from: inputs.from, success }), gen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(speed: u16) -> StealInputs {
        StealInputs {
            state: MarkovState::new(FIRST, 0),
            from: 1,
            runner_speed: speed,
            runner_iq: 400,
            pitcher_hold: 400,
            catcher_arm: Some(400),
            batting_lead: 0,
        }
    }

    #[test]
    fn test_candidate_requires_open_base() {
        assert_eq!(steal_candidate(MarkovState::new(FIRST, 0)), Some(1));
        assert_eq!(steal_candidate(MarkovState::new(SECOND | FIRST, 1)), Some(2));
        assert_eq!(steal_candidate(MarkovState::new(FIRST | SECOND | THIRD, 0)), None);
        assert_eq!(steal_candidate(MarkovState::new(THIRD, 0)), None);
    }

    #[test]
    fn test_slow_runners_never_go() {
        let cfg = TacticsConfig::default();
        assert_eq!(attempt_probability(&inputs(300), &cfg), 0.0);
        let (attempt, gen) = consider_steal(&inputs(300), &cfg, Generator::create(1));
        assert!(attempt.is_none());
        assert_eq!(gen, Generator::create(1));
    }

    #[test]
    fn test_speed_and_hold_shape_odds() {
        let cfg = TacticsConfig::default();
        let fast = inputs(530);
        let mut held = fast;
        held.pitcher_hold = 540;
        assert!(attempt_probability(&fast, &cfg) > attempt_probability(&held, &cfg));
        assert!(success_probability(&fast, &cfg) > success_probability(&held, &cfg));
        assert!(success_probability(&fast, &cfg) <= 0.95);
    }
}
