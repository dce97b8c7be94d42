//! Wild pitches and passed balls between plate appearances.

use serde::{Deserialize, Serialize};

use crate::engine::baserunning::MarkovState;
use crate::engine::config::TacticsConfig;
use crate::engine::probability::clamp_probability;
use crate::engine::rng::Generator;
use crate::models::player::{attr_delta, HitterAttributes, PitcherAttributes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryError {
    WildPitch,
    PassedBall,
}

pub fn battery_error_probability(
    pitcher: &PitcherAttributes,
    catcher: Option<&HitterAttributes>,
    cfg: &TacticsConfig,
) -> f64 {
    let breaking = pitcher.pitch_mix.normalized().breaking;
    let receiving = catcher.map(|c| attr_delta(c.fielding)).unwrap_or(0.0);
    let p = cfg.wild_pitch_base
        * (-0.5 * attr_delta(pitcher.command) + 0.8 * (breaking - 0.28) - 0.3 * receiving).exp();
    clamp_probability(p).min(0.1)
}

/// No draw with the bases empty; one draw otherwise, and a second to split
/// wild pitch from passed ball.
pub fn check_battery_error(
    state: MarkovState,
    pitcher: &PitcherAttributes,
    catcher: Option<&HitterAttributes>,
    cfg: &TacticsConfig,
    gen: Generator,
) -> (Option<BatteryError>, Generator) {
    if state.runners == 0 || state.inning_over() {
        return (None, gen);
    }
    let (happens, gen) = gen.chance(battery_error_probability(pitcher, catcher, cfg));
    if !happens {
        return (None, gen);
    }
    let receiving = catcher.map(|c| attr_delta(c.fielding)).unwrap_or(0.0);
    let passed_share = clamp_probability(cfg.passed_ball_share * (-0.5 * receiving).exp());
    let (passed, gen) = gen.chance(passed_share);
    let kind = if passed { BatteryError::PassedBall } else { BatteryError::WildPitch };
    (Some(kind), gen)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bases_empty_consumes_nothing() {
        let cfg = TacticsConfig::default();
        let gen = Generator::create(8);
        let pitcher = PitcherAttributes::default();
        let (event, next) =
            check_battery_error(MarkovState::new(0, 1), &pitcher, None, &cfg, gen.clone());
        assert!(event.is_none());
        assert_eq!(next, gen);
    }

    #[test]
    fn test_wild_arms_throw_more_wild_pitches() {
        let cfg = TacticsConfig::default();
        let mut wild = PitcherAttributes::default();
        wild.command = 200;
        wild.pitch_mix.breaking = 0.5;
        let base = battery_error_probability(&PitcherAttributes::default(), None, &cfg);
        assert!(battery_error_probability(&wild, None, &cfg) > base * 2.0);
    }

    #[test]
    fn test_good_catcher_blocks_more() {
        let cfg = TacticsConfig::default();
        let pitcher = PitcherAttributes::default();
        let mut catcher = HitterAttributes::default();
        catcher.fielding = 540;
        let with_glove = battery_error_probability(&pitcher, Some(&catcher), &cfg);
        assert!(with_glove < battery_error_probability(&pitcher, None, &cfg));
    }
}
