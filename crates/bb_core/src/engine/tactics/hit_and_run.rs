//! Hit-and-run: the runner on first goes with the pitch, the batter shortens
//! up. A strikeout leaves the runner hung out to dry.

use crate::engine::baserunning::{MarkovState, FIRST, SECOND};
use crate::engine::config::TacticsConfig;
use crate::engine::rng::Generator;
use crate::models::player::{HitterAttributes, ATTR_MAX};

pub const CONTACT_BOOST: u16 = 40;
pub const POWER_PENALTY: u16 = 40;

pub fn eligible(state: MarkovState, batter: &HitterAttributes, runner_speed: u16) -> bool {
    state.runners & FIRST != 0
        && state.runners & SECOND == 0
        && state.outs < 2
        && batter.contact >= 380
        && runner_speed >= 300
}

/// One draw when eligible, none otherwise.
pub fn call_hit_and_run(
    state: MarkovState,
    batter: &HitterAttributes,
    runner_speed: u16,
    cfg: &TacticsConfig,
    gen: Generator,
) -> (bool, Generator) {
    if !eligible(state, batter, runner_speed) {
        return (false, gen);
    }
    gen.chance(cfg.hit_and_run_rate)
}

/// Transient copy of the batter for the single plate appearance.
pub fn hit_and_run_batter(batter: &HitterAttributes) -> HitterAttributes {
    HitterAttributes {
        contact: batter.contact.saturating_add(CONTACT_BOOST).min(ATTR_MAX as u16),
        power: batter.power.saturating_sub(POWER_PENALTY),
        ..*batter
    }
}
