//! Defensive alignment: the shift and the drawn-in infield.

use crate::engine::baserunning::{MarkovState, FIRST, THIRD};
use crate::engine::config::TacticsConfig;
use crate::engine::modifiers::Alignment;
use crate::models::player::HitterAttributes;

/// `fielding_lead` is the fielding team's score minus the batting team's.
pub fn choose_alignment(
    batter: &HitterAttributes,
    state: MarkovState,
    inning: u8,
    fielding_lead: i32,
    cfg: &TacticsConfig,
) -> Alignment {
    let shift = batter.pull_tendency() >= cfg.shift_pull_threshold && state.runners & FIRST == 0;
    let infield_in = state.runners & THIRD != 0
        && state.outs < 2
        && inning >= cfg.infield_in_min_inning
        && (0..=1).contains(&fielding_lead);
    Alignment { shift, infield_in }
}
