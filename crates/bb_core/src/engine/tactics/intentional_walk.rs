//! Intentional walks.
//!
//! The heuristic ignores the score on purpose: first base open, a runner in
//! scoring position, late in the game, and a batter clearly more dangerous
//! than the hitter on deck.

use crate::engine::baserunning::{MarkovState, FIRST, SECOND, THIRD};
use crate::engine::config::TacticsConfig;

pub fn should_walk(
    state: MarkovState,
    inning: u8,
    batter_threat: f64,
    on_deck_threat: f64,
    cfg: &TacticsConfig,
) -> bool {
    let first_open = state.runners & FIRST == 0;
    let scoring_position = state.runners & (SECOND | THIRD) != 0;
    first_open
        && scoring_position
        && state.outs < 3
        && inning >= cfg.ibb_min_inning
        && batter_threat - on_deck_threat >= cfg.ibb_threat_gap
}
