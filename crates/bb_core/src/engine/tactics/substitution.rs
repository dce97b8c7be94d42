//! Pinch hitters, pinch runners and defensive replacements.
//!
//! Every rule is gated on late-and-close: the inning threshold for the move
//! and a run differential within `close_game_runs`. A replaced player may not
//! re-enter the game.

use serde::{Deserialize, Serialize};

use crate::engine::config::TacticsConfig;
use crate::models::player::{attr_unit, Hand, HitterAttributes, PlayerId};

/// Outcome of a substitution request; `reason` is display-ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionResult {
    pub success: bool,
    pub reason: String,
}

impl SubstitutionResult {
    fn ok(reason: impl Into<String>) -> Self {
        Self { success: true, reason: reason.into() }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self { success: false, reason: reason.into() }
    }
}

/// Bench player available for a move.
#[derive(Debug, Clone, Copy)]
pub struct BenchOption<'a> {
    pub id: PlayerId,
    pub attrs: &'a HitterAttributes,
    pub bats: Hand,
}

pub fn late_and_close(inning: u8, min_inning: u8, run_diff: i32, cfg: &TacticsConfig) -> bool {
    inning >= min_inning && run_diff.abs() <= cfg.close_game_runs
}

/// Offense rating adjusted for the platoon matchup against `pitcher_hand`.
pub fn matchup_rating(attrs: &HitterAttributes, bats: Hand, pitcher_hand: Hand) -> f64 {
    let side = bats.batting_side_against(pitcher_hand);
    let platoon = 30.0 * attr_unit(attrs.platoon_sensitivity);
    if side.same_side(pitcher_hand) {
        attrs.offense_rating() - platoon
    } else {
        attrs.offense_rating() + platoon * 0.5
    }
}

fn best_by<'a>(
    bench: &[BenchOption<'a>],
    score: impl Fn(&BenchOption<'a>) -> f64,
) -> Option<(PlayerId, f64)> {
    bench
        .iter()
        .map(|b| (b.id, score(b)))
        .fold(None, |best: Option<(PlayerId, f64)>, (id, s)| match best {
            Some((_, bs)) if bs >= s => best,
            _ => Some((id, s)),
        })
}

pub fn pinch_hit_choice(
    incumbent: &HitterAttributes,
    incumbent_bats: Hand,
    bench: &[BenchOption<'_>],
    pitcher_hand: Hand,
    inning: u8,
    batting_lead: i32,
    cfg: &TacticsConfig,
) -> Option<PlayerId> {
    if !late_and_close(inning, cfg.pinch_hit_min_inning, batting_lead, cfg) {
        return None;
    }
    let current = matchup_rating(incumbent, incumbent_bats, pitcher_hand);
    best_by(bench, |b| matchup_rating(b.attrs, b.bats, pitcher_hand))
        .filter(|(_, rating)| *rating >= current + cfg.pinch_hit_margin)
        .map(|(id, _)| id)
}

pub fn pinch_run_choice(
    runner_speed: u16,
    bench: &[BenchOption<'_>],
    inning: u8,
    batting_lead: i32,
    cfg: &TacticsConfig,
) -> Option<PlayerId> {
    if !late_and_close(inning, cfg.pinch_run_min_inning, batting_lead, cfg) {
        return None;
    }
    let threshold = f64::from(runner_speed) + f64::from(cfg.pinch_run_speed_margin);
    best_by(bench, |b| f64::from(b.attrs.speed))
        .filter(|(_, speed)| *speed >= threshold)
        .map(|(id, _)| id)
}

/// Glove-first replacement while protecting a lead.
pub fn defensive_sub_choice(
    incumbent: &HitterAttributes,
    bench: &[BenchOption<'_>],
    inning: u8,
    fielding_lead: i32,
    cfg: &TacticsConfig,
) -> Option<PlayerId> {
    let late = late_and_close(inning, cfg.defensive_sub_min_inning, fielding_lead, cfg);
    if fielding_lead < 1 || !late {
        return None;
    }
    let current = incumbent.defense_rating();
    best_by(bench, |b| b.attrs.defense_rating())
        .filter(|(_, rating)| *rating >= current + cfg.defensive_sub_margin)
        .map(|(id, _)| id)
}

pub fn validate_substitution(
    outgoing: PlayerId,
    incoming: PlayerId,
    bench: &[PlayerId],
    removed: &[PlayerId],
) -> SubstitutionResult {
    if outgoing == incoming {
        return SubstitutionResult::rejected(format!(
            "Player {} is both incoming and outgoing",
            incoming
        ));
    }
    if removed.contains(&incoming) {
        return SubstitutionResult::rejected(format!(
            "Player {} already left the game and cannot re-enter",
            incoming
        ));
    }
    if !bench.contains(&incoming) {
        return SubstitutionResult::rejected(format!("Player {} is not on the bench", incoming));
    }
    SubstitutionResult::ok(format!("Player {} replaces player {}", incoming, outgoing))
}
