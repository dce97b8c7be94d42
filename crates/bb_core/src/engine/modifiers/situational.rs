//! Game-state modifiers and the leverage index they depend on.

use super::{bounded, ModifierContext};
use crate::engine::plate_appearance::BattedBall;
use crate::models::player::attr_delta;

/// Approximate leverage of a plate appearance, `[0.1, 5.0]`.
///
/// `runners` is the base bitmask (bit 0 = first). `batting_lead` is from the
/// batting team's point of view.
pub fn leverage_index(inning: u8, outs: u8, runners: u8, batting_lead: i32) -> f64 {
    let on_base = f64::from((runners & 0b111).count_ones());
    let scoring_position = if runners & 0b110 != 0 { 0.3 } else { 0.0 };
    let base_out = (1.0 + 0.35 * on_base + scoring_position) * (1.0 - 0.1 * f64::from(outs.min(2)));
    let closeness = (-f64::from(batting_lead.unsigned_abs().min(20)) / 2.0).exp();
    let lateness = 1.0 + 0.2 * f64::from(inning.min(9).saturating_sub(5));
    (base_out * closeness * lateness).clamp(0.1, 5.0)
}

/// `(leverage - 1) / 2` clamped to `[0, 1]`.
fn pressure(ctx: &ModifierContext) -> f64 {
    let lev = ctx.situation.leverage;
    if lev.is_finite() {
        ((lev - 1.0) / 2.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn clutch_pitcher_k(ctx: &ModifierContext) -> f64 {
    bounded(1.0 + 0.05 * attr_delta(ctx.pitcher.mental_toughness) * pressure(ctx), 0.9, 1.08)
}

pub fn clutch_batter_babip(ctx: &ModifierContext) -> f64 {
    bounded(1.0 + 0.03 * attr_delta(ctx.batter.mental_toughness) * pressure(ctx), 0.94, 1.05)
}

/// Reliever protecting a one-to-three run lead in the ninth or later.
pub fn closer_adrenaline_k(ctx: &ModifierContext) -> f64 {
    let s = &ctx.situation;
    if !ctx.usage.is_starter && s.inning >= 9 && (-3..=-1).contains(&s.batting_lead) {
        1.03
    } else {
        1.0
    }
}

/// Bases loaded forces strikes; an open base with runners in scoring
/// position invites pitching around the hitter.
pub fn base_state_bb(ctx: &ModifierContext) -> f64 {
    let runners = ctx.situation.runners & 0b111;
    if runners == 0b111 {
        0.85
    } else if runners & 0b001 == 0 && runners & 0b110 != 0 && ctx.situation.outs < 2 {
        1.06
    } else {
        1.0
    }
}

pub fn shift_babip(ctx: &ModifierContext) -> f64 {
    if !ctx.alignment.shift {
        return 1.0;
    }
    match ctx.batted_ball {
        Some(BattedBall::Ground) => {
            let pull = ctx.batter.pull_tendency();
            bounded(1.0 - 0.6 * (pull - 0.45), 0.8, 1.0)
        }
        Some(BattedBall::Line) => 1.03,
        _ => 1.0,
    }
}

pub fn infield_in_babip(ctx: &ModifierContext) -> f64 {
    if !ctx.alignment.infield_in {
        return 1.0;
    }
    match ctx.batted_ball {
        Some(BattedBall::Ground) => 1.18,
        Some(BattedBall::Line) => 1.05,
        _ => 1.0,
    }
}

pub fn home_field_babip(ctx: &ModifierContext) -> f64 {
    if ctx.situation.is_home_batting {
        1.01
    } else {
        1.0
    }
}
