//! Pitcher condition: fatigue (momentum included), times through the order,
//! tempo.

use super::{bounded, ModifierContext};
use crate::models::player::attr_delta;

pub fn fatigue_k(ctx: &ModifierContext) -> f64 {
    bounded(1.0 - 0.8 * ctx.usage.fatigue, 0.5, 1.12)
}

pub fn fatigue_bb(ctx: &ModifierContext) -> f64 {
    bounded(1.0 + 0.9 * ctx.usage.fatigue, 0.88, 1.6)
}

pub fn fatigue_hr(ctx: &ModifierContext) -> f64 {
    bounded(1.0 + 0.6 * ctx.usage.fatigue, 0.92, 1.4)
}

pub fn fatigue_babip(ctx: &ModifierContext) -> f64 {
    bounded(1.0 + 0.25 * ctx.usage.fatigue, 0.96, 1.15)
}

/// Deeper arsenals soften the familiarity penalty: each pitch beyond four
/// removes a tenth of it.
fn familiarity(ctx: &ModifierContext, table: [f64; 4]) -> f64 {
    let pass = ctx.usage.times_through_order.clamp(1, 4) as usize - 1;
    let raw = table[pass];
    let arsenal = f64::from(ctx.pitcher.arsenal_size.clamp(2, 6)) - 4.0;
    let scale = (1.0 - 0.1 * arsenal).clamp(0.6, 1.4);
    1.0 + (raw - 1.0) * scale
}

pub fn times_through_order_k(ctx: &ModifierContext) -> f64 {
    bounded(familiarity(ctx, [1.03, 1.0, 0.95, 0.90]), 0.8, 1.1)
}

pub fn times_through_order_hr(ctx: &ModifierContext) -> f64 {
    bounded(familiarity(ctx, [0.97, 1.0, 1.06, 1.12]), 0.9, 1.25)
}

pub fn times_through_order_babip(ctx: &ModifierContext) -> f64 {
    bounded(familiarity(ctx, [0.99, 1.0, 1.03, 1.05]), 0.95, 1.1)
}

/// Smart pitchers keep hitters off balance, which shows up as weaker contact.
pub fn tempo_babip(ctx: &ModifierContext) -> f64 {
    bounded(1.0 - 0.02 * attr_delta(ctx.pitcher.pitching_iq), 0.95, 1.08)
}
