//! Batter-side modifiers: platoon, count leverage, lineup protection, and the
//! transient clutch adjustment.

use super::{bounded, ModifierContext};
use crate::models::player::{attr_delta, attr_unit, HitterAttributes, ATTR_MAX};

/// Platoon strength in `[0, 1]`: average of the batter's sensitivity and the
/// pitcher's tendency.
fn platoon_strength(ctx: &ModifierContext) -> f64 {
    0.5 * (attr_unit(ctx.batter.platoon_sensitivity) + attr_unit(ctx.pitcher.platoon_tendency))
}

fn pitcher_has_platoon_edge(ctx: &ModifierContext) -> bool {
    ctx.batter_side.same_side(ctx.pitcher_hand)
}

pub fn platoon_k(ctx: &ModifierContext) -> f64 {
    let s = platoon_strength(ctx);
    if pitcher_has_platoon_edge(ctx) {
        bounded(1.0 + 0.10 * s, 1.0, 1.1)
    } else {
        bounded(1.0 - 0.04 * s, 0.96, 1.0)
    }
}

pub fn platoon_bb(ctx: &ModifierContext) -> f64 {
    let s = platoon_strength(ctx);
    if pitcher_has_platoon_edge(ctx) {
        bounded(1.0 - 0.05 * s, 0.95, 1.0)
    } else {
        bounded(1.0 + 0.05 * s, 1.0, 1.05)
    }
}

pub fn platoon_hr(ctx: &ModifierContext) -> f64 {
    let s = platoon_strength(ctx);
    if pitcher_has_platoon_edge(ctx) {
        bounded(1.0 - 0.10 * s, 0.9, 1.0)
    } else {
        bounded(1.0 + 0.05 * s, 1.0, 1.05)
    }
}

/// Positive when the pitcher tends to work ahead in the count.
fn count_edge(ctx: &ModifierContext) -> f64 {
    0.5 * (attr_delta(ctx.pitcher.command) - attr_delta(ctx.batter.eye))
}

pub fn count_leverage_k(ctx: &ModifierContext) -> f64 {
    bounded(1.0 + 0.06 * count_edge(ctx), 0.85, 1.15)
}

pub fn count_leverage_bb(ctx: &ModifierContext) -> f64 {
    bounded(1.0 - 0.10 * count_edge(ctx), 0.8, 1.2)
}

/// A dangerous on-deck hitter means fewer pitches worth walking the batter on.
pub fn protection_bb(ctx: &ModifierContext) -> f64 {
    match ctx.on_deck {
        Some(next) => {
            let d = (next.offense_rating() - 400.0) / 100.0;
            bounded(1.0 - 0.05 * d, 0.9, 1.1)
        }
        None => 1.0,
    }
}

/// Transient contact adjustment under pressure.
///
/// Returns a copy of `batter` whose contact moves with mental toughness once
/// leverage exceeds 1.0; the stored attributes are never touched.
pub fn clutch_adjusted(batter: &HitterAttributes, leverage: f64) -> HitterAttributes {
    let pressure =
        if leverage.is_finite() { ((leverage - 1.0) / 2.0).clamp(0.0, 1.0) } else { 0.0 };
    if pressure == 0.0 {
        return *batter;
    }
    let shift = (f64::from(batter.mental_toughness.min(ATTR_MAX as u16)) - 400.0) * 0.08 * pressure;
    let contact = (f64::from(batter.contact) + shift).round().clamp(0.0, ATTR_MAX);
    HitterAttributes { contact: contact as u16, ..*batter }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use crate::models::player::Hand;

    #[test]
    fn test_same_side_favors_pitcher() {
        let fx = Fixture::average();
        let mut ctx = fx.ctx();
        ctx.batter_side = Hand::Left;
        ctx.pitcher_hand = Hand::Left;
        assert!(platoon_k(&ctx) > 1.0);
        assert!(platoon_hr(&ctx) < 1.0);

        ctx.pitcher_hand = Hand::Right;
        assert!(platoon_k(&ctx) < 1.0);
        assert!(platoon_bb(&ctx) > 1.0);
    }

    #[test]
    fn test_patient_hitter_beats_wild_pitcher() {
        let mut fx = Fixture::average();
        fx.batter.eye = 530;
        fx.pitcher.command = 280;
        let ctx = fx.ctx();
        assert!(count_leverage_bb(&ctx) > 1.1);
        assert!(count_leverage_k(&ctx) < 1.0);
    }

    #[test]
    fn test_protection_needs_an_on_deck_hitter() {
        let fx = Fixture::average();
        let ctx = fx.ctx();
        assert_eq!(protection_bb(&ctx), 1.0);

        let slugger = HitterAttributes::uniform(520);
        let ctx = ModifierContext { on_deck: Some(&slugger), ..fx.ctx() };
        assert!(protection_bb(&ctx) < 1.0);
    }

    #[test]
    fn test_clutch_copy_leaves_original_untouched() {
        let mut original = HitterAttributes::league_average();
        original.mental_toughness = 550;
        let adjusted = clutch_adjusted(&original, 3.0);
        assert_eq!(original.contact, 400);
        assert_eq!(adjusted.contact, 412);
        assert_eq!(clutch_adjusted(&original, 0.8), original);

        original.mental_toughness = 250;
        assert!(clutch_adjusted(&original, 3.0).contact < 400);
    }
}
