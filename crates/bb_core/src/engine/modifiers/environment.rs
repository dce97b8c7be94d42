//! Park, weather, umpire, catcher and defense.

use super::{bounded, ModifierContext};
use crate::models::park::WindDirection;
use crate::models::player::attr_delta;

pub fn park_k(ctx: &ModifierContext) -> f64 {
    bounded(ctx.park.k_factor, 0.5, 1.6)
}

pub fn park_hr(ctx: &ModifierContext) -> f64 {
    bounded(ctx.park.hr_factor, 0.5, 1.6)
}

pub fn park_babip(ctx: &ModifierContext) -> f64 {
    bounded(ctx.park.babip_factor, 0.5, 1.6)
}

/// Thousands of feet above the first thousand.
fn altitude(ctx: &ModifierContext) -> f64 {
    if !ctx.park.elevation_ft.is_finite() {
        return 0.0;
    }
    ((ctx.park.elevation_ft - 1000.0) / 1000.0).max(0.0)
}

/// Breaking balls flatten in thin air.
pub fn elevation_k(ctx: &ModifierContext) -> f64 {
    let breaking = ctx.pitcher.pitch_mix.normalized().breaking / 0.28;
    bounded(1.0 - 0.02 * altitude(ctx) * breaking, 0.85, 1.0)
}

pub fn elevation_hr(ctx: &ModifierContext) -> f64 {
    bounded(1.0 + 0.035 * altitude(ctx), 1.0, 1.25)
}

pub fn temperature_hr(ctx: &ModifierContext) -> f64 {
    if ctx.weather.roof_closed {
        return 1.0;
    }
    bounded(1.0 + 0.004 * (ctx.weather.temperature_f - 72.0), 0.85, 1.15)
}

pub fn wind_hr(ctx: &ModifierContext) -> f64 {
    if ctx.weather.roof_closed {
        return 1.0;
    }
    let mph = ctx.weather.wind_mph.max(0.0);
    let raw = match ctx.weather.wind_direction {
        WindDirection::Out => 1.0 + 0.012 * mph,
        WindDirection::In => 1.0 - 0.010 * mph,
        WindDirection::Calm | WindDirection::Cross => 1.0,
    };
    bounded(raw, 0.75, 1.3)
}

pub fn umpire_k(ctx: &ModifierContext) -> f64 {
    bounded(1.0 + 0.06 * ctx.umpire.zone_bias, 0.9, 1.1)
}

/// Tight zones and missed calls both put more hitters on base.
pub fn umpire_bb(ctx: &ModifierContext) -> f64 {
    let misses = (1.0 - ctx.umpire.consistency).clamp(0.0, 1.0);
    bounded(1.0 - 0.07 * ctx.umpire.zone_bias + 0.10 * misses, 0.88, 1.15)
}

pub fn framing_k(ctx: &ModifierContext) -> f64 {
    match ctx.catcher {
        Some(c) => bounded(1.0 + 0.03 * attr_delta(c.defensive_iq), 0.95, 1.05),
        None => 1.0,
    }
}

pub fn framing_bb(ctx: &ModifierContext) -> f64 {
    match ctx.catcher {
        Some(c) => bounded(1.0 - 0.03 * attr_delta(c.defensive_iq), 0.95, 1.05),
        None => 1.0,
    }
}

pub fn defense_babip(ctx: &ModifierContext) -> f64 {
    let d = (ctx.defense_rating - 400.0) / 100.0;
    bounded((-0.12 * d).exp(), 0.85, 1.15)
}
