//! Odds-ratio outcome model.
//!
//! All functions are pure - they take rates as input and return probabilities,
//! so they can be tested without a running game.

/// Rates are clamped into this band before entering Log5.
pub const RATE_FLOOR: f64 = 0.001;
pub const RATE_CEIL: f64 = 0.999;

#[inline]
pub fn clamp_rate(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(RATE_FLOOR, RATE_CEIL)
    } else {
        RATE_FLOOR
    }
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
#[inline]
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Canonical odds-ratio Log5.
///
/// `(A·B/L) / ((A·B/L) + (1-A)(1-B)/(1-L))`
pub fn log5(batter: f64, pitcher: f64, league: f64) -> f64 {
    let a = clamp_rate(batter);
    let b = clamp_rate(pitcher);
    let l = clamp_rate(league);
    let num = a * b / l;
    let den = num + (1.0 - a) * (1.0 - b) / (1.0 - l);
    clamp_probability(num / den)
}

/// Pull a rate toward league average, keeping `weight` of its deviation.
#[inline]
pub fn blend_toward_league(rate: f64, league: f64, weight: f64) -> f64 {
    let w = weight.clamp(0.0, 1.0);
    league + w * (rate - league)
}

/// Log5 after splitting control of the outcome between the two sides.
pub fn matchup_rate(batter: f64, pitcher: f64, league: f64, pitcher_control: f64) -> f64 {
    let pc = pitcher_control.clamp(0.0, 1.0);
    let b = blend_toward_league(batter, league, 1.0 - pc);
    let p = blend_toward_league(pitcher, league, pc);
    log5(b, p, league)
}

/// Scale a set of non-negative weights so they sum to one.
///
/// Scaling is proportional, so larger entries absorb more of any excess.
/// An all-zero set becomes uniform.
pub fn normalize<const N: usize>(probs: [f64; N]) -> [f64; N] {
    let mut out = probs.map(|p| if p.is_finite() { p.max(0.0) } else { 0.0 });
    let total: f64 = out.iter().sum();
    if total <= 0.0 {
        return [1.0 / N as f64; N];
    }
    for p in out.iter_mut() {
        *p /= total;
    }
    out
}

/// Turn a set of competing rates plus an implicit remainder into a full
/// distribution whose last entry is the remainder.
///
/// When the named rates would squeeze the remainder below `min_remainder`
/// they are scaled down proportionally.
pub fn with_remainder<const N: usize>(rates: [f64; N], min_remainder: f64) -> ([f64; N], f64) {
    let mut out = rates.map(clamp_probability);
    let ceiling = (1.0 - min_remainder).clamp(0.0, 1.0);
    let total: f64 = out.iter().sum();
    if total > ceiling && total > 0.0 {
        let scale = ceiling / total;
        for p in out.iter_mut() {
            *p *= scale;
        }
    }
    let used: f64 = out.iter().sum();
    (out, clamp_probability(1.0 - used))
}

/// Bounded squashing of a combined multiplier.
///
/// Maps any positive multiplier `m` onto `1 + max·tanh((m - 1)/max)`, so the
/// result stays within `(1 - max, 1 + max)` and is near-identity for small
/// adjustments.
pub fn squash(multiplier: f64, max_magnitude: f64) -> f64 {
    if !multiplier.is_finite() || max_magnitude <= 0.0 {
        return 1.0;
    }
    let dev = multiplier - 1.0;
    1.0 + max_magnitude * (dev / max_magnitude).tanh()
}

/// Multiply independent modifiers and squash the product once.
pub fn combine_modifiers<I: IntoIterator<Item = f64>>(modifiers: I, max_magnitude: f64) -> f64 {
    let product = modifiers
        .into_iter()
        .filter(|m| m.is_finite() && *m > 0.0)
        .product::<f64>();
    squash(product, max_magnitude)
}
