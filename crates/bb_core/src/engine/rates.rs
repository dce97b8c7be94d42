//! Attribute-to-rate mapping.
//!
//! Converts 0..=550 attributes into per-outcome rates expressed relative to
//! league averages. An attribute of 400 reproduces the league rate exactly;
//! every 100 points moves the rate by a fixed log-scale coefficient.

use serde::{Deserialize, Serialize};

use crate::models::player::{attr_delta, HitterAttributes, PitcherAttributes};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueRates {
    // === Stage 1 (per plate appearance) ===
    pub k: f64,
    pub bb: f64,
    pub hbp: f64,
    pub hr: f64,

    // === Stage 2 (share of balls in play) ===
    pub groundball: f64,
    pub flyball: f64,
    pub line_drive: f64,
    pub popup: f64,

    // === Stage 3 (hit rate by batted-ball type) ===
    pub babip_ground: f64,
    pub babip_fly: f64,
    pub babip_line: f64,
    pub babip_popup: f64,

    /// Fielding error chance on a would-be out, by type
    pub error_ground: f64,
    pub error_fly: f64,
    pub error_line: f64,
    pub error_popup: f64,

    /// (double, triple) share of hits by type; singles are the remainder
    pub xbh_ground: (f64, f64),
    pub xbh_fly: (f64, f64),
    pub xbh_line: (f64, f64),

    /// Grounded-into-double-play chance with a force at second and < 2 outs
    pub double_play: f64,
}

impl Default for LeagueRates {
    fn default() -> Self {
        Self {
            k: 0.225,
            bb: 0.085,
            hbp: 0.011,
            hr: 0.031,

            groundball: 0.43,
            flyball: 0.26,
            line_drive: 0.21,
            popup: 0.10,

            babip_ground: 0.240,
            babip_fly: 0.140,
            babip_line: 0.690,
            babip_popup: 0.020,

            error_ground: 0.022,
            error_fly: 0.007,
            error_line: 0.004,
            error_popup: 0.003,

            xbh_ground: (0.075, 0.004),
            xbh_fly: (0.42, 0.10),
            xbh_line: (0.25, 0.025),

            double_play: 0.42,
        }
    }
}

/// Per-plate-appearance rates for the stage-1 outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRates {
    pub k: f64,
    pub bb: f64,
    pub hbp: f64,
    pub hr: f64,
}

impl OutcomeRates {
    pub fn league(league: &LeagueRates) -> Self {
        Self { k: league.k, bb: league.bb, hbp: league.hbp, hr: league.hr }
    }
}

/// Batter's standalone rates (as if facing a league-average pitcher).
pub fn batter_rates(h: &HitterAttributes, league: &LeagueRates) -> OutcomeRates {
    let contact = attr_delta(h.contact);
    let power = attr_delta(h.power);
    let eye = attr_delta(h.eye);
    let iq = attr_delta(h.offensive_iq);

    OutcomeRates {
        k: league.k * (-0.32 * contact + 0.10 * power - 0.08 * eye).exp(),
        bb: league.bb * (0.38 * eye + 0.06 * power + 0.04 * iq).exp(),
        hbp: league.hbp * (0.05 * power).exp(),
        hr: league.hr * (0.60 * power + 0.05 * contact).exp(),
    }
}

/// Pitcher's standalone rates (as if facing a league-average batter).
pub fn pitcher_rates(p: &PitcherAttributes, league: &LeagueRates) -> OutcomeRates {
    let stuff = attr_delta(p.stuff);
    let movement = attr_delta(p.movement);
    let command = attr_delta(p.command);
    let groundball = attr_delta(p.groundball_tendency);
    let arsenal = (f64::from(p.arsenal_size.clamp(2, 6)) - 4.0) * 0.5;

    OutcomeRates {
        k: league.k * (0.40 * stuff + 0.08 * movement + 0.04 * command + 0.03 * arsenal).exp(),
        bb: league.bb * (-0.42 * command + 0.04 * stuff).exp(),
        hbp: league.hbp * (-0.30 * command).exp(),
        hr: league.hr * (-0.28 * movement - 0.10 * stuff - 0.12 * groundball).exp(),
    }
}

/// Batted-ball shares in `[ground, fly, line, popup]` order, normalized.
pub fn batted_ball_mix(
    h: &HitterAttributes,
    p: &PitcherAttributes,
    league: &LeagueRates,
    park_groundball_factor: f64,
) -> [f64; 4] {
    let pitcher_gb = attr_delta(p.groundball_tendency);
    let batter_fly = h.fly_tendency();
    let contact = attr_delta(h.contact);

    let mut ground = league.groundball * (0.25 * pitcher_gb - 0.20 * batter_fly).exp();
    let fly = league.flyball * (-0.25 * pitcher_gb + 0.22 * batter_fly).exp();
    let line = league.line_drive * (0.10 * contact).exp();
    let popup = league.popup * (-0.15 * pitcher_gb + 0.10 * batter_fly - 0.08 * contact).exp();

    // Extreme ground-ball pitcher vs extreme fly-ball hitter: the sinker wins
    // more often than the two main effects alone predict.
    if pitcher_gb >= 0.8 && batter_fly >= 0.8 {
        ground *= 1.0 + 0.12 * (pitcher_gb - 0.6) * (batter_fly - 0.6) / 0.36;
    }

    let factor = if park_groundball_factor.is_finite() && park_groundball_factor > 0.0 {
        park_groundball_factor
    } else {
        1.0
    };
    crate::engine::probability::normalize([ground * factor, fly, line, popup])
}

/// Composite pitcher quality used to rank bullpens.
pub fn pitcher_rating(p: &PitcherAttributes) -> f64 {
    p.overall_rating()
}

/// Composite hitter quality used for lineup ordering.
pub fn hitter_rating(h: &HitterAttributes) -> f64 {
    h.offense_rating()
}
