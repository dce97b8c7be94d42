//! Situational modifier library.
//!
//! Each modifier is a pure function `(&ModifierContext) -> f64` returning a
//! bounded multiplier around 1.0. Modifiers are registered into an ordered
//! [`ModifierPipeline`] per outcome category; the pipeline multiplies the
//! category's modifiers and squashes the product once (see
//! [`probability::combine_modifiers`]) so many small nudges cannot compound
//! into an implausible swing.

pub mod batter;
pub mod environment;
pub mod pitcher;
pub mod situational;

use serde::{Deserialize, Serialize};

use crate::engine::plate_appearance::BattedBall;
use crate::engine::probability;
use crate::models::park::{ParkFactors, UmpireProfile, Weather};
use crate::models::player::{Hand, HitterAttributes, PitcherAttributes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierCategory {
    Strikeout,
    Walk,
    HomeRun,
    Babip,
}

/// What the pitcher has done so far in this appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitcherUsage {
    pub pitches: u32,
    pub batters_faced: u32,
    /// 1 on the first pass through the order.
    pub times_through_order: u32,
    /// Fatigue-equivalent after momentum, `[-momentum_max, fatigue_max]`.
    /// Negative values mean a pitcher in rhythm.
    pub fatigue: f64,
    pub is_starter: bool,
}

impl Default for PitcherUsage {
    fn default() -> Self {
        Self {
            pitches: 0,
            batters_faced: 0,
            times_through_order: 1,
            fatigue: 0.0,
            is_starter: true,
        }
    }
}

/// Game situation from the batting team's point of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Situation {
    pub inning: u8,
    pub outs: u8,
    pub runners: u8,
    /// Batting team score minus fielding team score.
    pub batting_lead: i32,
    pub is_home_batting: bool,
    pub leverage: f64,
}

impl Default for Situation {
    fn default() -> Self {
        Self {
            inning: 1,
            outs: 0,
            runners: 0,
            batting_lead: 0,
            is_home_batting: false,
            leverage: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Alignment {
    pub shift: bool,
    pub infield_in: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ModifierContext<'a> {
    pub batter: &'a HitterAttributes,
    /// Side the batter hits from in this plate appearance.
    pub batter_side: Hand,
    pub pitcher: &'a PitcherAttributes,
    pub pitcher_hand: Hand,
    pub on_deck: Option<&'a HitterAttributes>,
    pub catcher: Option<&'a HitterAttributes>,
    /// Weighted fielding of the defense on the 0..=550 scale.
    pub defense_rating: f64,
    pub park: &'a ParkFactors,
    pub weather: &'a Weather,
    pub umpire: &'a UmpireProfile,
    pub usage: PitcherUsage,
    pub situation: Situation,
    pub alignment: Alignment,
    /// Set only while evaluating stage-3 modifiers.
    pub batted_ball: Option<BattedBall>,
}

impl<'a> ModifierContext<'a> {
    pub fn with_batted_ball(self, batted_ball: BattedBall) -> Self {
        Self { batted_ball: Some(batted_ball), ..self }
    }
}

pub type ModifierFn = fn(&ModifierContext) -> f64;

#[derive(Clone, Copy)]
pub struct Modifier {
    pub name: &'static str,
    pub category: ModifierCategory,
    pub apply: ModifierFn,
}

impl std::fmt::Debug for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modifier")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

const fn modifier(name: &'static str, category: ModifierCategory, apply: ModifierFn) -> Modifier {
    Modifier { name, category, apply }
}

#[derive(Debug, Clone)]
pub struct ModifierPipeline {
    modifiers: Vec<Modifier>,
    squash_max: f64,
}

impl ModifierPipeline {
    pub fn empty(squash_max: f64) -> Self {
        Self { modifiers: Vec::new(), squash_max }
    }

    /// The full standard registry, in evaluation order.
    pub fn standard(squash_max: f64) -> Self {
        use ModifierCategory::*;
        let modifiers = vec![
            // Strikeouts
            modifier("fatigue_k", Strikeout, pitcher::fatigue_k),
            modifier("times_through_order_k", Strikeout, pitcher::times_through_order_k),
            modifier("platoon_k", Strikeout, batter::platoon_k),
            modifier("count_leverage_k", Strikeout, batter::count_leverage_k),
            modifier("framing_k", Strikeout, environment::framing_k),
            modifier("umpire_k", Strikeout, environment::umpire_k),
            modifier("park_k", Strikeout, environment::park_k),
            modifier("elevation_k", Strikeout, environment::elevation_k),
            modifier("clutch_pitcher_k", Strikeout, situational::clutch_pitcher_k),
            modifier("closer_adrenaline_k", Strikeout, situational::closer_adrenaline_k),
            // Walks
            modifier("fatigue_bb", Walk, pitcher::fatigue_bb),
            modifier("platoon_bb", Walk, batter::platoon_bb),
            modifier("count_leverage_bb", Walk, batter::count_leverage_bb),
            modifier("protection_bb", Walk, batter::protection_bb),
            modifier("framing_bb", Walk, environment::framing_bb),
            modifier("umpire_bb", Walk, environment::umpire_bb),
            modifier("base_state_bb", Walk, situational::base_state_bb),
            // Home runs
            modifier("park_hr", HomeRun, environment::park_hr),
            modifier("temperature_hr", HomeRun, environment::temperature_hr),
            modifier("wind_hr", HomeRun, environment::wind_hr),
            modifier("elevation_hr", HomeRun, environment::elevation_hr),
            modifier("times_through_order_hr", HomeRun, pitcher::times_through_order_hr),
            modifier("fatigue_hr", HomeRun, pitcher::fatigue_hr),
            modifier("platoon_hr", HomeRun, batter::platoon_hr),
            // Balls in play
            modifier("defense_babip", Babip, environment::defense_babip),
            modifier("park_babip", Babip, environment::park_babip),
            modifier("shift_babip", Babip, situational::shift_babip),
            modifier("infield_in_babip", Babip, situational::infield_in_babip),
            modifier("tempo_babip", Babip, pitcher::tempo_babip),
            modifier("fatigue_babip", Babip, pitcher::fatigue_babip),
            modifier("times_through_order_babip", Babip, pitcher::times_through_order_babip),
            modifier("clutch_batter_babip", Babip, situational::clutch_batter_babip),
            modifier("home_field_babip", Babip, situational::home_field_babip),
        ];
        Self { modifiers, squash_max }
    }

    pub fn with(mut self, m: Modifier) -> Self {
        self.modifiers.push(m);
        self
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Squashed product of every modifier in `category`.
    pub fn combined(&self, category: ModifierCategory, ctx: &ModifierContext) -> f64 {
        probability::combine_modifiers(
            self.modifiers.iter().filter(|m| m.category == category).map(|m| (m.apply)(ctx)),
            self.squash_max,
        )
    }

    /// Raw value of each modifier in `category`, for diagnostics.
    pub fn breakdown(
        &self,
        category: ModifierCategory,
        ctx: &ModifierContext,
    ) -> Vec<(&'static str, f64)> {
        self.modifiers
            .iter()
            .filter(|m| m.category == category)
            .map(|m| (m.name, (m.apply)(ctx)))
            .collect()
    }
}

/// Clamp a modifier into `[lo, hi]`, mapping non-finite values to 1.0.
#[inline]
pub(crate) fn bounded(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        1.0
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::park::ParkFactors;

    pub struct Fixture {
        pub batter: HitterAttributes,
        pub pitcher: PitcherAttributes,
        pub park: ParkFactors,
        pub weather: Weather,
        pub umpire: UmpireProfile,
    }

    impl Fixture {
        pub fn average() -> Self {
            Self {
                batter: HitterAttributes::league_average(),
                pitcher: PitcherAttributes::league_average(),
                park: ParkFactors::neutral("test"),
                weather: Weather::default(),
                umpire: UmpireProfile { zone_bias: 0.0, consistency: 1.0 },
            }
        }

        pub fn ctx(&self) -> ModifierContext<'_> {
            ModifierContext {
                batter: &self.batter,
                batter_side: Hand::Right,
                pitcher: &self.pitcher,
                pitcher_hand: Hand::Left,
                on_deck: None,
                catcher: None,
                defense_rating: 400.0,
                park: &self.park,
                weather: &self.weather,
                umpire: &self.umpire,
                usage: PitcherUsage::default(),
                situation: Situation::default(),
                alignment: Alignment::default(),
                batted_ball: None,
            }
        }
    }
}
