use serde::{Deserialize, Serialize};

use super::TeamId;

pub type PlayerId = u32;

/// Upper bound of every skill attribute.
pub const ATTR_MAX: f64 = 550.0;
/// League-average attribute value.
pub const ATTR_AVERAGE: f64 = 400.0;

/// Distance from league average in units of 100 attribute points.
///
/// Values are clamped to the 0..=550 scale first, so the result lies in
/// `[-4.0, 1.5]`.
#[inline]
pub fn attr_delta(value: u16) -> f64 {
    (f64::from(value).min(ATTR_MAX) - ATTR_AVERAGE) / 100.0
}

/// Attribute normalized to `[0, 1]`.
#[inline]
pub fn attr_unit(value: u16) -> f64 {
    f64::from(value).min(ATTR_MAX) / ATTR_MAX
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    /// Bats from whichever side opposes the pitcher.
    #[serde(rename = "S")]
    Switch,
}

impl Hand {
    /// Side a batter actually hits from against a pitcher throwing `pitcher`.
    pub fn batting_side_against(self, pitcher: Hand) -> Hand {
        match self {
            Hand::Switch => match pitcher {
                Hand::Left => Hand::Right,
                _ => Hand::Left,
            },
            other => other,
        }
    }

    /// Same-handed matchup (the pitcher's platoon advantage).
    pub fn same_side(self, other: Hand) -> bool {
        matches!((self, other), (Hand::Left, Hand::Left) | (Hand::Right, Hand::Right))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    C,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    SS,
    LF,
    CF,
    RF,
    DH,
    SP,
    RP,
    CL,
}

impl Position {
    pub fn is_pitcher(self) -> bool {
        matches!(self, Position::SP | Position::RP | Position::CL)
    }

    pub fn is_infield(self) -> bool {
        matches!(
            self,
            Position::FirstBase | Position::SecondBase | Position::ThirdBase | Position::SS
        )
    }

    /// Weight of this position in the team defense rating.
    pub fn defensive_weight(self) -> f64 {
        match self {
            Position::SS | Position::C | Position::CF => 1.3,
            Position::SecondBase | Position::ThirdBase => 1.1,
            Position::FirstBase | Position::LF | Position::RF => 0.8,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RosterStatus {
    #[default]
    Active,
    Injured,
    Minors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitterAttributes {
    pub contact: u16,
    pub power: u16,
    pub eye: u16,
    pub speed: u16,
    pub baserunning_iq: u16,
    pub fielding: u16,
    pub arm_strength: u16,
    pub durability: u16,
    pub platoon_sensitivity: u16,
    pub offensive_iq: u16,
    pub defensive_iq: u16,
    pub mental_toughness: u16,
    pub work_ethic: u16,
}

impl HitterAttributes {
    pub fn league_average() -> Self {
        Self::uniform(ATTR_AVERAGE as u16)
    }

    pub fn uniform(value: u16) -> Self {
        Self {
            contact: value,
            power: value,
            eye: value,
            speed: value,
            baserunning_iq: value,
            fielding: value,
            arm_strength: value,
            durability: value,
            platoon_sensitivity: value,
            offensive_iq: value,
            defensive_iq: value,
            mental_toughness: value,
            work_ethic: value,
        }
    }

    /// Composite offensive rating used for lineup ordering and bench decisions.
    pub fn offense_rating(&self) -> f64 {
        f64::from(self.contact) * 0.35
            + f64::from(self.power) * 0.30
            + f64::from(self.eye) * 0.20
            + f64::from(self.speed) * 0.10
            + f64::from(self.offensive_iq) * 0.05
    }

    pub fn defense_rating(&self) -> f64 {
        f64::from(self.fielding) * 0.6
            + f64::from(self.arm_strength) * 0.2
            + f64::from(self.defensive_iq) * 0.2
    }

    /// How far the hitter tends to pull the ball, 0.3..0.75.
    pub fn pull_tendency(&self) -> f64 {
        (0.5 + 0.12 * attr_delta(self.power) - 0.05 * attr_delta(self.contact)).clamp(0.3, 0.75)
    }

    /// Positive for fly-ball hitters, negative for ground-ball hitters.
    pub fn fly_tendency(&self) -> f64 {
        0.8 * attr_delta(self.power) - 0.2 * attr_delta(self.speed)
    }
}

impl Default for HitterAttributes {
    fn default() -> Self {
        Self::league_average()
    }
}

/// Share of pitches by family. Normalized on use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchMix {
    pub fastball: f64,
    pub breaking: f64,
    pub offspeed: f64,
}

impl PitchMix {
    pub fn normalized(&self) -> PitchMix {
        let total = self.fastball.max(0.0) + self.breaking.max(0.0) + self.offspeed.max(0.0);
        if total <= 0.0 {
            return PitchMix::default();
        }
        PitchMix {
            fastball: self.fastball.max(0.0) / total,
            breaking: self.breaking.max(0.0) / total,
            offspeed: self.offspeed.max(0.0) / total,
        }
    }
}

impl Default for PitchMix {
    fn default() -> Self {
        Self { fastball: 0.55, breaking: 0.28, offspeed: 0.17 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitcherAttributes {
    pub stuff: u16,
    pub movement: u16,
    pub command: u16,
    pub stamina: u16,
    /// Number of usable pitches, 2..=6.
    pub arsenal_size: u8,
    /// Higher values induce more ground balls.
    pub groundball_tendency: u16,
    pub hold_runners: u16,
    pub durability: u16,
    pub recovery_rate: u16,
    pub platoon_tendency: u16,
    #[serde(default)]
    pub pitch_mix: PitchMix,
    pub pitching_iq: u16,
    pub mental_toughness: u16,
    pub work_ethic: u16,
}

impl PitcherAttributes {
    pub fn league_average() -> Self {
        Self::uniform(ATTR_AVERAGE as u16)
    }

    pub fn uniform(value: u16) -> Self {
        Self {
            stuff: value,
            movement: value,
            command: value,
            stamina: value,
            arsenal_size: 4,
            groundball_tendency: value,
            hold_runners: value,
            durability: value,
            recovery_rate: value,
            platoon_tendency: value,
            pitch_mix: PitchMix::default(),
            pitching_iq: value,
            mental_toughness: value,
            work_ethic: value,
        }
    }

    pub fn overall_rating(&self) -> f64 {
        f64::from(self.stuff) * 0.40
            + f64::from(self.movement) * 0.25
            + f64::from(self.command) * 0.25
            + f64::from(self.pitching_iq) * 0.10
    }
}

impl Default for PitcherAttributes {
    fn default() -> Self {
        Self::league_average()
    }
}

/// Exactly one attribute set per player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum PlayerRole {
    Hitter(HitterAttributes),
    Pitcher(PitcherAttributes),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub age: u8,
    pub bats: Hand,
    pub throws: Hand,
    pub position: Position,
    pub team_id: TeamId,
    #[serde(default)]
    pub status: RosterStatus,
    pub attributes: PlayerRole,
}

impl Player {
    pub fn is_active(&self) -> bool {
        self.status == RosterStatus::Active
    }

    pub fn hitter(&self) -> Option<&HitterAttributes> {
        match &self.attributes {
            PlayerRole::Hitter(h) => Some(h),
            PlayerRole::Pitcher(_) => None,
        }
    }

    pub fn pitcher(&self) -> Option<&PitcherAttributes> {
        match &self.attributes {
            PlayerRole::Pitcher(p) => Some(p),
            PlayerRole::Hitter(_) => None,
        }
    }

    /// Hitting attributes, or league average for players without them.
    pub fn hitting_or_default(&self) -> HitterAttributes {
        self.hitter().copied().unwrap_or_default()
    }

    pub fn pitching_or_default(&self) -> PitcherAttributes {
        self.pitcher().copied().unwrap_or_default()
    }

    pub fn is_eligible_hitter(&self) -> bool {
        self.is_active() && self.hitter().is_some() && !self.position.is_pitcher()
    }

    pub fn is_eligible_pitcher(&self) -> bool {
        self.is_active() && self.pitcher().is_some() && self.position.is_pitcher()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_delta_scale() {
        assert_eq!(attr_delta(400), 0.0);
        assert!((attr_delta(500) - 1.0).abs() < 1e-12);
        assert!((attr_delta(900) - 1.5).abs() < 1e-12, "clamped to 550");
        assert!((attr_delta(0) + 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_switch_hitter_takes_opposite_side() {
        assert_eq!(Hand::Switch.batting_side_against(Hand::Right), Hand::Left);
        assert_eq!(Hand::Switch.batting_side_against(Hand::Left), Hand::Right);
        assert_eq!(Hand::Left.batting_side_against(Hand::Left), Hand::Left);
    }

    #[test]
    fn test_role_serde_is_tagged() {
        let role = PlayerRole::Pitcher(PitcherAttributes::league_average());
        let json = serde_json::to_value(role).unwrap();
        assert_eq!(json["role"], "pitcher");
        let back: PlayerRole = serde_json::from_value(json).unwrap();
        assert!(matches!(back, PlayerRole::Pitcher(_)));
    }

    #[test]
    fn test_eligibility_requires_matching_role() {
        let mut p = Player {
            id: 1,
            name: "Test".into(),
            age: 27,
            bats: Hand::Right,
            throws: Hand::Right,
            position: Position::SP,
            team_id: 1,
            status: RosterStatus::Active,
            attributes: PlayerRole::Pitcher(PitcherAttributes::default()),
        };
        assert!(p.is_eligible_pitcher());
        assert!(!p.is_eligible_hitter());
        p.status = RosterStatus::Injured;
        assert!(!p.is_eligible_pitcher());
    }
}
