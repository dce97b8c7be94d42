//! Per-game accumulators.
//!
//! Populated by the game loop while a game is in progress and frozen once the
//! `GameResult` is built; season aggregation only reads them.

use serde::{Deserialize, Serialize};

use super::park::{UmpireProfile, Weather};
use super::player::{Hand, PlayerId};
use super::team::TeamId;
use super::TeamSide;
use crate::engine::game::PlayKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingLine {
    pub pa: u32,
    pub ab: u32,
    pub hits: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub runs: u32,
    pub rbi: u32,
    pub walks: u32,
    pub intentional_walks: u32,
    pub hit_by_pitch: u32,
    pub strikeouts: u32,
    pub stolen_bases: u32,
    pub caught_stealing: u32,
    pub sac_flies: u32,
    pub sac_bunts: u32,
    pub grounded_into_dp: u32,
    pub reached_on_error: u32,
}

impl BattingLine {
    pub fn add(&mut self, other: &BattingLine) {
        self.pa += other.pa;
        self.ab += other.ab;
        self.hits += other.hits;
        self.singles += other.singles;
        self.doubles += other.doubles;
        self.triples += other.triples;
        self.home_runs += other.home_runs;
        self.runs += other.runs;
        self.rbi += other.rbi;
        self.walks += other.walks;
        self.intentional_walks += other.intentional_walks;
        self.hit_by_pitch += other.hit_by_pitch;
        self.strikeouts += other.strikeouts;
        self.stolen_bases += other.stolen_bases;
        self.caught_stealing += other.caught_stealing;
        self.sac_flies += other.sac_flies;
        self.sac_bunts += other.sac_bunts;
        self.grounded_into_dp += other.grounded_into_dp;
        self.reached_on_error += other.reached_on_error;
    }

    pub fn total_bases(&self) -> u32 {
        self.singles + 2 * self.doubles + 3 * self.triples + 4 * self.home_runs
    }

    pub fn batting_average(&self) -> f64 {
        ratio(self.hits, self.ab)
    }

    pub fn on_base_pct(&self) -> f64 {
        ratio(
            self.hits + self.walks + self.hit_by_pitch,
            self.ab + self.walks + self.hit_by_pitch + self.sac_flies,
        )
    }

    pub fn slugging(&self) -> f64 {
        ratio(self.total_bases(), self.ab)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchingLine {
    pub games: u32,
    pub starts: u32,
    pub outs: u32,
    pub batters_faced: u32,
    pub pitches: u32,
    pub hits: u32,
    pub runs: u32,
    pub earned_runs: u32,
    pub walks: u32,
    pub intentional_walks: u32,
    pub strikeouts: u32,
    pub home_runs: u32,
    pub hit_by_pitch: u32,
    pub wild_pitches: u32,
    pub wins: u32,
    pub losses: u32,
    pub saves: u32,
    pub holds: u32,
    pub blown_saves: u32,
}

impl PitchingLine {
    pub fn add(&mut self, other: &PitchingLine) {
        self.games += other.games;
        self.starts += other.starts;
        self.outs += other.outs;
        self.batters_faced += other.batters_faced;
        self.pitches += other.pitches;
        self.hits += other.hits;
        self.runs += other.runs;
        self.earned_runs += other.earned_runs;
        self.walks += other.walks;
        self.intentional_walks += other.intentional_walks;
        self.strikeouts += other.strikeouts;
        self.home_runs += other.home_runs;
        self.hit_by_pitch += other.hit_by_pitch;
        self.wild_pitches += other.wild_pitches;
        self.wins += other.wins;
        self.losses += other.losses;
        self.saves += other.saves;
        self.holds += other.holds;
        self.blown_saves += other.blown_saves;
    }

    pub fn innings(&self) -> f64 {
        f64::from(self.outs) / 3.0
    }

    /// Baseball notation: 6.2 means six and two-thirds.
    pub fn innings_display(&self) -> String {
        format!("{}.{}", self.outs / 3, self.outs % 3)
    }

    pub fn era(&self) -> f64 {
        if self.outs == 0 {
            return 0.0;
        }
        f64::from(self.earned_runs) * 27.0 / f64::from(self.outs)
    }

    pub fn whip(&self) -> f64 {
        if self.outs == 0 {
            return 0.0;
        }
        f64::from(self.walks + self.hits) * 3.0 / f64::from(self.outs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameStats {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    /// Lineup slot (0..9) the player first appeared in.
    pub lineup_slot: u8,
    pub total: BattingLine,
    pub vs_left: BattingLine,
    pub vs_right: BattingLine,
}

impl PlayerGameStats {
    pub fn new(player_id: PlayerId, team_id: TeamId, lineup_slot: u8) -> Self {
        Self {
            player_id,
            team_id,
            lineup_slot,
            total: BattingLine::default(),
            vs_left: BattingLine::default(),
            vs_right: BattingLine::default(),
        }
    }

    /// Apply `update` to the total and to the split for the pitcher's hand.
    pub fn record(&mut self, pitcher_hand: Hand, update: impl Fn(&mut BattingLine)) {
        update(&mut self.total);
        match pitcher_hand {
            Hand::Left => update(&mut self.vs_left),
            _ => update(&mut self.vs_right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Win,
    Loss,
    Save,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitcherGameStats {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    /// Appearance order for the team, starting at 0 for the starter.
    pub order: u8,
    pub line: PitchingLine,
    pub decision: Option<Decision>,
    pub hold: bool,
    pub blown_save: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineScore {
    pub away: Vec<u32>,
    pub home: Vec<u32>,
}

impl LineScore {
    pub fn push(&mut self, side: TeamSide, runs: u32) {
        match side {
            TeamSide::Away => self.away.push(runs),
            TeamSide::Home => self.home.push(runs),
        }
    }

    pub fn total(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Away => self.away.iter().sum(),
            TeamSide::Home => self.home.iter().sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayEvent {
    pub inning: u8,
    pub batting: TeamSide,
    pub batter: Option<PlayerId>,
    pub pitcher: PlayerId,
    pub kind: PlayKind,
    pub outs_after: u8,
    pub runs: u32,
    pub away_score: u32,
    pub home_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BoxScore {
    pub batting: Vec<PlayerGameStats>,
    pub pitching: Vec<PitcherGameStats>,
    pub line_score: LineScore,
    /// Indexed by `TeamSide::index()`.
    pub hits: [u32; 2],
    pub errors: [u32; 2],
    pub left_on_base: [u32; 2],
    pub weather: Weather,
    pub umpire: UmpireProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_by_play: Option<Vec<PlayEvent>>,
}

impl BoxScore {
    pub fn batting_for(&self, team_id: TeamId) -> impl Iterator<Item = &PlayerGameStats> {
        self.batting.iter().filter(move |s| s.team_id == team_id)
    }

    pub fn pitching_for(&self, team_id: TeamId) -> impl Iterator<Item = &PitcherGameStats> {
        self.pitching.iter().filter(move |s| s.team_id == team_id)
    }

    pub fn starter(&self, team_id: TeamId) -> Option<&PitcherGameStats> {
        self.pitching_for(team_id).find(|p| p.order == 0)
    }
}

fn ratio(num: u32, den: u32) -> f64 {
    if den == 0 {
        0.0
    } else {
        f64::from(num) / f64::from(den)
    }
}
