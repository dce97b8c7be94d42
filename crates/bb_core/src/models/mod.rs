//! Data model consumed and produced by the engine.

pub mod box_score;
pub mod game_result;
pub mod league_builder;
pub mod park;
pub mod player;
pub mod team;

pub use box_score::{
    BattingLine, BoxScore, Decision, LineScore, PitcherGameStats, PitchingLine, PlayEvent,
    PlayerGameStats,
};
pub use game_result::GameResult;
pub use park::{ParkFactors, ParkId, UmpireProfile, Weather, WindDirection};
pub use player::{
    attr_delta, attr_unit, Hand, HitterAttributes, PitchMix, PitcherAttributes, Player, PlayerId,
    PlayerRole, Position, RosterStatus, ATTR_AVERAGE, ATTR_MAX,
};
pub use team::{League, MoveResult, Team, TeamId};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Away,
    Home,
}

impl TeamSide {
    pub fn index(self) -> usize {
        match self {
            TeamSide::Away => 0,
            TeamSide::Home => 1,
        }
    }

    pub fn opponent(self) -> TeamSide {
        match self {
            TeamSide::Away => TeamSide::Home,
            TeamSide::Home => TeamSide::Away,
        }
    }
}
