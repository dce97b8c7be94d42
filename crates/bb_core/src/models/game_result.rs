use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::box_score::BoxScore;
use super::team::TeamId;
use super::TeamSide;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: u64,
    pub date: NaiveDate,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_score: u32,
    pub away_score: u32,
    pub innings: u8,
    pub walk_off: bool,
    /// Side charged with the forfeit, if the game was not played.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forfeit: Option<TeamSide>,
    pub box_score: BoxScore,
}

impl GameResult {
    pub fn winner(&self) -> Option<TeamId> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(self.home_team_id),
            std::cmp::Ordering::Less => Some(self.away_team_id),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn loser(&self) -> Option<TeamId> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(self.away_team_id),
            std::cmp::Ordering::Less => Some(self.home_team_id),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Only reachable when the inning cap stops an extra-inning game.
    pub fn is_tie(&self) -> bool {
        self.home_score == self.away_score
    }

    pub fn team_id(&self, side: TeamSide) -> TeamId {
        match side {
            TeamSide::Away => self.away_team_id,
            TeamSide::Home => self.home_team_id,
        }
    }

    pub fn score(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Away => self.away_score,
            TeamSide::Home => self.home_score,
        }
    }
}
