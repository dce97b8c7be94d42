use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::park::{ParkFactors, ParkId};
use super::player::{Player, PlayerId, RosterStatus};
use crate::error::{EngineError, Result};

pub type TeamId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub park_id: ParkId,
    /// Saved batting order. Ignored unless it names nine distinct eligible hitters.
    #[serde(default)]
    pub batting_order: Option<Vec<PlayerId>>,
}

/// Structured outcome of a roster move; `reason` is display-ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub success: bool,
    pub reason: String,
}

impl MoveResult {
    pub fn ok(reason: impl Into<String>) -> Self {
        Self { success: true, reason: reason.into() }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self { success: false, reason: reason.into() }
    }
}

/// Season-scoped owner of every team, player and park.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub teams: Vec<Team>,
    pub players: BTreeMap<PlayerId, Player>,
    pub parks: BTreeMap<ParkId, ParkFactors>,
}

impl League {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        self.teams.iter().find(|t| t.id == id).ok_or(EngineError::UnknownTeam(id))
    }

    /// Park for a team, or a neutral park when the metadata is missing.
    pub fn park_for(&self, team_id: TeamId) -> ParkFactors {
        self.team(team_id)
            .ok()
            .and_then(|t| self.parks.get(&t.park_id))
            .map(ParkFactors::sanitized)
            .unwrap_or_else(|| ParkFactors::neutral(format!("team-{}", team_id)))
    }

    /// Players on a team in id order.
    pub fn roster(&self, team_id: TeamId) -> impl Iterator<Item = &Player> {
        self.players.values().filter(move |p| p.team_id == team_id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn change_status(&mut self, id: PlayerId, target: RosterStatus) -> MoveResult {
        let Some(player) = self.players.get_mut(&id) else {
            return MoveResult::rejected(format!("No player with id {}", id));
        };
        if player.status == target {
            return MoveResult::rejected(format!("{} is already {:?}", player.name, target));
        }
        if player.status == RosterStatus::Injured && target == RosterStatus::Minors {
            return MoveResult::rejected(format!(
                "{} must be activated before being optioned",
                player.name
            ));
        }
        let from = player.status;
        player.status = target;
        MoveResult::ok(format!("{} moved from {:?} to {:?}", player.name, from, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::player::{Hand, HitterAttributes, PlayerRole, Position};

    fn league_with_one_player() -> League {
        let mut league = League::default();
        let team = Team { id: 1, name: "A".into(), park_id: "PA".into(), batting_order: None };
        league.teams.push(team);
        league.players.insert(
            7,
            Player {
                id: 7,
                name: "Seven".into(),
                age: 25,
                bats: Hand::Left,
                throws: Hand::Left,
                position: Position::CF,
                team_id: 1,
                status: RosterStatus::Active,
                attributes: PlayerRole::Hitter(HitterAttributes::default()),
            },
        );
        league
    }

    #[test]
    fn test_change_status_reports_reason() {
        let mut league = league_with_one_player();
        let res = league.change_status(7, RosterStatus::Injured);
        assert!(res.success);

        let res = league.change_status(7, RosterStatus::Minors);
        assert!(!res.success);
        assert!(res.reason.contains("activated"));

        let res = league.change_status(99, RosterStatus::Active);
        assert!(!res.success);
    }

    #[test]
    fn test_missing_park_falls_back_to_neutral() {
        let league = league_with_one_player();
        let park = league.park_for(1);
        assert_eq!(park.hr_factor, 1.0);
    }
}
