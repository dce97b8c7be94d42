//! Lineup and staff construction from the active roster.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::player::{Player, PlayerId, Position};
use crate::models::team::{Team, TeamId};
use crate::models::League;

/// Everything a team brings to a game before pitcher selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSetup {
    pub team_id: TeamId,
    /// Batting order, exactly nine distinct hitters.
    pub lineup: Vec<PlayerId>,
    /// Position each lineup slot plays in the field.
    pub positions: Vec<Position>,
    pub bench: Vec<PlayerId>,
    /// Starting pitchers in id order.
    pub rotation: Vec<PlayerId>,
    /// Relievers and closer in id order.
    pub bullpen: Vec<PlayerId>,
    pub closer: Option<PlayerId>,
}

impl TeamSetup {
    pub fn build(league: &League, team_id: TeamId) -> Result<TeamSetup> {
        let team = league.team(team_id)?;
        Self::from_roster(team, &league.players)
    }

    pub fn from_roster(team: &Team, players: &BTreeMap<PlayerId, Player>) -> Result<TeamSetup> {
        let roster: Vec<&Player> = players.values().filter(|p| p.team_id == team.id).collect();
        let hitters: Vec<&Player> =
            roster.iter().copied().filter(|p| p.is_eligible_hitter()).collect();
        if hitters.len() < 9 {
            return Err(EngineError::InvalidRoster {
                team: team.id,
                reason: format!("{} eligible hitters, need 9", hitters.len()),
            });
        }
        let pitchers: Vec<&Player> =
            roster.iter().copied().filter(|p| p.is_eligible_pitcher()).collect();
        if pitchers.is_empty() {
            return Err(EngineError::InvalidRoster {
                team: team.id,
                reason: "no eligible pitcher".into(),
            });
        }

        let lineup = match &team.batting_order {
            Some(order) if is_valid_order(order, &hitters) => order.clone(),
            _ => rating_order(&hitters),
        };
        let positions = lineup
            .iter()
            .map(|id| players.get(id).map(|p| p.position).unwrap_or(Position::DH))
            .collect();
        let bench = hitters.iter().map(|p| p.id).filter(|id| !lineup.contains(id)).collect();

        let rotation =
            pitchers.iter().filter(|p| p.position == Position::SP).map(|p| p.id).collect();
        let bullpen =
            pitchers.iter().filter(|p| p.position != Position::SP).map(|p| p.id).collect();
        let closer = pitchers
            .iter()
            .filter(|p| p.position == Position::CL)
            .max_by(|a, b| {
                let ra = a.pitching_or_default().overall_rating();
                let rb = b.pitching_or_default().overall_rating();
                ra.total_cmp(&rb).then(b.id.cmp(&a.id))
            })
            .map(|p| p.id);

        Ok(TeamSetup { team_id: team.id, lineup, positions, bench, rotation, bullpen, closer })
    }

    /// Every pitcher on the staff, starters first.
    pub fn staff(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.rotation.iter().chain(self.bullpen.iter()).copied()
    }
}

fn is_valid_order(order: &[PlayerId], hitters: &[&Player]) -> bool {
    if order.len() != 9 {
        return false;
    }
    let distinct = order.iter().enumerate().all(|(i, id)| !order[..i].contains(id));
    distinct && order.iter().all(|id| hitters.iter().any(|h| h.id == *id))
}

/// Top nine by offense rating, best first; ties go to the lower id.
fn rating_order(hitters: &[&Player]) -> Vec<PlayerId> {
    let mut ranked: Vec<(PlayerId, f64)> =
        hitters.iter().map(|p| (p.id, p.hitting_or_default().offense_rating())).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().take(9).map(|(id, _)| id).collect()
}

/// Weighted fielding of the players on the field, 400 when nobody has a
/// defensive weight.
pub fn defense_rating(slots: &[(Position, f64)]) -> f64 {
    let (total, weight) = slots.iter().fold((0.0, 0.0), |(t, w), (pos, rating)| {
        let pw = pos.defensive_weight();
        (t + pw * rating, w + pw)
    });
    if weight > 0.0 {
        total / weight
    } else {
        400.0
    }
}
