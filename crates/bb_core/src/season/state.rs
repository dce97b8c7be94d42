//! State carried across games: rest map, rotation and bullpen cursors, and
//! per-team game counts.
//!
//! Only the scheduler touches this, one game at a time in schedule order.
//! Games receive a [`GamePlan`] built from it and never see it directly.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::config::EngineConfig;
use crate::engine::game::{forfeit_result, BullpenArm, GamePlan, TeamPlan, TeamSetup};
use crate::engine::pitching::PitcherRestMap;
use crate::error::Result;
use crate::models::player::{PitcherAttributes, PlayerId};
use crate::models::{GameResult, League, TeamId, TeamSide};

/// A planned game, or the side charged with a forfeit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlannedGame {
    Play { plan: GamePlan },
    Forfeit {
        game_id: u64,
        date: NaiveDate,
        home_team_id: TeamId,
        away_team_id: TeamId,
        charged: TeamSide,
    },
}

impl PlannedGame {
    pub fn game_id(&self) -> u64 {
        match self {
            PlannedGame::Play { plan } => plan.game_id,
            PlannedGame::Forfeit { game_id, .. } => *game_id,
        }
    }

    pub fn forfeit_result(&self, config: &EngineConfig) -> Option<GameResult> {
        match self {
            PlannedGame::Forfeit { game_id, date, home_team_id, away_team_id, charged } => {
                let (home, away) = (*home_team_id, *away_team_id);
                Some(forfeit_result(*game_id, *date, home, away, *charged, config))
            }
            PlannedGame::Play { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonState {
    pub rest: PitcherRestMap,
    /// Rotation slot of each team's next starter.
    pub rotation_cursor: BTreeMap<TeamId, usize>,
    pub bullpen_cursor: BTreeMap<TeamId, usize>,
    /// Games completed (including forfeits) per team.
    pub team_games: BTreeMap<TeamId, u32>,
}

impl SeasonState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the team's next game will have, starting at 1.
    pub fn next_game_index(&self, team_id: TeamId) -> u32 {
        self.team_games.get(&team_id).copied().unwrap_or(0) + 1
    }

    /// Season rollover: clears rest and cursors.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn plan_game(
        &self,
        league: &League,
        config: &EngineConfig,
        game_id: u64,
        date: NaiveDate,
        seed: u64,
        home_team_id: TeamId,
        away_team_id: TeamId,
    ) -> PlannedGame {
        let home = self.team_plan(league, config, home_team_id);
        let away = self.team_plan(league, config, away_team_id);
        let charged = match (home, away) {
            (Ok(home), Ok(away)) => {
                let park = league.park_for(home_team_id);
                let plan = GamePlan { game_id, date, seed, away, home, park };
                return PlannedGame::Play { plan };
            }
            (Err(e), _) => {
                warn!(game_id, team = home_team_id, error = %e, "home team forfeits");
                TeamSide::Home
            }
            (Ok(_), Err(e)) => {
                warn!(game_id, team = away_team_id, error = %e, "away team forfeits");
                TeamSide::Away
            }
        };
        PlannedGame::Forfeit { game_id, date, home_team_id, away_team_id, charged }
    }

    /// Starter from the rotation cursor, falling back to the most rested arm,
    /// and the relievers rested enough to pitch.
    pub fn team_plan(
        &self,
        league: &League,
        config: &EngineConfig,
        team_id: TeamId,
    ) -> Result<TeamPlan> {
        let setup = TeamSetup::build(league, team_id)?;
        let game_index = self.next_game_index(team_id);
        let cfg = &config.pitching;
        let attrs = |id: PlayerId| -> PitcherAttributes {
            league.players.get(&id).map(|p| p.pitching_or_default()).unwrap_or_default()
        };

        let cursor = self.rotation_cursor.get(&team_id).copied().unwrap_or(0);
        let len = setup.rotation.len();
        let in_turn = (0..len)
            .map(|k| setup.rotation[(cursor + k) % len])
            .find(|id| self.rest.can_start(*id, &attrs(*id), game_index, cfg));
        let starter = match in_turn {
            Some(id) => id,
            None => self.most_rested(&setup, game_index),
        };

        let bullpen = setup
            .bullpen
            .iter()
            .copied()
            .filter(|id| *id != starter && self.rest.can_relieve(*id, &attrs(*id), game_index, cfg))
            .map(|id| BullpenArm { id, games_rest: self.rest.games_since(id, game_index) })
            .collect();
        let bullpen_cursor = self.bullpen_cursor.get(&team_id).copied().unwrap_or(0);
        Ok(TeamPlan { setup, starter, bullpen, bullpen_cursor })
    }

    /// Fresh arms first, then the longest rest; ties to the lower id.
    fn most_rested(&self, setup: &TeamSetup, game_index: u32) -> PlayerId {
        setup
            .staff()
            .max_by_key(|id| {
                let rest = self.rest.games_since(*id, game_index).unwrap_or(u32::MAX);
                (rest, std::cmp::Reverse(*id))
            })
            .unwrap_or_default()
    }

    /// Fold a finished game into the cross-game state.
    pub fn record_game(&mut self, planned: &PlannedGame, result: &GameResult) {
        if let PlannedGame::Play { plan } = planned {
            for side in [TeamSide::Away, TeamSide::Home] {
                let team = plan.team(side);
                let team_id = team.setup.team_id;
                let game_index = self.next_game_index(team_id);
                let mut relievers = 0;
                for line in result.box_score.pitching.iter().filter(|p| p.team_id == team_id) {
                    let started = line.order == 0;
                    self.rest.record(line.player_id, game_index, line.line.pitches, started);
                    if line.order > 0 {
                        relievers += 1;
                    }
                }
                if let Some(slot) = team.setup.rotation.iter().position(|id| *id == team.starter) {
                    self.rotation_cursor.insert(team_id, (slot + 1) % team.setup.rotation.len());
                }
                *self.bullpen_cursor.entry(team_id).or_default() += relievers;
            }
        }
        for team_id in [result.home_team_id, result.away_team_id] {
            *self.team_games.entry(team_id).or_default() += 1;
        }
    }
}
