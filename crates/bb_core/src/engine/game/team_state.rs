//! Mutable per-team state while a game is in progress.

use crate::engine::pitching::MomentumState;
use crate::engine::tactics::substitution::{self, SubstitutionResult};
use crate::models::box_score::{PitchingLine, PlayerGameStats};
use crate::models::player::{PlayerId, Position};
use crate::models::team::TeamId;
use crate::models::TeamSide;

use super::engine::{BullpenArm, TeamPlan};

/// Runner on base and the pitcher charged if the runner scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunnerInfo {
    pub player_id: PlayerId,
    pub responsible: PlayerId,
    /// False for runners who reached on an error or were placed.
    pub earned: bool,
}

/// One pitcher's outing.
#[derive(Debug, Clone)]
pub(crate) struct Appearance {
    pub player_id: PlayerId,
    pub order: u8,
    pub line: PitchingLine,
    pub entry_inning: u8,
    /// Fielding team's lead at entry.
    pub entry_lead: i32,
    pub entered_in_save: bool,
    pub exit_lead: Option<i32>,
    pub is_closer: bool,
    pub momentum: MomentumState,
}

impl Appearance {
    pub fn new(
        player_id: PlayerId,
        order: u8,
        entry_inning: u8,
        entry_lead: i32,
        entered_in_save: bool,
        is_closer: bool,
    ) -> Self {
        let starts = u32::from(order == 0);
        let line = PitchingLine { games: 1, starts, ..PitchingLine::default() };
        Self {
            player_id,
            order,
            line,
            entry_inning,
            entry_lead,
            entered_in_save,
            exit_lead: None,
            is_closer,
            momentum: MomentumState::fresh(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TeamGameState {
    pub team_id: TeamId,
    pub side: TeamSide,
    pub lineup: Vec<PlayerId>,
    pub positions: Vec<Position>,
    pub bench: Vec<PlayerId>,
    /// Players who left the game.
    pub removed: Vec<PlayerId>,
    pub bullpen: Vec<BullpenArm>,
    pub bullpen_cursor: usize,
    pub closer: Option<PlayerId>,
    pub pitcher: Appearance,
    pub finished_pitchers: Vec<Appearance>,
    pub batting: Vec<PlayerGameStats>,
    pub defense_rating: f64,
}

impl TeamGameState {
    pub fn new(plan: &TeamPlan, side: TeamSide) -> Self {
        let setup = &plan.setup;
        let closer = setup.closer;
        let starter = Appearance::new(plan.starter, 0, 1, 0, false, closer == Some(plan.starter));
        let batting = setup
            .lineup
            .iter()
            .enumerate()
            .map(|(slot, id)| PlayerGameStats::new(*id, setup.team_id, slot as u8))
            .collect();
        Self {
            team_id: setup.team_id,
            side,
            lineup: setup.lineup.clone(),
            positions: setup.positions.clone(),
            bench: setup.bench.clone(),
            removed: Vec::new(),
            bullpen: plan.bullpen.iter().copied().filter(|arm| arm.id != plan.starter).collect(),
            bullpen_cursor: plan.bullpen_cursor,
            closer,
            pitcher: starter,
            finished_pitchers: Vec::new(),
            batting,
            defense_rating: 400.0,
        }
    }

    pub fn batting_mut(&mut self, player_id: PlayerId, slot: usize) -> &mut PlayerGameStats {
        let idx = match self.batting.iter().position(|s| s.player_id == player_id) {
            Some(idx) => idx,
            None => {
                self.batting.push(PlayerGameStats::new(player_id, self.team_id, slot as u8));
                self.batting.len() - 1
            }
        };
        &mut self.batting[idx]
    }

    /// The appearance charged for `player_id`, current pitcher first.
    pub fn appearance_mut(&mut self, player_id: PlayerId) -> Option<&mut Appearance> {
        if self.pitcher.player_id == player_id {
            return Some(&mut self.pitcher);
        }
        self.finished_pitchers.iter_mut().find(|a| a.player_id == player_id)
    }

    pub fn slot_of(&self, player_id: PlayerId) -> Option<usize> {
        self.lineup.iter().position(|id| *id == player_id)
    }

    pub fn catcher(&self) -> Option<PlayerId> {
        self.positions.iter().position(|p| *p == Position::C).map(|slot| self.lineup[slot])
    }

    pub fn substitute(&mut self, slot: usize, incoming: PlayerId) -> SubstitutionResult {
        let Some(outgoing) = self.lineup.get(slot).copied() else {
            let reason = format!("No lineup slot {}", slot);
            return SubstitutionResult { success: false, reason };
        };
        let result =
            substitution::validate_substitution(outgoing, incoming, &self.bench, &self.removed);
        if result.success {
            self.removed.push(outgoing);
            self.bench.retain(|id| *id != incoming);
            self.lineup[slot] = incoming;
        }
        result
    }

    /// Hand the ball to `reliever`; the outgoing pitcher's exit lead is recorded.
    pub fn change_pitcher(
        &mut self,
        reliever: PlayerId,
        inning: u8,
        fielding_lead: i32,
        save_situation: bool,
    ) {
        let order = (self.finished_pitchers.len() + 1) as u8;
        let is_closer = self.closer == Some(reliever);
        let incoming =
            Appearance::new(reliever, order, inning, fielding_lead, save_situation, is_closer);
        let mut outgoing = std::mem::replace(&mut self.pitcher, incoming);
        outgoing.exit_lead = Some(fielding_lead);
        self.finished_pitchers.push(outgoing);
        self.bullpen.retain(|arm| arm.id != reliever);
        self.bullpen_cursor = self.bullpen_cursor.wrapping_add(1);
    }

    /// Every appearance in order, current pitcher last.
    pub fn appearances(&self) -> impl Iterator<Item = &Appearance> {
        self.finished_pitchers.iter().chain(std::iter::once(&self.pitcher))
    }
}
