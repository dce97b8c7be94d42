//! Inning, score and lineup bookkeeping for one game.

use serde::{Deserialize, Serialize};

use crate::models::TeamSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    PreGame,
    TopInning,
    MidInning,
    BottomInning,
    PostGame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Half {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameContext {
    pub inning: u8,
    pub half: Half,
    /// Indexed by `TeamSide::index()`.
    pub score: [u32; 2],
    /// Next lineup slot to bat, always `0..9`.
    pub lineup_cursor: [usize; 2],
    pub phase: GamePhase,
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GameContext {
    pub fn new() -> Self {
        Self {
            inning: 1,
            half: Half::Top,
            score: [0, 0],
            lineup_cursor: [0, 0],
            phase: GamePhase::PreGame,
        }
    }

    pub fn batting_side(&self) -> TeamSide {
        match self.half {
            Half::Top => TeamSide::Away,
            Half::Bottom => TeamSide::Home,
        }
    }

    pub fn fielding_side(&self) -> TeamSide {
        self.batting_side().opponent()
    }

    /// Score of `side` minus its opponent's.
    pub fn lead(&self, side: TeamSide) -> i32 {
        self.score[side.index()] as i32 - self.score[side.opponent().index()] as i32
    }

    pub fn start_half(&mut self) {
        self.phase = match self.half {
            Half::Top => GamePhase::TopInning,
            Half::Bottom => GamePhase::BottomInning,
        };
    }

    /// Top goes to bottom of the same inning; bottom goes to the next top.
    pub fn end_half(&mut self) {
        match self.half {
            Half::Top => {
                self.half = Half::Bottom;
                self.phase = GamePhase::MidInning;
            }
            Half::Bottom => {
                self.half = Half::Top;
                self.inning = self.inning.saturating_add(1);
                self.phase = GamePhase::MidInning;
            }
        }
    }

    pub fn finish(&mut self) {
        self.phase = GamePhase::PostGame;
    }

    pub fn current_slot(&self, side: TeamSide) -> usize {
        self.lineup_cursor[side.index()] % 9
    }

    /// Slot that batted last, used to place the extra-inning runner.
    pub fn previous_slot(&self, side: TeamSide) -> usize {
        (self.lineup_cursor[side.index()] + 8) % 9
    }

    pub fn on_deck_slot(&self, side: TeamSide) -> usize {
        (self.lineup_cursor[side.index()] + 1) % 9
    }

    pub fn advance_lineup(&mut self, side: TeamSide) {
        let cursor = &mut self.lineup_cursor[side.index()];
        *cursor = (*cursor + 1) % 9;
    }

    pub fn add_runs(&mut self, side: TeamSide, runs: u32) {
        self.score[side.index()] += runs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_inning_wrap() {
        let mut ctx = GameContext::new();
        assert_eq!(ctx.batting_side(), TeamSide::Away);
        ctx.end_half();
        assert_eq!(ctx.inning, 1);
        assert_eq!(ctx.batting_side(), TeamSide::Home);
        ctx.end_half();
        assert_eq!(ctx.inning, 2);
        assert_eq!(ctx.half, Half::Top);
    }

    #[test]
    fn test_lineup_cursor_wraps_at_nine() {
        let mut ctx = GameContext::new();
        for _ in 0..10 {
            ctx.advance_lineup(TeamSide::Home);
        }
        assert_eq!(ctx.current_slot(TeamSide::Home), 1);
        assert_eq!(ctx.previous_slot(TeamSide::Home), 0);
        assert_eq!(ctx.previous_slot(TeamSide::Away), 8);
    }

    #[test]
    fn test_lead_is_signed() {
        let mut ctx = GameContext::new();
        ctx.add_runs(TeamSide::Home, 3);
        ctx.add_runs(TeamSide::Away, 1);
        assert_eq!(ctx.lead(TeamSide::Home), 2);
        assert_eq!(ctx.lead(TeamSide::Away), -2);
    }
}
