//! Pitcher decisions: win, loss, save, hold and blown save.
//!
//! Rules are applied by walking each team's appearances in order:
//! - the starter of the winning team gets the win, the losing starter the loss;
//! - the winning team's last reliever gets the save when the final margin is
//!   three runs or fewer or the outing lasted at least nine outs, otherwise a hold;
//! - other winning relievers who entered in a save situation and left with
//!   the lead get a hold;
//! - a losing reliever who entered in a save situation and allowed at least
//!   as many runs as the lead at entry is charged with a blown save.
//!
//! Tied games carry no decisions.

use crate::models::box_score::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionInput {
    pub outs: u32,
    pub runs_allowed: u32,
    pub entered_in_save: bool,
    pub entry_lead: i32,
    pub exit_lead: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub decision: Option<Decision>,
    pub hold: bool,
    pub blown_save: bool,
}

pub fn winning_side(appearances: &[DecisionInput], final_margin: u32) -> Vec<DecisionOutcome> {
    let n = appearances.len();
    appearances
        .iter()
        .enumerate()
        .map(|(i, app)| {
            let mut out = DecisionOutcome::default();
            if i == 0 {
                out.decision = Some(Decision::Win);
            } else if i == n - 1 {
                if final_margin <= 3 || app.outs >= 9 {
                    out.decision = Some(Decision::Save);
                } else {
                    out.hold = true;
                }
            } else {
                out.hold = app.entered_in_save && app.exit_lead.is_some_and(|lead| lead > 0);
            }
            out
        })
        .collect()
}

pub fn losing_side(appearances: &[DecisionInput]) -> Vec<DecisionOutcome> {
    appearances
        .iter()
        .enumerate()
        .map(|(i, app)| {
            let mut out = DecisionOutcome::default();
            if i == 0 {
                out.decision = Some(Decision::Loss);
            } else {
                out.blown_save = app.entered_in_save && app.runs_allowed as i32 >= app.entry_lead;
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(outs: u32, runs: u32, save: bool, entry: i32, exit: Option<i32>) -> DecisionInput {
        DecisionInput {
            outs,
            runs_allowed: runs,
            entered_in_save: save,
            entry_lead: entry,
            exit_lead: exit,
        }
    }

    #[test]
    fn test_complete_game_win() {
        let out = winning_side(&[app(27, 1, false, 0, None)], 4);
        assert_eq!(out[0].decision, Some(Decision::Win));
    }

    #[test]
    fn test_save_and_hold_chain() {
        let apps = [
            app(18, 2, false, 0, Some(2)),
            app(6, 0, true, 2, Some(2)),
            app(3, 0, true, 2, None),
        ];
        let out = winning_side(&apps, 2);
        assert_eq!(out[0].decision, Some(Decision::Win));
        assert!(out[1].hold);
        assert_eq!(out[2].decision, Some(Decision::Save));
    }

    #[test]
    fn test_blowout_finisher_gets_hold() {
        let apps = [app(21, 0, false, 0, Some(8)), app(6, 0, false, 8, None)];
        let out = winning_side(&apps, 8);
        assert_eq!(out[1].decision, None);
        assert!(out[1].hold);

        // Three-inning finisher earns the save regardless of margin.
        let apps = [app(18, 0, false, 0, Some(7)), app(9, 0, false, 7, None)];
        assert_eq!(winning_side(&apps, 7)[1].decision, Some(Decision::Save));
    }

    #[test]
    fn test_blown_save_on_losing_side() {
        let apps = [app(21, 1, false, 0, Some(2)), app(2, 3, true, 2, Some(-1))];
        let out = losing_side(&apps);
        assert_eq!(out[0].decision, Some(Decision::Loss));
        assert!(out[1].blown_save);

        let apps = [app(21, 1, false, 0, Some(2)), app(2, 1, true, 2, Some(1))];
        assert!(!losing_side(&apps)[1].blown_save);
    }
}
