//! Gates for in-game tactical decisions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TacticsConfig {
    /// Master switch; disabled means plain plate appearances only (default: true)
    pub enabled: bool,

    // === Running game ===
    /// Minimum runner speed to consider a steal (default: 420)
    pub steal_min_speed: u16,
    /// Attempt probability for a runner at the speed floor (default: 0.06)
    pub steal_attempt_base: f64,
    /// Success probability with average runner, pitcher and catcher (default: 0.74)
    pub steal_success_base: f64,
    /// Wild pitch / passed ball chance per plate appearance with runners on (default: 0.008)
    pub wild_pitch_base: f64,
    /// Share of those credited to the catcher as passed balls (default: 0.25)
    pub passed_ball_share: f64,
    /// Per-PA chance of calling a hit-and-run when gated in (default: 0.12)
    pub hit_and_run_rate: f64,

    // === Bunting ===
    pub bunt_enabled: bool,
    /// Offense rating at or below which a hitter is asked to bunt (default: 340)
    pub bunt_max_offense: f64,
    /// Earliest inning for sacrifice bunts by regulars (default: 7)
    pub bunt_min_inning: u8,

    // === Intentional walk ===
    /// Offense gap between batter and on-deck hitter that triggers an IBB (default: 70)
    pub ibb_threat_gap: f64,
    /// Earliest inning for an intentional walk (default: 7)
    pub ibb_min_inning: u8,

    // === Substitutions ===
    /// Runs within which a game counts as close (default: 3)
    pub close_game_runs: i32,
    pub pinch_hit_min_inning: u8,
    /// Bench offense advantage required to pinch hit (default: 45)
    pub pinch_hit_margin: f64,
    pub pinch_run_min_inning: u8,
    /// Bench speed advantage required to pinch run (default: 90)
    pub pinch_run_speed_margin: u16,
    pub defensive_sub_min_inning: u8,
    /// Bench defense advantage required for a defensive replacement (default: 60)
    pub defensive_sub_margin: f64,

    // === Alignment ===
    /// Pull tendency at or above which the defense shifts (default: 0.62)
    pub shift_pull_threshold: f64,
    /// Earliest inning the infield plays in with a runner on third (default: 7)
    pub infield_in_min_inning: u8,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,

            steal_min_speed: 420,
            steal_attempt_base: 0.06,
            steal_success_base: 0.74,
            wild_pitch_base: 0.008,
            passed_ball_share: 0.25,
            hit_and_run_rate: 0.12,

            bunt_enabled: true,
            bunt_max_offense: 340.0,
            bunt_min_inning: 7,

            ibb_threat_gap: 70.0,
            ibb_min_inning: 7,

            close_game_runs: 3,
            pinch_hit_min_inning: 7,
            pinch_hit_margin: 45.0,
            pinch_run_min_inning: 8,
            pinch_run_speed_margin: 90,
            defensive_sub_min_inning: 8,
            defensive_sub_margin: 60.0,

            shift_pull_threshold: 0.62,
            infield_in_min_inning: 7,
        }
    }
}
