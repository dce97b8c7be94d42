//! Game rules and scheduler pacing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRulesConfig {
    /// Regulation length (default: 9)
    pub regulation_innings: u8,
    /// Hard stop for extra innings (default: 25)
    pub max_innings: u8,
    /// First inning with a runner placed on second (default: 10)
    pub manned_runner_inning: u8,
    /// Runs awarded to the opponent of a forfeiting side (default: 9)
    pub forfeit_runs: u32,
    /// Keep a play-by-play log in the box score (default: false)
    pub record_play_by_play: bool,
}

impl Default for GameRulesConfig {
    fn default() -> Self {
        Self {
            regulation_innings: 9,
            max_innings: 25,
            manned_runner_inning: 10,
            forfeit_runs: 9,
            record_play_by_play: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Games per progress callback (default: 50)
    pub batch_size: usize,
    /// Run disjoint-team slates on the rayon pool (default: true)
    pub parallel_slates: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { batch_size: 50, parallel_slates: true }
    }
}
