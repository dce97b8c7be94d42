//! Log5 blending weights and modifier squashing.

use serde::{Deserialize, Serialize};

/// How much each side controls an outcome. The batter's share is `1 - weight`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log5Config {
    /// Pitcher control over strikeouts (default: 0.75)
    pub k_pitcher_control: f64,
    /// Pitcher control over walks; batters own ~0.65 (default: 0.35)
    pub bb_pitcher_control: f64,
    /// Pitcher control over hit-by-pitch (default: 0.70)
    pub hbp_pitcher_control: f64,
    /// Pitcher control over home runs (default: 0.45)
    pub hr_pitcher_control: f64,
    /// Maximum swing of a combined modifier after squashing (default: 0.40)
    pub squash_max: f64,
    /// Floor on the ball-in-play share of stage 1 (default: 0.35)
    pub min_ball_in_play: f64,
}

impl Default for Log5Config {
    fn default() -> Self {
        Self {
            k_pitcher_control: 0.75,
            bb_pitcher_control: 0.35,
            hbp_pitcher_control: 0.70,
            hr_pitcher_control: 0.45,
            squash_max: 0.40,
            min_ball_in_play: 0.35,
        }
    }
}
