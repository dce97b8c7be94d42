//! Pitcher usage, fatigue and rest parameters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchingConfig {
    // === Rest ===
    /// Team games a starter must wait between starts (default: 4)
    pub starter_rest_games: u32,
    /// Recovery rate at or above which rest requirements relax (default: 450)
    pub high_recovery_threshold: u16,
    /// Games shaved off starter rest for high recovery (default: 1)
    pub high_recovery_bonus: u32,
    /// Pitches in one relief outing that force a day off (default: 30)
    pub reliever_heavy_pitches: u32,
    /// Consecutive relief appearances that force a day off (default: 2)
    pub reliever_max_consecutive: u32,

    // === Pull triggers ===
    /// Starter pitch limit = base + stamina * per_stamina (default: 55 + 0.12/pt)
    pub starter_limit_base: f64,
    pub starter_limit_per_stamina: f64,
    /// Reliever pitch limit = base + stamina * per_stamina (default: 12 + 0.07/pt)
    pub reliever_limit_base: f64,
    pub reliever_limit_per_stamina: f64,
    /// Starter inning cap = base + (stamina - 300) / per_inning (default: 5, 75)
    pub inning_cap_base: f64,
    pub inning_cap_stamina_per_inning: f64,
    /// Starter is pulled before a pass through the order beyond this (default: 3)
    pub max_times_through_order: u32,
    /// Inning from which middle relievers give way (default: 8)
    pub late_inning: u8,
    /// Largest lead that still counts as a save situation (default: 3)
    pub save_margin: i32,

    // === Fatigue curve ===
    /// Pitches before degradation starts to accelerate (default: 60)
    pub fatigue_soft_pitches: f64,
    /// First cliff (default: 90)
    pub fatigue_first_cliff: f64,
    /// Second cliff (default: 110)
    pub fatigue_second_cliff: f64,
    /// Ceiling on stuff/command degradation (default: 0.55)
    pub fatigue_max: f64,

    // === Momentum ===
    /// Confidence bound, symmetric (default: 0.15)
    pub momentum_max: f64,
    /// Share of confidence kept between innings (default: 0.5)
    pub momentum_carry: f64,
}

impl Default for PitchingConfig {
    fn default() -> Self {
        Self {
            starter_rest_games: 4,
            high_recovery_threshold: 450,
            high_recovery_bonus: 1,
            reliever_heavy_pitches: 30,
            reliever_max_consecutive: 2,

            starter_limit_base: 55.0,
            starter_limit_per_stamina: 0.12,
            reliever_limit_base: 12.0,
            reliever_limit_per_stamina: 0.07,
            inning_cap_base: 5.0,
            inning_cap_stamina_per_inning: 75.0,
            max_times_through_order: 3,
            late_inning: 8,
            save_margin: 3,

            fatigue_soft_pitches: 60.0,
            fatigue_first_cliff: 90.0,
            fatigue_second_cliff: 110.0,
            fatigue_max: 0.55,

            momentum_max: 0.15,
            momentum_carry: 0.5,
        }
    }
}
