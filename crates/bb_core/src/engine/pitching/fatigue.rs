//! Pitch-count fatigue curve.

use crate::engine::config::PitchingConfig;
use crate::models::player::ATTR_AVERAGE;

/// Pitch count adjusted for stamina: an average-stamina arm counts pitches
/// one for one, a 550-stamina arm counts about 0.73.
pub fn effective_pitches(pitches: u32, stamina: u16) -> f64 {
    let stamina = f64::from(stamina.clamp(150, 550));
    f64::from(pitches) * ATTR_AVERAGE / stamina
}

/// Degradation in `[0, fatigue_max]`.
///
/// Sub-linear up to the soft threshold, linear after it, with two steeper
/// segments past the first and second cliffs.
pub fn fatigue_level(effective: f64, cfg: &PitchingConfig) -> f64 {
    if !effective.is_finite() || effective <= 0.0 {
        return 0.0;
    }
    let soft = cfg.fatigue_soft_pitches.max(1.0);
    let mut level = if effective <= soft {
        0.08 * (effective / soft).powf(1.5)
    } else {
        0.08 + 0.002 * (effective - soft)
    };
    if effective > cfg.fatigue_first_cliff {
        level += 0.006 * (effective - cfg.fatigue_first_cliff);
    }
    if effective > cfg.fatigue_second_cliff {
        level += 0.012 * (effective - cfg.fatigue_second_cliff);
    }
    level.clamp(0.0, cfg.fatigue_max)
}

pub fn fatigue(pitches: u32, stamina: u16, cfg: &PitchingConfig) -> f64 {
    fatigue_level(effective_pitches(pitches, stamina), cfg)
}

/// Fold momentum into the fatigue-equivalent the modifiers consume.
pub fn with_momentum(fatigue: f64, confidence: f64, cfg: &PitchingConfig) -> f64 {
    (fatigue - confidence).clamp(-cfg.momentum_max, cfg.fatigue_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_shape() {
        let cfg = PitchingConfig::default();
        let at = |p: f64| fatigue_level(p, &cfg);
        assert_eq!(at(0.0), 0.0);
        // Sub-linear early
        assert!(at(30.0) < at(60.0) / 2.0);
        // Each cliff steepens the slope
        let slope_mid = at(85.0) - at(80.0);
        let slope_after_first = at(100.0) - at(95.0);
        let slope_after_second = at(115.0) - at(110.0);
        assert!(slope_after_first > slope_mid);
        assert!(slope_after_second > slope_after_first);
        assert!((at(500.0) - cfg.fatigue_max).abs() < 1e-12);
    }

    #[test]
    fn test_stamina_scales_curve() {
        let cfg = PitchingConfig::default();
        assert!(fatigue(100, 520, &cfg) < fatigue(100, 400, &cfg));
        assert!(fatigue(100, 250, &cfg) > fatigue(100, 400, &cfg));
    }

    #[test]
    fn test_momentum_folds_in() {
        let cfg = PitchingConfig::default();
        assert!(with_momentum(0.0, 0.1, &cfg) < 0.0);
        assert_eq!(with_momentum(0.0, 1.0, &cfg), -cfg.momentum_max);
        assert!(with_momentum(0.2, -0.1, &cfg) > 0.2);
    }
}
