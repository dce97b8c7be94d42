//! Park metadata and per-game environment (weather, umpire).

use serde::{Deserialize, Serialize};

use crate::engine::rng::Generator;

pub type ParkId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkFactors {
    pub id: ParkId,
    #[serde(default)]
    pub name: String,
    pub hr_factor: f64,
    pub babip_factor: f64,
    pub double_factor: f64,
    pub triple_factor: f64,
    pub k_factor: f64,
    /// Multiplier on ground-ball share of batted balls.
    #[serde(default = "one")]
    pub groundball_factor: f64,
    /// Feet above sea level.
    pub elevation_ft: f64,
    #[serde(default)]
    pub has_roof: bool,
    /// Typical game-time temperature (°F).
    #[serde(default = "default_climate")]
    pub climate_temp_f: f64,
}

fn one() -> f64 {
    1.0
}

fn default_climate() -> f64 {
    72.0
}

impl ParkFactors {
    pub fn neutral(id: impl Into<ParkId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            hr_factor: 1.0,
            babip_factor: 1.0,
            double_factor: 1.0,
            triple_factor: 1.0,
            k_factor: 1.0,
            groundball_factor: 1.0,
            elevation_ft: 500.0,
            has_roof: false,
            climate_temp_f: 72.0,
        }
    }

    /// Factors clamped to `[0.5, 1.6]`; non-finite values become neutral.
    pub fn sanitized(&self) -> Self {
        fn fix(v: f64) -> f64 {
            if v.is_finite() {
                v.clamp(0.5, 1.6)
            } else {
                1.0
            }
        }
        Self {
            hr_factor: fix(self.hr_factor),
            babip_factor: fix(self.babip_factor),
            double_factor: fix(self.double_factor),
            triple_factor: fix(self.triple_factor),
            k_factor: fix(self.k_factor),
            groundball_factor: fix(self.groundball_factor),
            elevation_ft: if self.elevation_ft.is_finite() {
                self.elevation_ft.clamp(-300.0, 8000.0)
            } else {
                0.0
            },
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindDirection {
    Calm,
    /// Blowing out toward the outfield.
    Out,
    /// Blowing in from the outfield.
    In,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temperature_f: f64,
    pub wind_mph: f64,
    pub wind_direction: WindDirection,
    pub roof_closed: bool,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            temperature_f: 72.0,
            wind_mph: 0.0,
            wind_direction: WindDirection::Calm,
            roof_closed: false,
        }
    }
}

impl Weather {
    /// Draw game-time weather around the park's climate. Uses three draws.
    pub fn generate(park: &ParkFactors, gen: Generator) -> (Weather, Generator) {
        let (temperature_f, gen) = gen.clamped_gaussian(park.climate_temp_f, 9.0, 35.0, 105.0);
        let (wind_mph, gen) = gen.clamped_gaussian(7.0, 4.5, 0.0, 25.0);
        let (dir_idx, gen) = gen.choose_weighted(&[0.30, 0.30, 0.40]);

        if park.has_roof && (temperature_f < 55.0 || temperature_f > 92.0) {
            let closed = Weather {
                temperature_f: 72.0,
                wind_mph: 0.0,
                wind_direction: WindDirection::Calm,
                roof_closed: true,
            };
            return (closed, gen);
        }

        let wind_direction = if wind_mph < 3.0 {
            WindDirection::Calm
        } else {
            match dir_idx {
                0 => WindDirection::Out,
                1 => WindDirection::In,
                _ => WindDirection::Cross,
            }
        };
        (Weather { temperature_f, wind_mph, wind_direction, roof_closed: false }, gen)
    }
}

/// Plate umpire tendencies for one game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UmpireProfile {
    /// Above zero widens the zone (more strikeouts, fewer walks).
    pub zone_bias: f64,
    /// 0..1, higher means fewer missed calls.
    pub consistency: f64,
}

impl Default for UmpireProfile {
    fn default() -> Self {
        Self { zone_bias: 0.0, consistency: 0.8 }
    }
}

impl UmpireProfile {
    pub fn generate(gen: Generator) -> (UmpireProfile, Generator) {
        let (zone_bias, gen) = gen.clamped_gaussian(0.0, 0.35, -1.0, 1.0);
        let (consistency, gen) = gen.clamped_gaussian(0.8, 0.08, 0.5, 1.0);
        (UmpireProfile { zone_bias, consistency }, gen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_clamps_bad_factors() {
        let mut park = ParkFactors::neutral("X");
        park.hr_factor = 0.0;
        park.babip_factor = f64::NAN;
        let fixed = park.sanitized();
        assert_eq!(fixed.hr_factor, 0.5);
        assert_eq!(fixed.babip_factor, 1.0);
    }

    #[test]
    fn test_weather_is_deterministic() {
        let park = ParkFactors::neutral("P");
        let (a, _) = Weather::generate(&park, Generator::create(11));
        let (b, _) = Weather::generate(&park, Generator::create(11));
        assert_eq!(a, b);
        assert!((35.0..=105.0).contains(&a.temperature_f));
    }

    #[test]
    fn test_domed_park_closes_roof_in_extreme_heat() {
        let mut park = ParkFactors::neutral("Dome");
        park.has_roof = true;
        park.climate_temp_f = 104.0;
        let closed = (0..20)
            .map(|seed| Weather::generate(&park, Generator::create(seed)).0)
            .filter(|w| w.roof_closed)
            .count();
        assert!(closed >= 10, "closed {} of 20", closed);
    }
}
