//! Three-stage plate-appearance resolver.
//!
//! 1. Non-contact outcomes (K, BB, HBP, HR) against a ball-in-play remainder.
//! 2. Batted-ball type for balls in play.
//! 3. Hit or out given the type, then the hit type or the out branch
//!    (error, double play, sacrifice fly).
//!
//! Draw count is fixed per branch: one draw when stage 1 ends the plate
//! appearance, four when the ball is put in play.

use serde::{Deserialize, Serialize};

use crate::engine::baserunning::SpeedTier;
use crate::engine::config::EngineConfig;
use crate::engine::modifiers::batter::clutch_adjusted;
use crate::engine::modifiers::{ModifierCategory, ModifierContext, ModifierPipeline};
use crate::engine::probability::{self, clamp_probability};
use crate::engine::rates::{batted_ball_mix, batter_rates, pitcher_rates};
use crate::engine::rng::Generator;
use crate::models::player::attr_delta;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattedBall {
    Ground,
    Fly,
    Line,
    Popup,
}

impl BattedBall {
    pub const ALL: [BattedBall; 4] =
        [BattedBall::Ground, BattedBall::Fly, BattedBall::Line, BattedBall::Popup];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaOutcome {
    Strikeout,
    Walk,
    HitByPitch,
    HomeRun,
    Single,
    Double,
    Triple,
    GroundOut,
    FlyOut,
    LineOut,
    PopOut,
    DoublePlay,
    SacrificeFly,
    ReachedOnError,
}

impl PaOutcome {
    pub fn is_hit(self) -> bool {
        matches!(
            self,
            PaOutcome::Single | PaOutcome::Double | PaOutcome::Triple | PaOutcome::HomeRun
        )
    }

    pub fn is_at_bat(self) -> bool {
        !matches!(self, PaOutcome::Walk | PaOutcome::HitByPitch | PaOutcome::SacrificeFly)
    }

    /// Outs recorded on the play itself.
    pub fn outs_recorded(self) -> u8 {
        match self {
            PaOutcome::Strikeout
            | PaOutcome::GroundOut
            | PaOutcome::FlyOut
            | PaOutcome::LineOut
            | PaOutcome::PopOut
            | PaOutcome::SacrificeFly => 1,
            PaOutcome::DoublePlay => 2,
            _ => 0,
        }
    }
}

/// Everything the resolver needs about one plate appearance.
#[derive(Debug, Clone, Copy)]
pub struct PaInput<'a> {
    pub ctx: ModifierContext<'a>,
    /// Speed of the runner on first, second, third.
    pub runner_speeds: [Option<u16>; 3],
    /// Runners going on the pitch (hit-and-run). Removes the double play.
    pub runner_in_motion: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaResult {
    pub outcome: PaOutcome,
    pub batted_ball: Option<BattedBall>,
    pub pitches: u32,
}

/// Stage-1 distribution in `[k, bb, hbp, hr, ball_in_play]` order.
pub type StageOne = [f64; 5];

#[derive(Debug, Clone)]
pub struct PlateAppearanceResolver {
    config: EngineConfig,
    pipeline: ModifierPipeline,
}

impl PlateAppearanceResolver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
            pipeline: ModifierPipeline::standard(config.log5.squash_max),
        }
    }

    pub fn with_pipeline(config: &EngineConfig, pipeline: ModifierPipeline) -> Self {
        Self { config: config.clone(), pipeline }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &ModifierPipeline {
        &self.pipeline
    }

    pub fn stage_one(&self, ctx: &ModifierContext) -> StageOne {
        let league = &self.config.league;
        let weights = &self.config.log5;
        let b = batter_rates(ctx.batter, league);
        let p = pitcher_rates(ctx.pitcher, league);

        let k = probability::matchup_rate(b.k, p.k, league.k, weights.k_pitcher_control)
            * self.pipeline.combined(ModifierCategory::Strikeout, ctx);
        let bb = probability::matchup_rate(b.bb, p.bb, league.bb, weights.bb_pitcher_control)
            * self.pipeline.combined(ModifierCategory::Walk, ctx);
        let hbp = probability::matchup_rate(b.hbp, p.hbp, league.hbp, weights.hbp_pitcher_control);
        let hr = probability::matchup_rate(b.hr, p.hr, league.hr, weights.hr_pitcher_control)
            * self.pipeline.combined(ModifierCategory::HomeRun, ctx);

        let ([k, bb, hbp, hr], bip) =
            probability::with_remainder([k, bb, hbp, hr], weights.min_ball_in_play);
        [k, bb, hbp, hr, bip]
    }

    pub fn batted_ball_mix(&self, ctx: &ModifierContext) -> [f64; 4] {
        batted_ball_mix(ctx.batter, ctx.pitcher, &self.config.league, ctx.park.groundball_factor)
    }

    /// Chance that a ball of this type falls for a hit.
    pub fn hit_probability(&self, ctx: &ModifierContext, batted_ball: BattedBall) -> f64 {
        let league = &self.config.league;
        let base = match batted_ball {
            BattedBall::Ground => league.babip_ground,
            BattedBall::Fly => league.babip_fly,
            BattedBall::Line => league.babip_line,
            BattedBall::Popup => league.babip_popup,
        };
        // Contact quality and speed move BABIP slightly on top of league rate.
        let skill = match batted_ball {
            BattedBall::Ground => {
                0.06 * attr_delta(ctx.batter.speed) + 0.03 * attr_delta(ctx.batter.contact)
            }
            BattedBall::Line | BattedBall::Fly => 0.04 * attr_delta(ctx.batter.contact),
            BattedBall::Popup => 0.0,
        } - 0.04 * attr_delta(ctx.pitcher.movement);
        let ctx = ctx.with_batted_ball(batted_ball);
        let modifier = self.pipeline.combined(ModifierCategory::Babip, &ctx);
        clamp_probability(base * skill.exp() * modifier).min(0.95)
    }

    /// `[single, double, triple]` weights for a hit of this type.
    fn hit_type_weights(&self, ctx: &ModifierContext, batted_ball: BattedBall) -> [f64; 3] {
        let league = &self.config.league;
        let (double, triple) = match batted_ball {
            BattedBall::Ground => league.xbh_ground,
            BattedBall::Fly => league.xbh_fly,
            BattedBall::Line => league.xbh_line,
            BattedBall::Popup => (0.0, 0.0),
        };
        let speed = attr_delta(ctx.batter.speed);
        // Pulled balls find the line for doubles; triples come from the opposite-field gap.
        let pull = ctx.batter.pull_tendency() - 0.5;
        let double = double
            * ctx.park.double_factor
            * (0.10 * attr_delta(ctx.batter.power) + 0.80 * pull).exp();
        let triple = triple * ctx.park.triple_factor * (0.45 * speed - 1.20 * pull).exp();
        let (xbh, _) = probability::with_remainder([double, triple], 0.05);
        [1.0 - xbh[0] - xbh[1], xbh[0], xbh[1]]
    }

    fn error_probability(&self, ctx: &ModifierContext, batted_ball: BattedBall) -> f64 {
        let league = &self.config.league;
        let base = match batted_ball {
            BattedBall::Ground => league.error_ground,
            BattedBall::Fly => league.error_fly,
            BattedBall::Line => league.error_line,
            BattedBall::Popup => league.error_popup,
        };
        let d = (ctx.defense_rating - 400.0) / 100.0;
        clamp_probability(base * (-0.30 * d).exp())
    }

    fn double_play_probability(&self, input: &PaInput, batted_ball: BattedBall) -> f64 {
        let s = &input.ctx.situation;
        let force_at_second = s.runners & 0b001 != 0;
        let ground = batted_ball == BattedBall::Ground;
        if !ground || !force_at_second || s.outs >= 2 || input.runner_in_motion {
            return 0.0;
        }
        let speed = attr_delta(input.ctx.batter.speed);
        clamp_probability(self.config.league.double_play * (-0.25 * speed).exp())
    }

    fn sacrifice_fly_probability(&self, input: &PaInput, batted_ball: BattedBall) -> f64 {
        let s = &input.ctx.situation;
        if batted_ball != BattedBall::Fly || s.runners & 0b100 == 0 || s.outs >= 2 {
            return 0.0;
        }
        match input.runner_speeds[2].map(SpeedTier::from_speed).unwrap_or(SpeedTier::Average) {
            SpeedTier::Slow => 0.55,
            SpeedTier::Average => 0.70,
            SpeedTier::Fast => 0.82,
        }
    }

    pub fn resolve(&self, input: &PaInput, gen: Generator) -> (PaResult, Generator) {
        let adjusted = clutch_adjusted(input.ctx.batter, input.ctx.situation.leverage);
        let ctx = ModifierContext { batter: &adjusted, ..input.ctx };
        let input = PaInput { ctx, ..*input };

        let stage_one = self.stage_one(&ctx);
        let (idx, gen) = gen.choose_weighted(&stage_one);
        let non_contact = match idx {
            0 => Some(PaOutcome::Strikeout),
            1 => Some(PaOutcome::Walk),
            2 => Some(PaOutcome::HitByPitch),
            3 => Some(PaOutcome::HomeRun),
            _ => None,
        };
        if let Some(outcome) = non_contact {
            let pitches = self.pitch_count(&ctx, outcome);
            let result = PaResult { outcome, batted_ball: None, pitches };
            return (result, gen);
        }

        let mix = self.batted_ball_mix(&ctx);
        let (bb_idx, gen) = gen.choose_weighted(&mix);
        let batted_ball = BattedBall::ALL[bb_idx.min(3)];

        let (hit, gen) = gen.chance(self.hit_probability(&ctx, batted_ball));
        let (outcome, gen) = if hit {
            let (kind, gen) = gen.choose_weighted(&self.hit_type_weights(&ctx, batted_ball));
            let outcome = match kind {
                0 => PaOutcome::Single,
                1 => PaOutcome::Double,
                _ => PaOutcome::Triple,
            };
            (outcome, gen)
        } else {
            let (u, gen) = gen.next_f64();
            (self.out_branch(&input, batted_ball, u), gen)
        };

        let pitches = self.pitch_count(&ctx, outcome);
        let result = PaResult { outcome, batted_ball: Some(batted_ball), pitches };
        (result, gen)
    }

    /// Error check first; the remaining mass is rescaled for the double-play
    /// or sacrifice-fly branch.
    fn out_branch(&self, input: &PaInput, batted_ball: BattedBall, u: f64) -> PaOutcome {
        let error = self.error_probability(&input.ctx, batted_ball);
        if u < error {
            return PaOutcome::ReachedOnError;
        }
        let rest = if error < 1.0 { (u - error) / (1.0 - error) } else { 0.0 };
        if rest < self.double_play_probability(input, batted_ball) {
            return PaOutcome::DoublePlay;
        }
        if rest < self.sacrifice_fly_probability(input, batted_ball) {
            return PaOutcome::SacrificeFly;
        }
        match batted_ball {
            BattedBall::Ground => PaOutcome::GroundOut,
            BattedBall::Fly => PaOutcome::FlyOut,
            BattedBall::Line => PaOutcome::LineOut,
            BattedBall::Popup => PaOutcome::PopOut,
        }
    }

    /// Deterministic pitch count for a finished plate appearance.
    pub fn pitch_count(&self, ctx: &ModifierContext, outcome: PaOutcome) -> u32 {
        let base = match outcome {
            PaOutcome::Strikeout => 4.8,
            PaOutcome::Walk => 5.6,
            PaOutcome::HitByPitch => 3.2,
            PaOutcome::HomeRun => 3.4,
            _ => 3.3,
        };
        let pitches =
            base + 0.3 * attr_delta(ctx.batter.eye) - 0.2 * attr_delta(ctx.pitcher.command);
        pitches.round().max(1.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::modifiers::test_support::Fixture;
    use crate::models::player::{HitterAttributes, PitcherAttributes};

    fn input(ctx: ModifierContext<'_>) -> PaInput<'_> {
        PaInput { ctx, runner_speeds: [None; 3], runner_in_motion: false }
    }

    #[test]
    fn test_stage_one_sums_to_one_with_floor() {
        let resolver = PlateAppearanceResolver::new(&EngineConfig::default());
        let mut fx = Fixture::average();
        fx.batter = HitterAttributes::uniform(550);
        fx.pitcher = PitcherAttributes::uniform(100);
        let stage = resolver.stage_one(&fx.ctx());
        assert!((stage.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(stage[4] >= 0.35 - 1e-9);
    }

    #[test]
    fn test_better_stuff_means_more_strikeouts() {
        let resolver = PlateAppearanceResolver::new(&EngineConfig::default());
        let mut fx = Fixture::average();
        let base = resolver.stage_one(&fx.ctx())[0];
        fx.pitcher.stuff = 530;
        assert!(resolver.stage_one(&fx.ctx())[0] > base);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = PlateAppearanceResolver::new(&EngineConfig::default());
        let fx = Fixture::average();
        let ctx = fx.ctx();
        let (a, ga) = resolver.resolve(&input(ctx), Generator::create(17));
        let (b, gb) = resolver.resolve(&input(ctx), Generator::create(17));
        assert_eq!(a, b);
        assert_eq!(ga, gb);
    }

    #[test]
    fn test_no_double_play_without_force() {
        let resolver = PlateAppearanceResolver::new(&EngineConfig::default());
        let fx = Fixture::average();
        let mut ctx = fx.ctx();
        ctx.situation.runners = 0b001;
        let mut pa = input(ctx);
        assert!(resolver.double_play_probability(&pa, BattedBall::Ground) > 0.3);
        pa.runner_in_motion = true;
        assert_eq!(resolver.double_play_probability(&pa, BattedBall::Ground), 0.0);
        pa.runner_in_motion = false;
        pa.ctx.situation.outs = 2;
        assert_eq!(resolver.double_play_probability(&pa, BattedBall::Ground), 0.0);
    }

    #[test]
    fn test_out_branch_error_comes_first() {
        let resolver = PlateAppearanceResolver::new(&EngineConfig::default());
        let fx = Fixture::average();
        let pa = input(fx.ctx());
        assert_eq!(resolver.out_branch(&pa, BattedBall::Ground, 0.0), PaOutcome::ReachedOnError);
        assert_eq!(resolver.out_branch(&pa, BattedBall::Ground, 0.5), PaOutcome::GroundOut);
        assert_eq!(resolver.out_branch(&pa, BattedBall::Popup, 0.99), PaOutcome::PopOut);
    }

    #[test]
    fn test_sacrifice_fly_depends_on_runner_speed() {
        let resolver = PlateAppearanceResolver::new(&EngineConfig::default());
        let fx = Fixture::average();
        let mut ctx = fx.ctx();
        ctx.situation.runners = 0b100;
        let mut pa = input(ctx);
        pa.runner_speeds[2] = Some(150);
        let slow = resolver.sacrifice_fly_probability(&pa, BattedBall::Fly);
        pa.runner_speeds[2] = Some(480);
        let fast = resolver.sacrifice_fly_probability(&pa, BattedBall::Fly);
        assert!(fast > slow);
        assert_eq!(resolver.sacrifice_fly_probability(&pa, BattedBall::Ground), 0.0);
    }

    #[test]
    fn test_outcome_distribution_is_plausible() {
        let resolver = PlateAppearanceResolver::new(&EngineConfig::default());
        let fx = Fixture::average();
        let ctx = fx.ctx();
        let mut gen = Generator::create(2024);
        let (mut k, mut hits, mut hr) = (0u32, 0u32, 0u32);
        let n = 20_000;
        for _ in 0..n {
            let (r, next) = resolver.resolve(&input(ctx), gen);
            gen = next;
            match r.outcome {
                PaOutcome::Strikeout => k += 1,
                PaOutcome::HomeRun => {
                    hr += 1;
                    hits += 1
                }
                o if o.is_hit() => hits += 1,
                _ => {}
            }
        }
        let k_rate = f64::from(k) / f64::from(n);
        let hr_rate = f64::from(hr) / f64::from(n);
        let hit_rate = f64::from(hits) / f64::from(n);
        assert!((0.17..0.28).contains(&k_rate), "k {}", k_rate);
        assert!((0.015..0.05).contains(&hr_rate), "hr {}", hr_rate);
        assert!((0.17..0.27).contains(&hit_rate), "hits {}", hit_rate);
    }

    #[test]
    fn test_pull_hitter_trades_triples_for_doubles() {
        let resolver = PlateAppearanceResolver::new(&EngineConfig::default());
        let mut fx = Fixture::average();
        fx.batter.contact = 550;
        let spray = resolver.hit_type_weights(&fx.ctx(), BattedBall::Line);
        fx.batter.contact = 100;
        assert!(fx.batter.pull_tendency() > 0.6);
        let pull = resolver.hit_type_weights(&fx.ctx(), BattedBall::Line);
        assert!(pull[1] > spray[1], "doubles {:?} vs {:?}", pull, spray);
        assert!(pull[2] < spray[2], "triples {:?} vs {:?}", pull, spray);
        assert!((pull.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pitch_count_floor() {
        let resolver = PlateAppearanceResolver::new(&EngineConfig::default());
        let mut fx = Fixture::average();
        fx.batter.eye = 0;
        fx.pitcher.command = 550;
        assert!(resolver.pitch_count(&fx.ctx(), PaOutcome::GroundOut) >= 1);
    }
}
