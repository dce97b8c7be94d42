//! Half-inning loop and box-score accumulation for a single game.
//!
//! The generator is created from the plan's seed and threaded through every
//! decision in a fixed order: weather, umpire, then for each batter the
//! pitching change check, pinch runner, steal, wild pitch, pinch hitter,
//! intentional walk, bunt, hit-and-run, alignment and finally the plate
//! appearance itself.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, trace};

use crate::engine::baserunning::{self, BaseSpeeds, Destination, MarkovState, Transition, SECOND};
use crate::engine::config::EngineConfig;
use crate::engine::modifiers::situational::leverage_index;
use crate::engine::modifiers::{Alignment, ModifierContext, PitcherUsage, Situation};
use crate::engine::pitching::{
    self, evaluate_status, is_save_situation, select_reliever, should_pull, BullpenSituation,
    OutingSnapshot, ReliefCandidate,
};
use crate::engine::plate_appearance::{PaInput, PaOutcome, PlateAppearanceResolver};
use crate::engine::rng::Generator;
use crate::engine::tactics::{
    self, bunt, hit_and_run, intentional_walk, steal, substitution, wild_pitch, BatteryError,
    BenchOption, BuntOutcome,
};
use crate::error::Result;
use crate::models::box_score::{BoxScore, Decision, LineScore, PitcherGameStats, PlayEvent};
use crate::models::park::{ParkFactors, UmpireProfile, Weather};
use crate::models::player::{Hand, HitterAttributes, PitcherAttributes, Player, PlayerId};
use crate::models::{GameResult, League, TeamId, TeamSide};

use super::context::GameContext;
use super::decisions::{self, DecisionInput, DecisionOutcome};
use super::lineup::{self, TeamSetup};
use super::team_state::{RunnerInfo, TeamGameState};

/// Reliever available for this game and team games since the last outing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BullpenArm {
    pub id: PlayerId,
    pub games_rest: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPlan {
    pub setup: TeamSetup,
    pub starter: PlayerId,
    /// Rested relievers only.
    pub bullpen: Vec<BullpenArm>,
    pub bullpen_cursor: usize,
}

impl TeamPlan {
    /// First starter and a fully rested bullpen.
    pub fn fresh(setup: TeamSetup) -> Self {
        let starter =
            setup.rotation.first().or_else(|| setup.bullpen.first()).copied().unwrap_or_default();
        let bullpen = setup
            .bullpen
            .iter()
            .filter(|id| **id != starter)
            .map(|id| BullpenArm { id: *id, games_rest: None })
            .collect();
        Self { setup, starter, bullpen, bullpen_cursor: 0 }
    }
}

/// Everything needed to play one game deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePlan {
    pub game_id: u64,
    pub date: NaiveDate,
    pub seed: u64,
    pub away: TeamPlan,
    pub home: TeamPlan,
    pub park: ParkFactors,
}

impl GamePlan {
    /// Plan for a standalone game with rested staffs.
    pub fn standalone(
        league: &League,
        game_id: u64,
        date: NaiveDate,
        seed: u64,
        home_team_id: TeamId,
        away_team_id: TeamId,
    ) -> Result<GamePlan> {
        let home = TeamPlan::fresh(TeamSetup::build(league, home_team_id)?);
        let away = TeamPlan::fresh(TeamSetup::build(league, away_team_id)?);
        Ok(GamePlan { game_id, date, seed, away, home, park: league.park_for(home_team_id) })
    }

    pub fn team(&self, side: TeamSide) -> &TeamPlan {
        match side {
            TeamSide::Away => &self.away,
            TeamSide::Home => &self.home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayKind {
    PlateAppearance { outcome: PaOutcome },
    IntentionalWalk,
    Bunt { outcome: BuntOutcome },
    StolenBase { from: u8 },
    CaughtStealing { from: u8 },
    WildPitch,
    PassedBall,
    PitchingChange { replaced: PlayerId },
    PinchHitter { replaced: PlayerId },
    PinchRunner { replaced: PlayerId },
    DefensiveSubstitution { replaced: PlayerId },
    MannedRunner { runner: PlayerId },
}

/// Plays games against a fixed roster snapshot and configuration.
pub struct GameEngine<'a> {
    players: &'a BTreeMap<PlayerId, Player>,
    config: &'a EngineConfig,
    resolver: PlateAppearanceResolver,
    fallback_hitter: HitterAttributes,
    fallback_pitcher: PitcherAttributes,
}

impl<'a> GameEngine<'a> {
    pub fn new(players: &'a BTreeMap<PlayerId, Player>, config: &'a EngineConfig) -> Self {
        Self {
            players,
            config,
            resolver: PlateAppearanceResolver::new(config),
            fallback_hitter: HitterAttributes::league_average(),
            fallback_pitcher: PitcherAttributes::league_average(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    pub fn simulate(&self, plan: &GamePlan) -> GameResult {
        let span = debug_span!("game", game_id = plan.game_id);
        let _guard = span.enter();

        let gen = Generator::create(plan.seed);
        let (weather, gen) = Weather::generate(&plan.park, gen);
        let (umpire, gen) = UmpireProfile::generate(gen);

        let mut sim = GameSim::new(self, plan, weather, umpire);
        let _gen = sim.play(gen);
        let result = sim.into_result();
        debug!(
            away = result.away_team_id,
            home = result.home_team_id,
            away_score = result.away_score,
            home_score = result.home_score,
            innings = result.innings,
            walk_off = result.walk_off,
            "game final"
        );
        result
    }

    fn hitter(&self, id: PlayerId) -> &HitterAttributes {
        self.players.get(&id).and_then(Player::hitter).unwrap_or(&self.fallback_hitter)
    }

    fn pitcher(&self, id: PlayerId) -> &PitcherAttributes {
        self.players.get(&id).and_then(Player::pitcher).unwrap_or(&self.fallback_pitcher)
    }

    fn bats(&self, id: PlayerId) -> Hand {
        self.players.get(&id).map(|p| p.bats).unwrap_or(Hand::Right)
    }

    fn throws(&self, id: PlayerId) -> Hand {
        self.players.get(&id).map(|p| p.throws).unwrap_or(Hand::Right)
    }
}

/// Play one game. Convenience wrapper over [`GameEngine`].
pub fn simulate_game(plan: &GamePlan, league: &League, config: &EngineConfig) -> GameResult {
    GameEngine::new(&league.players, config).simulate(plan)
}

#[derive(Debug, Clone, Copy, Default)]
struct HalfState {
    bases: MarkovState,
    runners: [Option<RunnerInfo>; 3],
    runs: u32,
    /// Set by a two-out error: nothing else scored this half is earned.
    unearned_mode: bool,
}

struct GameSim<'e, 'a> {
    eng: &'e GameEngine<'a>,
    plan: &'e GamePlan,
    ctx: GameContext,
    teams: [TeamGameState; 2],
    line_score: LineScore,
    hits: [u32; 2],
    errors: [u32; 2],
    left_on_base: [u32; 2],
    weather: Weather,
    umpire: UmpireProfile,
    innings_played: u8,
    ended_in_bottom: bool,
    plays: Option<Vec<PlayEvent>>,
}

impl<'e, 'a> GameSim<'e, 'a> {
    fn new(
        eng: &'e GameEngine<'a>,
        plan: &'e GamePlan,
        weather: Weather,
        umpire: UmpireProfile,
    ) -> Self {
        let teams = [
            TeamGameState::new(&plan.away, TeamSide::Away),
            TeamGameState::new(&plan.home, TeamSide::Home),
        ];
        let plays = eng.config.rules.record_play_by_play.then(Vec::new);
        let mut sim = Self {
            eng,
            plan,
            ctx: GameContext::new(),
            teams,
            line_score: LineScore::default(),
            hits: [0; 2],
            errors: [0; 2],
            left_on_base: [0; 2],
            weather,
            umpire,
            innings_played: 0,
            ended_in_bottom: false,
            plays,
        };
        sim.refresh_defense(TeamSide::Away);
        sim.refresh_defense(TeamSide::Home);
        sim
    }

    fn cfg(&self) -> &'e EngineConfig {
        self.eng.config
    }

    fn team(&self, side: TeamSide) -> &TeamGameState {
        &self.teams[side.index()]
    }

    fn team_mut(&mut self, side: TeamSide) -> &mut TeamGameState {
        &mut self.teams[side.index()]
    }

    fn tactics_enabled(&self) -> bool {
        self.cfg().tactics.enabled
    }

    fn refresh_defense(&mut self, side: TeamSide) {
        let eng = self.eng;
        let team = self.team(side);
        let slots: Vec<_> = team
            .positions
            .iter()
            .zip(team.lineup.iter())
            .map(|(pos, id)| (*pos, eng.hitter(*id).defense_rating()))
            .collect();
        self.team_mut(side).defense_rating = lineup::defense_rating(&slots);
    }

    fn play(&mut self, mut gen: Generator) -> Generator {
        let rules = self.cfg().rules.clone();
        loop {
            self.innings_played = self.ctx.inning;
            self.ctx.start_half();
            gen = self.play_half(gen);
            self.ctx.end_half();

            let inning = self.ctx.inning;
            if inning >= rules.regulation_innings && self.ctx.lead(TeamSide::Home) > 0 {
                break;
            }

            self.ctx.start_half();
            gen = self.play_half(gen);
            self.ctx.end_half();

            if inning >= rules.regulation_innings && self.ctx.lead(TeamSide::Home) != 0 {
                self.ended_in_bottom = true;
                break;
            }
            if inning >= rules.max_innings {
                break;
            }
        }
        self.ctx.finish();
        gen
    }

    fn walk_off_reached(&self) -> bool {
        self.ctx.batting_side() == TeamSide::Home
            && self.ctx.inning >= self.cfg().rules.regulation_innings
            && self.ctx.lead(TeamSide::Home) > 0
    }

    fn play_half(&mut self, mut gen: Generator) -> Generator {
        let bat = self.ctx.batting_side();
        let fld = bat.opponent();
        let mut half = HalfState::default();

        if self.tactics_enabled() {
            self.defensive_substitution(fld);
        }
        self.maybe_change_pitcher(&half);
        if self.ctx.inning >= self.cfg().rules.manned_runner_inning {
            self.place_manned_runner(&mut half);
        }

        while !half.bases.inning_over() && !self.walk_off_reached() {
            self.maybe_change_pitcher(&half);
            if self.tactics_enabled() {
                self.maybe_pinch_run(&mut half);
                gen = self.maybe_steal(&mut half, gen);
                if half.bases.inning_over() || self.walk_off_reached() {
                    continue;
                }
                gen = self.maybe_battery_error(&mut half, gen);
                if half.bases.inning_over() || self.walk_off_reached() {
                    continue;
                }
                self.maybe_pinch_hit(&half);
                if self.intentional_walk_called(&half) {
                    self.intentional_walk(&mut half);
                    continue;
                }
                if self.bunt_called(&half) {
                    gen = self.bunt(&mut half, gen);
                    continue;
                }
            }
            gen = self.plate_appearance(&mut half, gen);
        }

        self.line_score.push(bat, half.runs);
        let pitching = self.cfg().pitching.clone();
        self.team_mut(fld).pitcher.momentum.end_inning(&pitching);
        gen
    }

    fn current_pitcher(&self) -> PlayerId {
        self.team(self.ctx.fielding_side()).pitcher.player_id
    }

    fn place_manned_runner(&mut self, half: &mut HalfState) {
        let bat = self.ctx.batting_side();
        let slot = self.ctx.previous_slot(bat);
        let runner = self.team(bat).lineup[slot];
        let responsible = self.current_pitcher();
        half.runners[1] = Some(RunnerInfo { player_id: runner, responsible, earned: false });
        half.bases = MarkovState::new(SECOND, 0);
        self.record_play(None, PlayKind::MannedRunner { runner }, 0, half);
    }

    // Pitching changes

    fn maybe_change_pitcher(&mut self, half: &HalfState) {
        let eng = self.eng;
        let cfg = &eng.config.pitching;
        let fld = self.ctx.fielding_side();
        let bat = fld.opponent();
        let inning = self.ctx.inning;
        let team = self.team(fld);
        let app = &team.pitcher;
        let snapshot = OutingSnapshot {
            pitches: app.line.pitches,
            batters_faced: app.line.batters_faced,
            outs_recorded: app.line.outs,
            entry_inning: app.entry_inning,
            inning,
            is_starter: app.order == 0,
            is_closer: app.is_closer,
        };
        let status = evaluate_status(&snapshot, eng.pitcher(app.player_id), cfg);
        if !should_pull(status, half.bases.runners != 0) || team.bullpen.is_empty() {
            return;
        }

        let fielding_lead = self.ctx.lead(fld);
        let save_situation = is_save_situation(fielding_lead, half.bases.runner_count(), cfg);
        let batting = self.team(bat);
        let cursor = self.ctx.current_slot(bat);
        let upcoming = [0, 1, 2].map(|k| eng.bats(batting.lineup[(cursor + k) % 9]));
        let candidates: Vec<ReliefCandidate<'_>> = team
            .bullpen
            .iter()
            .map(|arm| ReliefCandidate {
                id: arm.id,
                attrs: eng.pitcher(arm.id),
                throws: eng.throws(arm.id),
                is_closer: team.closer == Some(arm.id),
                games_rest: arm.games_rest,
            })
            .collect();
        let situation = BullpenSituation { save_situation, upcoming, cursor: team.bullpen_cursor };
        let Some(reliever) = select_reliever(&candidates, &situation) else {
            return;
        };

        let replaced = app.player_id;
        debug!(
            team = team.team_id,
            replaced,
            reliever,
            inning,
            pitches = app.line.pitches,
            "pitching change"
        );
        self.team_mut(fld).change_pitcher(reliever, inning, fielding_lead, save_situation);
        self.record_play(None, PlayKind::PitchingChange { replaced }, 0, half);
    }

    // Substitutions

    fn bench_options(&self, side: TeamSide) -> Vec<BenchOption<'e>> {
        let eng = self.eng;
        self.team(side)
            .bench
            .iter()
            .map(|id| BenchOption { id: *id, attrs: eng.hitter(*id), bats: eng.bats(*id) })
            .collect()
    }

    fn defensive_substitution(&mut self, fld: TeamSide) {
        let eng = self.eng;
        let bench = self.bench_options(fld);
        if bench.is_empty() {
            return;
        }
        let inning = self.ctx.inning;
        let lead = self.ctx.lead(fld);
        let team = self.team(fld);
        let choice = team.lineup.iter().enumerate().find_map(|(slot, id)| {
            if team.positions[slot].defensive_weight() <= 0.0 {
                return None;
            }
            let tactics = &eng.config.tactics;
            substitution::defensive_sub_choice(eng.hitter(*id), &bench, inning, lead, tactics)
                .map(|incoming| (slot, *id, incoming))
        });
        if let Some((slot, replaced, incoming)) = choice {
            if self.team_mut(fld).substitute(slot, incoming).success {
                self.refresh_defense(fld);
                let kind = PlayKind::DefensiveSubstitution { replaced };
                self.record_play(None, kind, 0, &HalfState::default());
            }
        }
    }

    fn maybe_pinch_run(&mut self, half: &mut HalfState) {
        let eng = self.eng;
        let bat = self.ctx.batting_side();
        let slowest = half
            .runners
            .iter()
            .enumerate()
            .filter_map(|(base, r)| r.map(|r| (base, r)))
            .min_by_key(|(base, r)| (eng.hitter(r.player_id).speed, *base));
        let Some((base, runner)) = slowest else {
            return;
        };
        let bench = self.bench_options(bat);
        let speed = eng.hitter(runner.player_id).speed;
        let (inning, lead) = (self.ctx.inning, self.ctx.lead(bat));
        let choice =
            substitution::pinch_run_choice(speed, &bench, inning, lead, &eng.config.tactics);
        let (Some(incoming), Some(slot)) = (choice, self.team(bat).slot_of(runner.player_id)) else {
            return;
        };
        if self.team_mut(bat).substitute(slot, incoming).success {
            half.runners[base] = Some(RunnerInfo { player_id: incoming, ..runner });
            self.refresh_defense(bat);
            self.record_play(None, PlayKind::PinchRunner { replaced: runner.player_id }, 0, half);
        }
    }

    fn maybe_pinch_hit(&mut self, half: &HalfState) {
        let eng = self.eng;
        let bat = self.ctx.batting_side();
        let slot = self.ctx.current_slot(bat);
        let incumbent = self.team(bat).lineup[slot];
        let bench = self.bench_options(bat);
        let choice = substitution::pinch_hit_choice(
            eng.hitter(incumbent),
            eng.bats(incumbent),
            &bench,
            eng.throws(self.current_pitcher()),
            self.ctx.inning,
            self.ctx.lead(bat),
            &eng.config.tactics,
        );
        if let Some(incoming) = choice {
            if self.team_mut(bat).substitute(slot, incoming).success {
                self.refresh_defense(bat);
                let kind = PlayKind::PinchHitter { replaced: incumbent };
                self.record_play(Some(incoming), kind, 0, half);
            }
        }
    }

    // Between-pitch events

    fn maybe_steal(&mut self, half: &mut HalfState, gen: Generator) -> Generator {
        let eng = self.eng;
        let Some(from) = steal::steal_candidate(half.bases) else {
            return gen;
        };
        let Some(runner) = half.runners[usize::from(from - 1)] else {
            return gen;
        };
        let bat = self.ctx.batting_side();
        let fld = bat.opponent();
        let runner_attrs = eng.hitter(runner.player_id);
        let inputs = steal::StealInputs {
            state: half.bases,
            from,
            runner_speed: runner_attrs.speed,
            runner_iq: runner_attrs.baserunning_iq,
            pitcher_hold: eng.pitcher(self.current_pitcher()).hold_runners,
            catcher_arm: self.team(fld).catcher().map(|c| eng.hitter(c).arm_strength),
            batting_lead: self.ctx.lead(bat),
        };
        let (attempt, gen) = steal::consider_steal(&inputs, &eng.config.tactics, gen);
        let Some(attempt) = attempt else {
            return gen;
        };

        let hand = eng.throws(self.current_pitcher());
        let slot = self.team(bat).slot_of(runner.player_id).unwrap_or(0);
        self.team_mut(bat).batting_mut(runner.player_id, slot).record(hand, |l| {
            if attempt.success {
                l.stolen_bases += 1;
            } else {
                l.caught_stealing += 1;
            }
        });
        let t = baserunning::steal(half.bases, from, attempt.success);
        self.apply_transition(half, &t, None, false, false);
        let kind = if attempt.success {
            PlayKind::StolenBase { from }
        } else {
            PlayKind::CaughtStealing { from }
        };
        self.record_play(None, kind, 0, half);
        gen
    }

    fn maybe_battery_error(&mut self, half: &mut HalfState, gen: Generator) -> Generator {
        let eng = self.eng;
        let fld = self.ctx.fielding_side();
        let catcher = self.team(fld).catcher().map(|c| eng.hitter(c));
        let pitcher = eng.pitcher(self.current_pitcher());
        let (event, gen) =
            wild_pitch::check_battery_error(half.bases, pitcher, catcher, &eng.config.tactics, gen);
        let Some(event) = event else {
            return gen;
        };
        if event == BatteryError::WildPitch {
            self.team_mut(fld).pitcher.line.wild_pitches += 1;
        }
        let t = baserunning::advance_all_one(half.bases);
        let runs = self.apply_transition(half, &t, None, false, event == BatteryError::PassedBall);
        let kind = match event {
            BatteryError::WildPitch => PlayKind::WildPitch,
            BatteryError::PassedBall => PlayKind::PassedBall,
        };
        self.record_play(None, kind, runs, half);
        gen
    }

    // Plate appearances

    fn intentional_walk_called(&self, half: &HalfState) -> bool {
        let eng = self.eng;
        let bat = self.ctx.batting_side();
        let team = self.team(bat);
        let batter = eng.hitter(team.lineup[self.ctx.current_slot(bat)]);
        let on_deck = eng.hitter(team.lineup[self.ctx.on_deck_slot(bat)]);
        intentional_walk::should_walk(
            half.bases,
            self.ctx.inning,
            batter.offense_rating(),
            on_deck.offense_rating(),
            &eng.config.tactics,
        )
    }

    fn intentional_walk(&mut self, half: &mut HalfState) {
        let bat = self.ctx.batting_side();
        let slot = self.ctx.current_slot(bat);
        let batter = self.team(bat).lineup[slot];
        let play = baserunning::walk(half.bases);
        let info = self.batter_info(batter, true);
        let runs = self.apply_transition(half, &play, Some(info), false, false);

        let hand = self.eng.throws(self.current_pitcher());
        self.team_mut(bat).batting_mut(batter, slot).record(hand, |l| {
            l.pa += 1;
            l.walks += 1;
            l.intentional_walks += 1;
            l.rbi += runs;
        });
        let fld = bat.opponent();
        let pitching = self.cfg().pitching.clone();
        let toughness = self.eng.pitcher(self.current_pitcher()).mental_toughness;
        let app = &mut self.team_mut(fld).pitcher;
        app.line.batters_faced += 1;
        app.line.pitches += 4;
        app.line.walks += 1;
        app.line.intentional_walks += 1;
        app.momentum.record_baserunner(toughness, &pitching);

        self.record_play(Some(batter), PlayKind::IntentionalWalk, runs, half);
        self.ctx.advance_lineup(bat);
    }

    fn bunt_called(&self, half: &HalfState) -> bool {
        let bat = self.ctx.batting_side();
        let batter = self.team(bat).lineup[self.ctx.current_slot(bat)];
        let (inning, lead) = (self.ctx.inning, self.ctx.lead(bat));
        bunt::should_bunt(self.eng.hitter(batter), half.bases, inning, lead, &self.cfg().tactics)
    }

    fn bunt(&mut self, half: &mut HalfState, gen: Generator) -> Generator {
        let eng = self.eng;
        let bat = self.ctx.batting_side();
        let fld = bat.opponent();
        let slot = self.ctx.current_slot(bat);
        let batter = self.team(bat).lineup[slot];
        let (outcome, gen) = bunt::resolve_bunt(eng.hitter(batter), gen);
        let t = bunt::apply_bunt(half.bases, outcome);
        let info = self.batter_info(batter, true);
        let runs = self.apply_transition(half, &t, Some(info), false, false);

        let hand = eng.throws(self.current_pitcher());
        self.team_mut(bat).batting_mut(batter, slot).record(hand, |l| {
            l.pa += 1;
            l.rbi += runs;
            match outcome {
                BuntOutcome::Sacrifice => l.sac_bunts += 1,
                BuntOutcome::BuntHit => {
                    l.ab += 1;
                    l.hits += 1;
                    l.singles += 1;
                }
                _ => l.ab += 1,
            }
        });
        let pitching = self.cfg().pitching.clone();
        let toughness = eng.pitcher(self.current_pitcher()).mental_toughness;
        let app = &mut self.team_mut(fld).pitcher;
        app.line.batters_faced += 1;
        app.line.pitches += 3;
        if outcome == BuntOutcome::BuntHit {
            app.line.hits += 1;
            app.momentum.record_baserunner(toughness, &pitching);
            self.hits[bat.index()] += 1;
        }

        self.record_play(Some(batter), PlayKind::Bunt { outcome }, runs, half);
        self.ctx.advance_lineup(bat);
        gen
    }

    fn plate_appearance(&mut self, half: &mut HalfState, gen: Generator) -> Generator {
        let eng = self.eng;
        let plan = self.plan;
        let cfg = eng.config;
        let bat = self.ctx.batting_side();
        let fld = bat.opponent();
        let inning = self.ctx.inning;
        let slot = self.ctx.current_slot(bat);
        let batter_id = self.team(bat).lineup[slot];
        let on_deck_id = self.team(bat).lineup[self.ctx.on_deck_slot(bat)];
        let pitcher_id = self.current_pitcher();
        let pitcher = eng.pitcher(pitcher_id);
        let pitcher_hand = eng.throws(pitcher_id);
        let batting_lead = self.ctx.lead(bat);

        let runner_speeds = half.runners.map(|r| r.map(|r| eng.hitter(r.player_id).speed));
        let mut batter = *eng.hitter(batter_id);

        let (hit_and_run_on, gen) = match (self.tactics_enabled(), runner_speeds[0]) {
            (true, Some(speed)) => {
                hit_and_run::call_hit_and_run(half.bases, &batter, speed, &cfg.tactics, gen)
            }
            _ => (false, gen),
        };
        if hit_and_run_on {
            batter = hit_and_run::hit_and_run_batter(&batter);
        }
        let alignment = if self.tactics_enabled() {
            tactics::choose_alignment(&batter, half.bases, inning, -batting_lead, &cfg.tactics)
        } else {
            Alignment::default()
        };

        let app = &self.team(fld).pitcher;
        let raw_fatigue =
            pitching::fatigue::fatigue(app.line.pitches, pitcher.stamina, &cfg.pitching);
        let fatigue =
            pitching::fatigue::with_momentum(raw_fatigue, app.momentum.confidence, &cfg.pitching);
        let usage = PitcherUsage {
            pitches: app.line.pitches,
            batters_faced: app.line.batters_faced,
            times_through_order: app.line.batters_faced / 9 + 1,
            fatigue,
            is_starter: app.order == 0,
        };
        let situation = Situation {
            inning,
            outs: half.bases.outs,
            runners: half.bases.runners,
            batting_lead,
            is_home_batting: bat == TeamSide::Home,
            leverage: leverage_index(inning, half.bases.outs, half.bases.runners, batting_lead),
        };
        let catcher = self.team(fld).catcher().map(|c| eng.hitter(c));
        let ctx = ModifierContext {
            batter: &batter,
            batter_side: eng.bats(batter_id).batting_side_against(pitcher_hand),
            pitcher,
            pitcher_hand,
            on_deck: Some(eng.hitter(on_deck_id)),
            catcher,
            defense_rating: self.team(fld).defense_rating,
            park: &plan.park,
            weather: &self.weather,
            umpire: &self.umpire,
            usage,
            situation,
            alignment,
            batted_ball: None,
        };
        let input = PaInput { ctx, runner_speeds, runner_in_motion: hit_and_run_on };
        let (result, gen) = eng.resolver.resolve(&input, gen);
        let outcome = result.outcome;
        trace!(inning, batter = batter_id, pitcher = pitcher_id, ?outcome, "plate appearance");

        let before = half.bases;
        let (t, gen) = if hit_and_run_on && outcome == PaOutcome::Strikeout {
            (baserunning::strikeout_caught_stealing(before), gen)
        } else {
            let mut speeds = BaseSpeeds { batter: batter.speed, runners: runner_speeds };
            if hit_and_run_on {
                speeds.runners[0] = speeds.runners[0].map(|s| s.saturating_add(100).min(550));
            }
            baserunning::apply_outcome(before, outcome, &speeds, gen)
        };

        if outcome == PaOutcome::ReachedOnError {
            self.errors[fld.index()] += 1;
            if before.outs == 2 {
                half.unearned_mode = true;
            }
        }
        if hit_and_run_on && outcome == PaOutcome::Strikeout {
            if let Some(runner) = half.runners[0] {
                let runner_slot = self.team(bat).slot_of(runner.player_id).unwrap_or(0);
                self.team_mut(bat)
                    .batting_mut(runner.player_id, runner_slot)
                    .record(pitcher_hand, |l| l.caught_stealing += 1);
            }
        }

        let info = self.batter_info(batter_id, outcome != PaOutcome::ReachedOnError);
        let runs = self.apply_transition(
            half,
            &t,
            Some(info),
            outcome == PaOutcome::HomeRun,
            outcome == PaOutcome::ReachedOnError,
        );
        let rbi = match outcome {
            PaOutcome::DoublePlay | PaOutcome::ReachedOnError => 0,
            _ => runs,
        };

        self.team_mut(bat).batting_mut(batter_id, slot).record(pitcher_hand, |l| {
            l.pa += 1;
            l.rbi += rbi;
            if outcome.is_at_bat() {
                l.ab += 1;
            }
            match outcome {
                PaOutcome::Single => l.singles += 1,
                PaOutcome::Double => l.doubles += 1,
                PaOutcome::Triple => l.triples += 1,
                PaOutcome::HomeRun => l.home_runs += 1,
                PaOutcome::Walk => l.walks += 1,
                PaOutcome::HitByPitch => l.hit_by_pitch += 1,
                PaOutcome::Strikeout => l.strikeouts += 1,
                PaOutcome::SacrificeFly => l.sac_flies += 1,
                PaOutcome::DoublePlay => l.grounded_into_dp += 1,
                PaOutcome::ReachedOnError => l.reached_on_error += 1,
                _ => {}
            }
            if outcome.is_hit() {
                l.hits += 1;
            }
        });

        let reached = outcome.is_hit()
            || matches!(
                outcome,
                PaOutcome::Walk | PaOutcome::HitByPitch | PaOutcome::ReachedOnError
            );
        let toughness = pitcher.mental_toughness;
        let app = &mut self.team_mut(fld).pitcher;
        app.line.batters_faced += 1;
        app.line.pitches += result.pitches;
        match outcome {
            PaOutcome::Walk => app.line.walks += 1,
            PaOutcome::HitByPitch => app.line.hit_by_pitch += 1,
            PaOutcome::Strikeout => app.line.strikeouts += 1,
            PaOutcome::HomeRun => app.line.home_runs += 1,
            _ => {}
        }
        if outcome.is_hit() {
            app.line.hits += 1;
            self.hits[bat.index()] += 1;
        }
        if reached {
            self.team_mut(fld).pitcher.momentum.record_baserunner(toughness, &cfg.pitching);
        }

        self.record_play(Some(batter_id), PlayKind::PlateAppearance { outcome }, runs, half);
        self.ctx.advance_lineup(bat);
        gen
    }

    fn batter_info(&self, batter: PlayerId, earned: bool) -> RunnerInfo {
        RunnerInfo { player_id: batter, responsible: self.current_pitcher(), earned }
    }

    /// Runs the winning run needs in a walk-off, or `None` when every run counts.
    fn run_limit(&self, is_home_run: bool) -> Option<u32> {
        let bat = self.ctx.batting_side();
        let regulation = self.cfg().rules.regulation_innings;
        if bat != TeamSide::Home || is_home_run || self.ctx.inning < regulation {
            return None;
        }
        let deficit = -self.ctx.lead(TeamSide::Home);
        (deficit >= 0).then(|| deficit as u32 + 1)
    }

    /// Credit runs, move runners and charge outs. Returns the runs that counted.
    fn apply_transition(
        &mut self,
        half: &mut HalfState,
        t: &Transition,
        batter: Option<RunnerInfo>,
        is_home_run: bool,
        unearned_play: bool,
    ) -> u32 {
        let eng = self.eng;
        let pitching = &eng.config.pitching;
        let bat = self.ctx.batting_side();
        let fld = bat.opponent();
        let limit = self.run_limit(is_home_run);
        let pitcher_hand = eng.throws(self.current_pitcher());

        let info_at = |idx: usize| if idx == 0 { batter } else { half.runners[idx - 1] };

        let mut credited = 0u32;
        for idx in [3usize, 2, 1, 0] {
            if t.moves[idx] != Some(Destination::Scored) {
                continue;
            }
            if limit.is_some_and(|l| credited >= l) {
                break;
            }
            let Some(runner) = info_at(idx) else {
                continue;
            };
            credited += 1;
            let earned = runner.earned && !half.unearned_mode && !unearned_play;
            let slot = self.team(bat).slot_of(runner.player_id).unwrap_or(0);
            self.team_mut(bat)
                .batting_mut(runner.player_id, slot)
                .record(pitcher_hand, |l| l.runs += 1);
            if let Some(app) = self.team_mut(fld).appearance_mut(runner.responsible) {
                app.line.runs += 1;
                if earned {
                    app.line.earned_runs += 1;
                }
            }
        }

        let mut runners = [None; 3];
        for (idx, m) in t.moves.iter().enumerate() {
            if let Some(Destination::Base(b)) = m {
                if (1..=3).contains(b) {
                    runners[usize::from(*b - 1)] = info_at(idx);
                }
            }
        }

        let outs = t.state.outs.saturating_sub(half.bases.outs);
        if t.state.inning_over() {
            let stranded =
                t.moves.iter().filter(|m| matches!(m, Some(Destination::Stranded))).count() as u32;
            self.left_on_base[bat.index()] += stranded;
        }
        half.runners = runners;
        half.bases = t.state.with_runs(half.bases.runs_scored + credited);
        half.runs += credited;
        self.ctx.add_runs(bat, credited);

        let toughness = eng.pitcher(self.current_pitcher()).mental_toughness;
        let app = &mut self.team_mut(fld).pitcher;
        app.line.outs += u32::from(outs);
        if outs > 0 {
            app.momentum.record_out(outs, pitching);
        }
        app.momentum.record_runs(credited, toughness, pitching);
        credited
    }

    fn record_play(
        &mut self,
        batter: Option<PlayerId>,
        kind: PlayKind,
        runs: u32,
        half: &HalfState,
    ) {
        if self.plays.is_none() {
            return;
        }
        let event = PlayEvent {
            inning: self.ctx.inning,
            batting: self.ctx.batting_side(),
            batter,
            pitcher: self.current_pitcher(),
            kind,
            outs_after: half.bases.outs,
            runs,
            away_score: self.ctx.score[TeamSide::Away.index()],
            home_score: self.ctx.score[TeamSide::Home.index()],
        };
        if let Some(plays) = self.plays.as_mut() {
            plays.push(event);
        }
    }

    fn into_result(self) -> GameResult {
        let away_score = self.ctx.score[TeamSide::Away.index()];
        let home_score = self.ctx.score[TeamSide::Home.index()];
        let margin = away_score.abs_diff(home_score);
        let winner = match home_score.cmp(&away_score) {
            std::cmp::Ordering::Greater => Some(TeamSide::Home),
            std::cmp::Ordering::Less => Some(TeamSide::Away),
            std::cmp::Ordering::Equal => None,
        };

        let mut batting = Vec::new();
        let mut pitching = Vec::new();
        for team in &self.teams {
            batting.extend(team.batting.iter().cloned());
            let inputs: Vec<DecisionInput> = team
                .appearances()
                .map(|a| DecisionInput {
                    outs: a.line.outs,
                    runs_allowed: a.line.runs,
                    entered_in_save: a.entered_in_save,
                    entry_lead: a.entry_lead,
                    exit_lead: a.exit_lead,
                })
                .collect();
            let outcomes = match winner {
                Some(side) if side == team.side => decisions::winning_side(&inputs, margin),
                Some(_) => decisions::losing_side(&inputs),
                None => vec![DecisionOutcome::default(); inputs.len()],
            };
            for (app, outcome) in team.appearances().zip(outcomes) {
                let mut line = app.line;
                match outcome.decision {
                    Some(Decision::Win) => line.wins += 1,
                    Some(Decision::Loss) => line.losses += 1,
                    Some(Decision::Save) => line.saves += 1,
                    None => {}
                }
                line.holds += u32::from(outcome.hold);
                line.blown_saves += u32::from(outcome.blown_save);
                pitching.push(PitcherGameStats {
                    player_id: app.player_id,
                    team_id: team.team_id,
                    order: app.order,
                    line,
                    decision: outcome.decision,
                    hold: outcome.hold,
                    blown_save: outcome.blown_save,
                });
            }
        }

        let box_score = BoxScore {
            batting,
            pitching,
            line_score: self.line_score,
            hits: self.hits,
            errors: self.errors,
            left_on_base: self.left_on_base,
            weather: self.weather,
            umpire: self.umpire,
            play_by_play: self.plays,
        };
        GameResult {
            game_id: self.plan.game_id,
            date: self.plan.date,
            home_team_id: self.plan.home.setup.team_id,
            away_team_id: self.plan.away.setup.team_id,
            home_score,
            away_score,
            innings: self.innings_played,
            walk_off: self.ended_in_bottom && winner == Some(TeamSide::Home),
            forfeit: None,
            box_score,
        }
    }
}

/// Forfeit result: the charged side scores 0, the other `forfeit_runs`.
pub fn forfeit_result(
    game_id: u64,
    date: NaiveDate,
    home_team_id: TeamId,
    away_team_id: TeamId,
    charged: TeamSide,
    config: &EngineConfig,
) -> GameResult {
    let runs = config.rules.forfeit_runs;
    let (home_score, away_score) = match charged {
        TeamSide::Home => (0, runs),
        TeamSide::Away => (runs, 0),
    };
    GameResult {
        game_id,
        date,
        home_team_id,
        away_team_id,
        home_score,
        away_score,
        innings: 0,
        walk_off: false,
        forfeit: Some(charged),
        box_score: BoxScore::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::league_builder::demo_league;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    fn play(league: &League, config: &EngineConfig, seed: u64) -> GameResult {
        let plan = GamePlan::standalone(league, seed, date(), seed, 1, 2).unwrap();
        simulate_game(&plan, league, config)
    }

    #[test]
    fn test_same_seed_same_game() {
        let league = demo_league(2, 5);
        let config = EngineConfig::default();
        assert_eq!(play(&league, &config, 42), play(&league, &config, 42));
    }

    #[test]
    fn test_line_score_matches_final() {
        let league = demo_league(2, 5);
        let config = EngineConfig::default();
        for seed in 0..40 {
            let result = play(&league, &config, seed);
            let ls = &result.box_score.line_score;
            assert_eq!(ls.away.iter().sum::<u32>(), result.away_score);
            assert_eq!(ls.home.iter().sum::<u32>(), result.home_score);
            assert_eq!(ls.away.len(), result.innings as usize);
            assert!(result.innings >= config.rules.regulation_innings);
        }
    }

    #[test]
    fn test_walk_off_only_for_home_wins_in_the_bottom() {
        let league = demo_league(2, 5);
        let config = EngineConfig::default();
        for seed in 0..60 {
            let result = play(&league, &config, seed);
            let ls = &result.box_score.line_score;
            if result.walk_off {
                assert!(result.home_score > result.away_score);
                assert_eq!(ls.home.len(), ls.away.len());
                // The winning run ends the game, so the margin is at most four.
                assert!(result.home_score - result.away_score <= 4);
            }
            if ls.home.len() < ls.away.len() {
                assert!(!result.walk_off);
                assert!(result.home_score > result.away_score);
            }
        }
    }

    #[test]
    fn test_runs_charged_to_pitchers_match_opponent_score() {
        let league = demo_league(2, 9);
        let config = EngineConfig::default();
        for seed in 0..30 {
            let result = play(&league, &config, seed);
            let charged = |team: TeamId| -> (u32, u32) {
                result
                    .box_score
                    .pitching
                    .iter()
                    .filter(|p| p.team_id == team)
                    .fold((0, 0), |(r, er), p| (r + p.line.runs, er + p.line.earned_runs))
            };
            let (home_r, home_er) = charged(1);
            let (away_r, away_er) = charged(2);
            assert_eq!(home_r, result.away_score);
            assert_eq!(away_r, result.home_score);
            assert!(home_er <= home_r && away_er <= away_r);

            let batting = &result.box_score.batting;
            let scored: u32 =
                batting.iter().filter(|b| b.team_id == 1).map(|b| b.total.runs).sum();
            assert_eq!(scored, result.home_score);
        }
    }

    #[test]
    fn test_one_win_and_one_loss_per_decided_game() {
        let league = demo_league(2, 3);
        let config = EngineConfig::default();
        for seed in 0..30 {
            let result = play(&league, &config, seed);
            let pitching = &result.box_score.pitching;
            let count = |d: Decision| pitching.iter().filter(|p| p.decision == Some(d)).count();
            if result.is_tie() {
                assert_eq!(count(Decision::Win), 0);
            } else {
                assert_eq!(count(Decision::Win), 1);
                assert_eq!(count(Decision::Loss), 1);
                assert!(count(Decision::Save) <= 1);
            }
        }
    }

    #[test]
    fn test_fielding_outs_cover_every_inning() {
        let league = demo_league(2, 3);
        let config = EngineConfig::default();
        for seed in 0..20 {
            let result = play(&league, &config, seed);
            let pitching = &result.box_score.pitching;
            let outs_for = |team: TeamId| -> u32 {
                pitching.iter().filter(|p| p.team_id == team).map(|p| p.line.outs).sum()
            };
            let (away_outs, home_outs) = (outs_for(2), outs_for(1));
            // The road staff pitches every bottom half except a walk-off one.
            assert_eq!(home_outs, 3 * result.box_score.line_score.away.len() as u32);
            let bottoms = result.box_score.line_score.home.len() as u32;
            if result.walk_off {
                assert!(away_outs >= 3 * (bottoms - 1) && away_outs < 3 * bottoms);
            } else {
                assert_eq!(away_outs, 3 * bottoms);
            }
        }
    }

    #[test]
    fn test_play_by_play_recorded_on_request() {
        let league = demo_league(2, 3);
        let mut config = EngineConfig::default();
        assert!(play(&league, &config, 1).box_score.play_by_play.is_none());

        config.rules.record_play_by_play = true;
        let result = play(&league, &config, 1);
        let plays = result.box_score.play_by_play.as_ref().unwrap();
        let pas =
            plays.iter().filter(|p| matches!(p.kind, PlayKind::PlateAppearance { .. })).count();
        let batters: u32 = result.box_score.batting.iter().map(|b| b.total.pa).sum();
        assert!(pas > 50);
        assert!(pas as u32 <= batters);
        let last = plays.last().unwrap();
        assert_eq!((last.away_score, last.home_score), (result.away_score, result.home_score));
    }

    #[test]
    fn test_extra_innings_place_runner() {
        let league = demo_league(2, 3);
        let mut config = EngineConfig::default();
        config.rules.record_play_by_play = true;
        let extra = (0..200)
            .map(|seed| play(&league, &config, seed))
            .find(|r| r.innings > config.rules.regulation_innings);
        if let Some(result) = extra {
            let plays = result.box_score.play_by_play.unwrap();
            let manned = |p: &PlayEvent| matches!(p.kind, PlayKind::MannedRunner { .. });
            assert!(plays.iter().any(|p| p.inning == 10 && manned(p)));
            assert!(!plays.iter().any(|p| p.inning < 10 && manned(p)));
        }
    }

    #[test]
    fn test_forfeit_result_scores() {
        let config = EngineConfig::default();
        let r = forfeit_result(7, date(), 1, 2, TeamSide::Home, &config);
        assert_eq!((r.home_score, r.away_score), (0, 9));
        assert_eq!(r.innings, 0);
        assert_eq!(r.winner(), Some(2));
        assert_eq!(r.forfeit, Some(TeamSide::Home));
    }

    #[test]
    fn test_deterministic_tactics_still_completes() {
        let league = demo_league(2, 8);
        let config = EngineConfig::deterministic_tactics();
        let result = play(&league, &config, 11);
        let bunts_or_steals: u32 = result
            .box_score
            .batting
            .iter()
            .map(|b| b.total.sac_bunts + b.total.stolen_bases + b.total.caught_stealing)
            .sum();
        assert_eq!(bunts_or_steals, 0);
        assert!(result.box_score.batting.iter().all(|b| b.total.intentional_walks == 0));
    }
}
