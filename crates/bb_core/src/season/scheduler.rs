//! Regular-season driver.
//!
//! Games are planned and folded strictly in schedule order. Between those two
//! steps, runs of consecutive games with no team in common (a slate) may be
//! simulated in parallel: each game only sees its own `GamePlan`, so the
//! results do not depend on which thread plays them.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::engine::config::EngineConfig;
use crate::engine::game::{forfeit_result, GameEngine};
use crate::engine::rng::derive_seed;
use crate::error::{EngineError, Result};
use crate::models::{GameResult, League};

use super::schedule::{validate_schedule, ScheduleEntry};
use super::state::{PlannedGame, SeasonState};
use super::stats::{LeagueSummary, SeasonStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonProgress {
    pub completed: usize,
    pub total: usize,
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonResult {
    pub games: Vec<GameResult>,
    pub stats: SeasonStats,
    pub summary: LeagueSummary,
    /// Carry into the next invocation for a partial season.
    pub state: SeasonState,
    pub completed: usize,
    pub total: usize,
}

pub struct SeasonSimulator<'a> {
    league: &'a League,
    config: &'a EngineConfig,
    engine: GameEngine<'a>,
    base_seed: u64,
    schedule: Vec<ScheduleEntry>,
    state: SeasonState,
    stats: SeasonStats,
    results: Vec<GameResult>,
    plans: BTreeMap<u64, PlannedGame>,
    next: usize,
}

impl<'a> SeasonSimulator<'a> {
    pub fn new(
        league: &'a League,
        config: &'a EngineConfig,
        schedule: Vec<ScheduleEntry>,
        base_seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        validate_schedule(&schedule, league)?;
        Ok(Self {
            league,
            config,
            engine: GameEngine::new(&league.players, config),
            base_seed,
            schedule,
            state: SeasonState::new(),
            stats: SeasonStats::new(),
            results: Vec::new(),
            plans: BTreeMap::new(),
            next: 0,
        })
    }

    /// Resume from state saved by an earlier invocation.
    pub fn with_state(mut self, state: SeasonState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &SeasonState {
        &self.state
    }

    pub fn stats(&self) -> &SeasonStats {
        &self.stats
    }

    pub fn results(&self) -> &[GameResult] {
        &self.results
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.schedule.len()
    }

    pub fn simulate(&mut self) -> SeasonResult {
        self.simulate_with_progress(|_| ControlFlow::Continue(()))
    }

    /// Run the remaining schedule, calling `on_progress` after every
    /// `batch_size` completed games and once at the end. Returning
    /// `ControlFlow::Break` stops before the next game is started.
    pub fn simulate_with_progress<F>(&mut self, mut on_progress: F) -> SeasonResult
    where
        F: FnMut(&SeasonProgress) -> ControlFlow<()>,
    {
        let span = info_span!("season", seed = self.base_seed, games = self.schedule.len());
        let _guard = span.enter();
        info!(remaining = self.schedule.len() - self.next, "season started");

        let batch = self.config.scheduler.batch_size.max(1);
        while !self.is_finished() {
            let room = batch - self.next % batch;
            let slate = self.next_slate(room);
            self.play_slate(&slate);

            let progress = self.progress();
            if progress.completed % batch == 0 || self.is_finished() {
                info!(completed = progress.completed, total = progress.total, "batch complete");
                if on_progress(&progress).is_break() {
                    info!(completed = progress.completed, "season stopped early");
                    break;
                }
            }
        }
        self.snapshot()
    }

    fn progress(&self) -> SeasonProgress {
        SeasonProgress {
            completed: self.next,
            total: self.schedule.len(),
            last_date: self.results.last().map(|r| r.date),
        }
    }

    /// Consecutive entries from the cursor whose teams are all distinct.
    fn next_slate(&self, max: usize) -> Vec<ScheduleEntry> {
        let mut teams = BTreeSet::new();
        self.schedule[self.next..]
            .iter()
            .take(max)
            .take_while(|e| teams.insert(e.home_team_id) && teams.insert(e.away_team_id))
            .copied()
            .collect()
    }

    fn plan(&self, entry: &ScheduleEntry) -> PlannedGame {
        let seed = derive_seed(self.base_seed, entry.game_id);
        self.state.plan_game(
            self.league,
            self.config,
            entry.game_id,
            entry.date,
            seed,
            entry.home_team_id,
            entry.away_team_id,
        )
    }

    fn play(&self, planned: &PlannedGame) -> GameResult {
        match planned {
            PlannedGame::Play { plan } => self.engine.simulate(plan),
            PlannedGame::Forfeit { game_id, date, home_team_id, away_team_id, charged } => {
                forfeit_result(*game_id, *date, *home_team_id, *away_team_id, *charged, self.config)
            }
        }
    }

    fn play_slate(&mut self, slate: &[ScheduleEntry]) {
        // Teams in a slate are disjoint, so every plan can be drawn from the
        // state as it stands before the slate.
        let planned: Vec<PlannedGame> = slate.iter().map(|e| self.plan(e)).collect();
        let parallel = self.config.scheduler.parallel_slates && planned.len() > 1;
        let results: Vec<GameResult> = if parallel {
            planned.par_iter().map(|p| self.play(p)).collect()
        } else {
            planned.iter().map(|p| self.play(p)).collect()
        };

        for (planned, result) in planned.into_iter().zip(results) {
            self.state.record_game(&planned, &result);
            self.stats.fold(&result);
            self.plans.insert(planned.game_id(), planned);
            self.results.push(result);
            self.next += 1;
        }
    }

    /// Play a completed game again from its stored plan.
    pub fn replay_game(&self, game_id: u64) -> Result<GameResult> {
        let planned = self
            .plans
            .get(&game_id)
            .ok_or_else(|| {
                EngineError::InvalidSchedule(format!("game {} has not been played", game_id))
            })?;
        Ok(self.play(planned))
    }

    pub fn snapshot(&self) -> SeasonResult {
        SeasonResult {
            games: self.results.clone(),
            stats: self.stats.clone(),
            summary: self.stats.summary(),
            state: self.state.clone(),
            completed: self.next,
            total: self.schedule.len(),
        }
    }
}

/// Plays a whole schedule from a fresh state.
pub fn simulate_season(
    league: &League,
    config: &EngineConfig,
    schedule: Vec<ScheduleEntry>,
    base_seed: u64,
) -> Result<SeasonResult> {
    let mut sim = SeasonSimulator::new(league, config, schedule, base_seed)?;
    Ok(sim.simulate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::league_builder::demo_league;
    use crate::season::schedule::round_robin;

    fn schedule(teams: u32, rounds: u32) -> Vec<ScheduleEntry> {
        let ids: Vec<u32> = (1..=teams).collect();
        round_robin(&ids, rounds, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap())
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let league = demo_league(6, 21);
        let mut parallel = EngineConfig::default();
        parallel.scheduler.parallel_slates = true;
        let mut sequential = EngineConfig::default();
        sequential.scheduler.parallel_slates = false;

        let a = simulate_season(&league, &parallel, schedule(6, 2), 77).unwrap();
        let b = simulate_season(&league, &sequential, schedule(6, 2), 77).unwrap();
        assert_eq!(a.games, b.games);
        assert_eq!(a.state, b.state);
    }

    #[test]
    fn test_progress_and_break() {
        let league = demo_league(4, 3);
        let mut config = EngineConfig::default();
        config.scheduler.batch_size = 4;
        let mut sim = SeasonSimulator::new(&league, &config, schedule(4, 3), 5).unwrap();
        let mut calls = Vec::new();
        let result = sim.simulate_with_progress(|p| {
            calls.push(p.completed);
            if p.completed >= 8 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(calls, vec![4, 8]);
        assert_eq!(result.completed, 8);
        assert_eq!(result.games.len(), 8);
        assert!(!sim.is_finished());

        // Picking up again finishes the remaining games.
        let rest = sim.simulate();
        assert_eq!(rest.completed, 18);
    }

    #[test]
    fn test_replay_matches_original() {
        let league = demo_league(4, 8);
        let config = EngineConfig::default();
        let mut sim = SeasonSimulator::new(&league, &config, schedule(4, 2), 13).unwrap();
        let result = sim.simulate();
        let original = &result.games[7];
        assert_eq!(&sim.replay_game(original.game_id).unwrap(), original);
        assert!(sim.replay_game(9999).is_err());
    }

    #[test]
    fn test_forfeits_do_not_stop_the_season() {
        let mut league = demo_league(4, 8);
        for p in league.players.values_mut().filter(|p| p.team_id == 2) {
            p.status = crate::models::RosterStatus::Injured;
        }
        let config = EngineConfig::default();
        let result = simulate_season(&league, &config, schedule(4, 1), 1).unwrap();
        assert_eq!(result.completed, 6);
        let forfeits: Vec<_> = result.games.iter().filter(|g| g.forfeit.is_some()).collect();
        assert_eq!(forfeits.len(), 3);
        for g in forfeits {
            assert_eq!(g.loser(), Some(2));
            assert_eq!(g.score(g.forfeit.unwrap()), 0);
        }
        assert_eq!(result.stats.teams[&2].losses, 3);
    }
}
