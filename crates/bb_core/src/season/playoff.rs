//! Fixed-bracket postseason.
//!
//! Seeds are placed with the usual 1-vs-N bracket order and winners move to
//! fixed slots: the winners of series 0 and 1 meet next, then 2 and 3, and
//! so on. There is no reseeding. Home field follows a per-round pattern from
//! the higher seed's point of view.

use std::ops::ControlFlow;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::config::EngineConfig;
use crate::engine::game::{forfeit_result, GameEngine};
use crate::engine::rng::derive_seed;
use crate::error::{EngineError, Result};
use crate::models::{GameResult, League, TeamId};

use super::state::{PlannedGame, SeasonState};
use super::stats::SeasonStats;

/// Playoff game ids start here so they never collide with the schedule.
pub const PLAYOFF_GAME_ID_BASE: u64 = 1_000_000;

/// Tied games are replayed with a fresh seed up to this many times, after
/// which the higher seed is awarded the game.
pub const MAX_TIE_REPLAYS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesFormat {
    pub best_of: u8,
    /// One char per game, `H` when the higher seed is at home.
    pub home_pattern: String,
}

impl SeriesFormat {
    pub fn new(best_of: u8, home_pattern: &str) -> Self {
        Self { best_of, home_pattern: home_pattern.to_string() }
    }

    pub fn wins_needed(&self) -> u8 {
        self.best_of / 2 + 1
    }

    pub fn higher_seed_home(&self, game_index: usize) -> bool {
        self.home_pattern.as_bytes().get(game_index).map_or(true, |c| *c == b'H')
    }

    fn validate(&self) -> Result<()> {
        if self.best_of == 0 || self.best_of % 2 == 0 || self.best_of > 9 {
            return Err(EngineError::InvalidConfig(format!(
                "series length {} must be odd and at most 9",
                self.best_of
            )));
        }
        let bad_char = self.home_pattern.chars().any(|c| c != 'H' && c != 'A');
        if self.home_pattern.len() != usize::from(self.best_of) || bad_char {
            return Err(EngineError::InvalidConfig(format!(
                "home pattern {:?} does not fit a best-of-{}",
                self.home_pattern, self.best_of
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffFormat {
    /// First round first; the bracket holds `2^rounds.len()` teams.
    pub rounds: Vec<SeriesFormat>,
}

impl Default for PlayoffFormat {
    fn default() -> Self {
        Self {
            rounds: vec![
                SeriesFormat::new(3, "HHH"),
                SeriesFormat::new(5, "HHAAH"),
                SeriesFormat::new(7, "HHAAAHH"),
            ],
        }
    }
}

impl PlayoffFormat {
    pub fn teams(&self) -> usize {
        1usize << self.rounds.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.rounds.is_empty() || self.rounds.len() > 6 {
            return Err(EngineError::InvalidConfig("playoffs need between 1 and 6 rounds".into()));
        }
        self.rounds.iter().try_for_each(SeriesFormat::validate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesGame {
    pub game_id: u64,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_score: u32,
    pub away_score: u32,
    pub innings: u8,
    /// Tied attempts thrown out before this result.
    pub replays: u32,
    pub winner: TeamId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub round: usize,
    pub higher_seed: TeamId,
    pub lower_seed: TeamId,
    /// 1-based seed numbers.
    pub higher_rank: usize,
    pub lower_rank: usize,
    pub higher_wins: u8,
    pub lower_wins: u8,
    pub games: Vec<SeriesGame>,
    pub winner: TeamId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoffBracket {
    /// Index 0 is the top seed.
    pub seeds: Vec<TeamId>,
    pub rounds: Vec<Vec<SeriesResult>>,
    pub champion: Option<TeamId>,
    /// Full results in the order played.
    pub games: Vec<GameResult>,
}

/// Reported after each completed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffProgress {
    pub round: usize,
    pub series_completed: usize,
    pub series_total: usize,
    pub games_played: usize,
    pub last_winner: TeamId,
}

/// Top `count` teams of the regular season.
pub fn seed_teams(stats: &SeasonStats, count: usize) -> Vec<TeamId> {
    stats.standings().into_iter().take(count).map(|(id, _)| id).collect()
}

/// 1-based seeds in bracket order, e.g. `[1, 8, 4, 5, 2, 7, 3, 6]`.
pub fn bracket_order(teams: usize) -> Vec<usize> {
    let mut order = vec![1];
    let mut size = 1;
    while size < teams {
        size *= 2;
        order = order.iter().flat_map(|s| [*s, size + 1 - *s]).collect();
    }
    order
}

pub fn playoff_game_id(round: usize, series: usize, game: usize) -> u64 {
    PLAYOFF_GAME_ID_BASE + (round as u64 + 1) * 1_000 + series as u64 * 10 + game as u64 + 1
}

struct Entrant {
    team_id: TeamId,
    rank: usize,
}

/// Run the bracket. `state` carries pitcher rest in from the regular season
/// and comes back updated.
pub fn simulate_playoffs(
    league: &League,
    config: &EngineConfig,
    format: &PlayoffFormat,
    seeds: &[TeamId],
    base_seed: u64,
    start: NaiveDate,
    state: &mut SeasonState,
) -> Result<PlayoffBracket> {
    simulate_playoffs_with_progress(league, config, format, seeds, base_seed, start, state, |_| {
        ControlFlow::Continue(())
    })
}

/// Like [`simulate_playoffs`], calling `on_progress` after every series.
/// `ControlFlow::Break` stops before the next series starts and returns the
/// partial bracket with no champion.
pub fn simulate_playoffs_with_progress<F>(
    league: &League,
    config: &EngineConfig,
    format: &PlayoffFormat,
    seeds: &[TeamId],
    base_seed: u64,
    start: NaiveDate,
    state: &mut SeasonState,
    mut on_progress: F,
) -> Result<PlayoffBracket>
where
    F: FnMut(&PlayoffProgress) -> ControlFlow<()>,
{
    format.validate()?;
    if seeds.len() != format.teams() {
        return Err(EngineError::InvalidConfig(format!(
            "{} seeds for a {}-team bracket",
            seeds.len(),
            format.teams()
        )));
    }
    for (i, id) in seeds.iter().enumerate() {
        league.team(*id)?;
        if seeds[..i].contains(id) {
            return Err(EngineError::InvalidConfig(format!("team {} seeded twice", id)));
        }
    }

    let engine = GameEngine::new(&league.players, config);
    let mut field: Vec<Entrant> = bracket_order(seeds.len())
        .into_iter()
        .map(|rank| Entrant { team_id: seeds[rank - 1], rank })
        .collect();
    let mut bracket = PlayoffBracket {
        seeds: seeds.to_vec(),
        rounds: Vec::new(),
        champion: None,
        games: Vec::new(),
    };
    let series_total = seeds.len() - 1;
    let mut series_completed = 0;
    let mut day = 0u64;

    for (round, series_format) in format.rounds.iter().enumerate() {
        let mut results = Vec::new();
        let mut advancing = Vec::new();
        let mut stopped = false;
        for (series, pair) in field.chunks(2).enumerate() {
            let [a, b] = pair else {
                continue;
            };
            let (higher, lower) = if a.rank <= b.rank { (a, b) } else { (b, a) };
            let mut ctx = SeriesContext {
                league,
                config,
                engine: &engine,
                base_seed,
                start,
                state: &mut *state,
            };
            let games = &mut bracket.games;
            let result = ctx.play_series(round, series, series_format, higher, lower, day, games);
            info!(
                round,
                winner = result.winner,
                higher = result.higher_seed,
                lower = result.lower_seed,
                score = %format!("{}-{}", result.higher_wins, result.lower_wins),
                "series complete"
            );
            let winner_rank =
                if result.winner == higher.team_id { higher.rank } else { lower.rank };
            advancing.push(Entrant { team_id: result.winner, rank: winner_rank });
            series_completed += 1;
            let progress = PlayoffProgress {
                round,
                series_completed,
                series_total,
                games_played: bracket.games.len(),
                last_winner: result.winner,
            };
            results.push(result);
            if on_progress(&progress).is_break() {
                info!(round, series_completed, "playoffs stopped early");
                stopped = true;
                break;
            }
        }
        day += u64::from(series_format.best_of) + 1;
        bracket.rounds.push(results);
        if stopped {
            return Ok(bracket);
        }
        field = advancing;
    }

    bracket.champion = field.first().map(|e| e.team_id);
    if let Some(champion) = bracket.champion {
        info!(champion, "playoffs complete");
    }
    Ok(bracket)
}

struct SeriesContext<'s, 'a> {
    league: &'s League,
    config: &'s EngineConfig,
    engine: &'s GameEngine<'a>,
    base_seed: u64,
    start: NaiveDate,
    state: &'s mut SeasonState,
}

impl SeriesContext<'_, '_> {
    fn play_series(
        &mut self,
        round: usize,
        series: usize,
        format: &SeriesFormat,
        higher: &Entrant,
        lower: &Entrant,
        first_day: u64,
        log: &mut Vec<GameResult>,
    ) -> SeriesResult {
        let needed = format.wins_needed();
        let mut result = SeriesResult {
            round,
            higher_seed: higher.team_id,
            lower_seed: lower.team_id,
            higher_rank: higher.rank,
            lower_rank: lower.rank,
            higher_wins: 0,
            lower_wins: 0,
            games: Vec::new(),
            winner: higher.team_id,
        };

        for game in 0..usize::from(format.best_of) {
            if result.higher_wins >= needed || result.lower_wins >= needed {
                break;
            }
            let (home, away) = if format.higher_seed_home(game) {
                (higher.team_id, lower.team_id)
            } else {
                (lower.team_id, higher.team_id)
            };
            let game_id = playoff_game_id(round, series, game);
            let offset = Days::new(first_day + game as u64);
            let date = self.start.checked_add_days(offset).unwrap_or(self.start);
            let (game_result, replays) = self.play_game(game_id, date, home, away);
            let winner = game_result.winner().unwrap_or(higher.team_id);
            if winner == higher.team_id {
                result.higher_wins += 1;
            } else {
                result.lower_wins += 1;
            }
            result.games.push(SeriesGame {
                game_id,
                home_team_id: home,
                away_team_id: away,
                home_score: game_result.home_score,
                away_score: game_result.away_score,
                innings: game_result.innings,
                replays,
                winner,
            });
            log.push(game_result);
        }
        result.winner = if result.higher_wins >= needed { higher.team_id } else { lower.team_id };
        result
    }

    fn play_game(
        &mut self,
        game_id: u64,
        date: NaiveDate,
        home: TeamId,
        away: TeamId,
    ) -> (GameResult, u32) {
        let seed = derive_seed(self.base_seed, game_id);
        let planned =
            self.state.plan_game(self.league, self.config, game_id, date, seed, home, away);
        let (result, replays) = match &planned {
            PlannedGame::Play { plan } => {
                let mut plan = plan.clone();
                let mut replays = 0;
                let mut result = self.engine.simulate(&plan);
                while result.is_tie() && replays < MAX_TIE_REPLAYS {
                    replays += 1;
                    debug!(game_id, replays, "tied playoff game replayed");
                    plan.seed = derive_seed(seed, u64::from(replays));
                    result = self.engine.simulate(&plan);
                }
                (result, replays)
            }
            PlannedGame::Forfeit { charged, .. } => {
                (forfeit_result(game_id, date, home, away, *charged, self.config), 0)
            }
        };
        self.state.record_game(&planned, &result);
        (result, replays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::league_builder::demo_league;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()
    }

    #[test]
    fn test_bracket_order() {
        assert_eq!(bracket_order(2), vec![1, 2]);
        assert_eq!(bracket_order(4), vec![1, 4, 2, 3]);
        assert_eq!(bracket_order(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
    }

    #[test]
    fn test_format_validation() {
        assert!(PlayoffFormat::default().validate().is_ok());
        assert_eq!(PlayoffFormat::default().teams(), 8);
        let bad = PlayoffFormat { rounds: vec![SeriesFormat::new(5, "HHA")] };
        assert!(bad.validate().is_err());
        let even = PlayoffFormat { rounds: vec![SeriesFormat::new(4, "HHAA")] };
        assert!(even.validate().is_err());
    }

    #[test]
    fn test_full_bracket() {
        let league = demo_league(8, 31);
        let config = EngineConfig::default();
        let seeds: Vec<TeamId> = (1..=8).collect();
        let mut state = SeasonState::new();
        let format = PlayoffFormat::default();
        let bracket =
            simulate_playoffs(&league, &config, &format, &seeds, 9, start(), &mut state).unwrap();

        assert_eq!(bracket.rounds.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 2, 1]);
        assert_eq!(bracket.rounds[0][0].higher_seed, 1);
        assert_eq!(bracket.rounds[0][0].lower_seed, 8);

        for (round, series_list) in bracket.rounds.iter().enumerate() {
            let needed = format.rounds[round].wins_needed();
            for s in series_list {
                assert_eq!(s.higher_wins.max(s.lower_wins), needed);
                assert!(s.higher_wins.min(s.lower_wins) < needed);
                assert_eq!(s.games[0].home_team_id, s.higher_seed);
                let decided = |g: &SeriesGame| g.home_score != g.away_score;
                assert!(s.games.iter().all(|g| decided(g) || g.replays == MAX_TIE_REPLAYS));
            }
        }

        // Fixed advancement: series 0 and 1 feed the first semifinal.
        let semi = &bracket.rounds[1][0];
        let feeders = [bracket.rounds[0][0].winner, bracket.rounds[0][1].winner];
        assert!(feeders.contains(&semi.higher_seed) && feeders.contains(&semi.lower_seed));
        assert_eq!(bracket.champion, Some(bracket.rounds[2][0].winner));
        let series_games: usize = bracket.rounds.iter().flatten().map(|s| s.games.len()).sum();
        assert_eq!(bracket.games.len(), series_games);
    }

    #[test]
    fn test_progress_reports_every_series() {
        let league = demo_league(8, 31);
        let config = EngineConfig::default();
        let seeds: Vec<TeamId> = (1..=8).collect();
        let format = PlayoffFormat::default();

        let mut seen = Vec::new();
        let mut state = SeasonState::new();
        let record = |p: &PlayoffProgress| {
            seen.push(*p);
            ControlFlow::Continue(())
        };
        let bracket = simulate_playoffs_with_progress(
            &league,
            &config,
            &format,
            &seeds,
            9,
            start(),
            &mut state,
            record,
        )
        .unwrap();
        assert_eq!(seen.len(), 7);
        assert!(seen.iter().all(|p| p.series_total == 7));
        assert_eq!(seen.last().map(|p| p.games_played), Some(bracket.games.len()));
        assert_eq!(seen.last().map(|p| p.last_winner), bracket.champion);

        let mut state = SeasonState::new();
        let plain =
            simulate_playoffs(&league, &config, &format, &seeds, 9, start(), &mut state).unwrap();
        assert_eq!(plain, bracket);
    }

    #[test]
    fn test_break_stops_after_current_series() {
        let league = demo_league(8, 31);
        let config = EngineConfig::default();
        let seeds: Vec<TeamId> = (1..=8).collect();
        let mut state = SeasonState::new();
        let bracket = simulate_playoffs_with_progress(
            &league,
            &config,
            &PlayoffFormat::default(),
            &seeds,
            9,
            start(),
            &mut state,
            |p| {
                if p.series_completed == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        )
        .unwrap();

        assert_eq!(bracket.rounds.len(), 1);
        assert_eq!(bracket.rounds[0].len(), 2);
        assert_eq!(bracket.champion, None);
        let series_games: usize = bracket.rounds[0].iter().map(|s| s.games.len()).sum();
        assert_eq!(bracket.games.len(), series_games);
    }

    #[test]
    fn test_playoffs_are_deterministic() {
        let league = demo_league(4, 2);
        let config = EngineConfig::default();
        let format = PlayoffFormat {
            rounds: vec![SeriesFormat::new(3, "HHA"), SeriesFormat::new(5, "HHAAH")],
        };
        let run = || {
            let mut state = SeasonState::new();
            let seeds = [3, 1, 4, 2];
            simulate_playoffs(&league, &config, &format, &seeds, 5, start(), &mut state).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_seed_count_must_match_format() {
        let league = demo_league(4, 2);
        let config = EngineConfig::default();
        let mut state = SeasonState::new();
        let format = PlayoffFormat::default();
        let seeds = [1, 2, 3, 4];
        let err = simulate_playoffs(&league, &config, &format, &seeds, 1, start(), &mut state);
        assert!(matches!(err, Err(EngineError::InvalidConfig(_))));
    }
}
