//! JSON entry points for hosts that do not link the Rust types directly.
//!
//! Every request carries `schema_version`; responses echo it back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::config::EngineConfig;
use crate::engine::game::{forfeit_result, GameEngine};
use crate::error::{EngineError, Result};
use crate::models::{GameResult, League, TeamId};
use crate::season::playoff::{simulate_playoffs, PlayoffBracket, PlayoffFormat};
use crate::season::schedule::ScheduleEntry;
use crate::season::scheduler::{SeasonResult, SeasonSimulator};
use crate::season::state::{PlannedGame, SeasonState};

pub const SCHEMA_VERSION: u8 = 1;

fn default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap_or_default()
}

fn default_playoff_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 1).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
pub struct GameRequest {
    pub schema_version: u8,
    pub league: League,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub seed: u64,
    #[serde(default)]
    pub game_id: u64,
    #[serde(default = "default_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub config: Option<EngineConfig>,
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub schema_version: u8,
    pub result: GameResult,
}

#[derive(Debug, Deserialize)]
pub struct SeasonRequest {
    pub schema_version: u8,
    pub league: League,
    pub schedule: Vec<ScheduleEntry>,
    pub seed: u64,
    #[serde(default)]
    pub config: Option<EngineConfig>,
    /// State returned by an earlier partial run.
    #[serde(default)]
    pub state: Option<SeasonState>,
}

#[derive(Debug, Serialize)]
pub struct SeasonResponse {
    pub schema_version: u8,
    pub result: SeasonResult,
}

#[derive(Debug, Deserialize)]
pub struct PlayoffRequest {
    pub schema_version: u8,
    pub league: League,
    /// Top seed first.
    pub seeds: Vec<TeamId>,
    pub seed: u64,
    #[serde(default = "default_playoff_start")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub format: Option<PlayoffFormat>,
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub state: Option<SeasonState>,
}

#[derive(Debug, Serialize)]
pub struct PlayoffResponse {
    pub schema_version: u8,
    pub bracket: PlayoffBracket,
    pub state: SeasonState,
}

fn check_version(version: u8) -> Result<()> {
    if version != SCHEMA_VERSION {
        return Err(EngineError::InvalidConfig(format!("Unsupported schema version: {}", version)));
    }
    Ok(())
}

fn resolve_config(config: Option<EngineConfig>) -> Result<EngineConfig> {
    let config = config.unwrap_or_default();
    config.validate()?;
    Ok(config)
}

/// One game with fully rested staffs; roster problems come back as a forfeit.
pub fn simulate_game_json(request_json: &str) -> Result<String> {
    let request: GameRequest = serde_json::from_str(request_json)?;
    check_version(request.schema_version)?;
    let config = resolve_config(request.config)?;
    let league = request.league;
    league.team(request.home_team_id)?;
    league.team(request.away_team_id)?;

    let planned = SeasonState::new().plan_game(
        &league,
        &config,
        request.game_id,
        request.date,
        request.seed,
        request.home_team_id,
        request.away_team_id,
    );
    let result = match &planned {
        PlannedGame::Play { plan } => GameEngine::new(&league.players, &config).simulate(plan),
        PlannedGame::Forfeit { game_id, date, home_team_id, away_team_id, charged } => {
            forfeit_result(*game_id, *date, *home_team_id, *away_team_id, *charged, &config)
        }
    };
    Ok(serde_json::to_string(&GameResponse { schema_version: SCHEMA_VERSION, result })?)
}

pub fn simulate_season_json(request_json: &str) -> Result<String> {
    let request: SeasonRequest = serde_json::from_str(request_json)?;
    check_version(request.schema_version)?;
    let config = resolve_config(request.config)?;
    let mut sim = SeasonSimulator::new(&request.league, &config, request.schedule, request.seed)?;
    if let Some(state) = request.state {
        sim = sim.with_state(state);
    }
    let result = sim.simulate();
    info!(games = result.completed, "season request complete");
    Ok(serde_json::to_string(&SeasonResponse { schema_version: SCHEMA_VERSION, result })?)
}

pub fn simulate_playoffs_json(request_json: &str) -> Result<String> {
    let request: PlayoffRequest = serde_json::from_str(request_json)?;
    check_version(request.schema_version)?;
    let config = resolve_config(request.config)?;
    let format = request.format.unwrap_or_default();
    let mut state = request.state.unwrap_or_default();
    let bracket = simulate_playoffs(
        &request.league,
        &config,
        &format,
        &request.seeds,
        request.seed,
        request.start_date,
        &mut state,
    )?;
    Ok(serde_json::to_string(&PlayoffResponse { schema_version: SCHEMA_VERSION, bracket, state })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::league_builder::demo_league;
    use serde_json::{json, Value};

    fn game_request(version: u8) -> String {
        json!({
            "schema_version": version,
            "league": demo_league(2, 6),
            "home_team_id": 1,
            "away_team_id": 2,
            "seed": 12345,
        })
        .to_string()
    }

    #[test]
    fn test_game_json_is_deterministic() {
        let a = simulate_game_json(&game_request(1)).unwrap();
        let b = simulate_game_json(&game_request(1)).unwrap();
        assert_eq!(a, b);
        let v: Value = serde_json::from_str(&a).unwrap();
        assert_eq!(v["schema_version"], 1);
        assert!(v["result"]["innings"].as_u64().unwrap() >= 9);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let err = simulate_game_json(&game_request(7)).unwrap_err();
        assert!(err.to_string().contains("schema version"));
        assert!(matches!(simulate_game_json("{not json"), Err(EngineError::Json(_))));
    }

    #[test]
    fn test_season_json_round_trip() {
        let league = demo_league(2, 6);
        let schedule = crate::season::schedule::round_robin(&[1, 2], 4, default_date());
        let request =
            json!({ "schema_version": 1, "league": league, "schedule": schedule, "seed": 3 });
        let out = simulate_season_json(&request.to_string()).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["result"]["completed"], 4);
        assert_eq!(v["result"]["games"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_playoffs_json() {
        let league = demo_league(2, 6);
        let request = json!({
            "schema_version": 1,
            "league": league,
            "seeds": [2, 1],
            "seed": 8,
            "format": { "rounds": [{ "best_of": 3, "home_pattern": "HAH" }] },
        });
        let out = simulate_playoffs_json(&request.to_string()).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        let champion = v["bracket"]["champion"].as_u64().unwrap();
        assert!(champion == 1 || champion == 2);
        assert_eq!(v["bracket"]["rounds"][0][0]["higher_seed"], 2);
    }
}
