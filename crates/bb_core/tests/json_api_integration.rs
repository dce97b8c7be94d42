use bb_core::season::round_robin;
use bb_core::{demo_league, simulate_game_json, simulate_season_json, EngineConfig, EngineError};
use chrono::NaiveDate;
use serde_json::{json, Value};

#[test]
fn test_game_json_matches_across_calls_and_configs() {
    let league = demo_league(2, 50);
    let request = |config: EngineConfig| {
        json!({
            "schema_version": 1,
            "league": league,
            "home_team_id": 2,
            "away_team_id": 1,
            "seed": 808,
            "config": config,
        })
        .to_string()
    };
    let a = simulate_game_json(&request(EngineConfig::default())).unwrap();
    let b = simulate_game_json(&request(EngineConfig::default())).unwrap();
    assert_eq!(a, b);

    let v: Value = serde_json::from_str(&a).unwrap();
    let result = &v["result"];
    assert_eq!(result["home_team_id"], 2);
    let line: u64 = result["box_score"]["line_score"]["home"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_u64().unwrap())
        .sum();
    assert_eq!(line, result["home_score"].as_u64().unwrap());
}

#[test]
fn test_invalid_config_is_rejected() {
    let league = demo_league(2, 50);
    let mut config = EngineConfig::default();
    config.rules.regulation_innings = 0;
    let request = json!({
        "schema_version": 1,
        "league": league,
        "home_team_id": 1,
        "away_team_id": 2,
        "seed": 1,
        "config": config,
    });
    let err = simulate_game_json(&request.to_string()).unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfig(_)));
}

#[test]
fn test_season_json_rejects_unknown_team() {
    let league = demo_league(2, 50);
    let mut schedule = round_robin(&[1, 2], 1, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    schedule[0].home_team_id = 42;
    let request = json!({ "schema_version": 1, "league": league, "schedule": schedule, "seed": 1 });
    let err = simulate_season_json(&request.to_string()).unwrap_err();
    assert!(matches!(err, EngineError::UnknownTeam(42)));
}
