pub mod json_api;

pub use json_api::{
    simulate_game_json, simulate_playoffs_json, simulate_season_json, GameRequest, GameResponse,
    PlayoffRequest, PlayoffResponse, SeasonRequest, SeasonResponse, SCHEMA_VERSION,
};
