//! # bb_core - Deterministic Baseball Season Simulation Engine
//!
//! Plate-appearance level simulation of games, seasons and playoff brackets.
//!
//! ## Features
//! - Same league, schedule, config and seed always give the same results
//! - Log5 matchup model with park, weather, umpire, platoon and fatigue modifiers
//! - Manager tactics, bullpen usage and cross-game pitcher rest
//! - JSON API for hosts outside Rust

// Game engine APIs often require many parameters for state, config, etc.
#![allow(clippy::too_many_arguments)]
// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]
// Large enum variants - boxing would require API changes
#![allow(clippy::large_enum_variant)]

pub mod api;
pub mod engine;
pub mod error;
pub mod models;
pub mod season;

pub use api::{simulate_game_json, simulate_playoffs_json, simulate_season_json};
pub use engine::{derive_seed, simulate_game, EngineConfig, GameEngine, GamePlan, Generator};
pub use error::{EngineError, Result};
pub use models::league_builder::{build_league, demo_league, DemoLeagueOptions};
pub use models::{GameResult, League, Player, Team};
pub use season::{
    round_robin, simulate_playoffs, simulate_playoffs_with_progress, simulate_season,
    PlayoffBracket, PlayoffFormat, PlayoffProgress, ScheduleEntry, SeasonResult, SeasonSimulator,
    SeasonState,
};
