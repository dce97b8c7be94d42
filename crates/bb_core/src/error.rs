use thiserror::Error;

use crate::models::{PlayerId, TeamId};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid roster for team {team}: {reason}")]
    InvalidRoster { team: TeamId, reason: String },

    #[error("Unknown team: {0}")]
    UnknownTeam(TeamId),

    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Unknown park: {0}")]
    UnknownPark(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Roster problems are recovered by forfeiting the game instead of
    /// aborting the season.
    pub fn is_forfeit(&self) -> bool {
        matches!(self, EngineError::InvalidRoster { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
