//! Season and postseason orchestration on top of the single-game engine.

pub mod playoff;
pub mod schedule;
pub mod scheduler;
pub mod state;
pub mod stats;

pub use playoff::{
    simulate_playoffs, simulate_playoffs_with_progress, PlayoffBracket, PlayoffFormat,
    PlayoffProgress, SeriesFormat, SeriesResult,
};
pub use schedule::{round_robin, validate_schedule, ScheduleEntry};
pub use scheduler::{simulate_season, SeasonProgress, SeasonResult, SeasonSimulator};
pub use state::{PlannedGame, SeasonState};
pub use stats::{LeagueSummary, SeasonStats, TeamRecord};
