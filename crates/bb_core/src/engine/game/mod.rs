//! Single-game simulation: lineup setup, the half-inning loop and pitcher decisions.

pub mod context;
pub mod decisions;
pub mod engine;
pub mod lineup;
pub(crate) mod team_state;

pub use context::{GameContext, GamePhase, Half};
pub use decisions::{DecisionInput, DecisionOutcome};
pub use engine::{
    forfeit_result, simulate_game, BullpenArm, GameEngine, GamePlan, PlayKind, TeamPlan,
};
pub use lineup::TeamSetup;
