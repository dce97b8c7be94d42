//! Simulation engine: randomness, probability model, plate appearances,
//! baserunning, pitching management, tactics and the game loop.

pub mod baserunning;
pub mod config;
pub mod game;
pub mod modifiers;
pub mod pitching;
pub mod plate_appearance;
pub mod probability;
pub mod rates;
pub mod rng;
pub mod tactics;

pub use config::EngineConfig;
pub use game::{simulate_game, GameEngine, GamePlan, PlayKind, TeamPlan};
pub use plate_appearance::{PaOutcome, PlateAppearanceResolver};
pub use rng::{derive_seed, Generator};
