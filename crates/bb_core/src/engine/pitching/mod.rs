//! Pitcher usage: fatigue, momentum, rest between games and the in-game
//! pull/relief state machine.

pub mod fatigue;
pub mod management;
pub mod momentum;
pub mod rest;

pub use management::{
    evaluate_status, inning_cap, is_save_situation, pitch_limit, select_reliever, should_pull,
    BullpenSituation, OutingSnapshot, PitcherStatus, ReliefCandidate,
};
pub use momentum::MomentumState;
pub use rest::{PitcherRestEntry, PitcherRestMap};
