//! In-game tactical decisions.
//!
//! Each module is a pure function of game and player state: either no action,
//! or a specific intervention the game loop applies. Draw counts are fixed per
//! branch so tactics never shift the random stream of an unrelated decision.

pub mod alignment;
pub mod bunt;
pub mod hit_and_run;
pub mod intentional_walk;
pub mod steal;
pub mod substitution;
pub mod wild_pitch;

pub use alignment::choose_alignment;
pub use bunt::BuntOutcome;
pub use steal::{StealAttempt, StealInputs};
pub use substitution::{BenchOption, SubstitutionResult};
pub use wild_pitch::BatteryError;
