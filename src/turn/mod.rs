//! Match setup and turn sequencing.

pub mod initialization;
pub mod manager;

pub use initialization::{initialize, Assignment};
pub use manager::{evaluate, Outcome, Progress, TurnManager, TurnState};
