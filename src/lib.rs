//! Andwars territory-capture engine library.
//!
//! Exposes the board model, players, turn sequencing, match mediator,
//! map formats and self-play driver for the binaries and integration
//! tests.

pub mod board;
pub mod error;
pub mod game;
pub mod player;
pub mod protocol;
pub mod rules;
pub mod selfplay;
pub mod turn;

pub use error::EngineError;
pub use game::{Game, GameMode, GameResult, Renderer};
pub use rules::Rules;
