//! Error taxonomy for the engine.
//!
//! Illegal moves are always recovered locally by the caller. Map failures
//! abort match setup. Invariant violations are defects and halt the match.

use crate::board::cell::{Position, Side};

/// Reasons a move submission is rejected. No state changes when one of
/// these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IllegalMove {
    #[error("no cell at {0}")]
    UnknownCell(Position),

    #[error("{from} is not adjacent to {to}")]
    NotAdjacent { from: Position, to: Position },

    #[error("{side} does not own {position}")]
    NotOwner { side: Side, position: Position },

    #[error("cannot send {quantity} units from a cell holding {available}")]
    InvalidQuantity { quantity: u32, available: u32 },

    #[error("it is not {0}'s turn")]
    OutOfTurn(Side),

    #[error("no turn window is open")]
    NotAcceptingMoves,
}

/// Errors that can occur while loading or validating a map definition.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("map definition is missing a 'name' header")]
    MissingName,

    #[error("unknown map glyph '{glyph}' at {position}")]
    UnknownGlyph { glyph: char, position: Position },

    #[error("duplicate cell at {0}")]
    DuplicatePosition(Position),

    #[error("edge references unknown cell {0}")]
    UnknownEdgeEndpoint(Position),

    #[error("map has no cells")]
    Empty,

    #[error("map needs at least {required} unowned cells, found {available}")]
    TooFewCells { required: usize, available: usize },

    #[error("invalid map json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read map: {0}")]
    Io(#[from] std::io::Error),
}

/// A broken internal invariant. Indicates a bug, never user error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invariant violation: {message}")]
pub struct InvariantViolation {
    pub message: String,
}

impl InvariantViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Errors from configuring match rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },

    #[error("option '{0}' must be positive")]
    MustBePositive(&'static str),
}

/// Umbrella error for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("illegal move: {0}")]
    IllegalMove(#[from] IllegalMove),

    #[error("map load failure: {0}")]
    MapLoad(#[from] MapError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error("rules: {0}")]
    Rules(#[from] RulesError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_move_messages() {
        let err = IllegalMove::NotAdjacent {
            from: Position::new(0, 0),
            to: Position::new(2, 0),
        };
        assert_eq!(err.to_string(), "0,0 is not adjacent to 2,0");
        assert_eq!(IllegalMove::OutOfTurn(Side::Red).to_string(), "it is not red's turn");
    }

    #[test]
    fn engine_error_wraps_sources() {
        let err: EngineError = MapError::TooFewCells { required: 10, available: 4 }.into();
        assert!(matches!(err, EngineError::MapLoad(MapError::TooFewCells { .. })));
        assert_eq!(
            err.to_string(),
            "map load failure: map needs at least 10 unowned cells, found 4"
        );
    }
}
