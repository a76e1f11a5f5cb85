//! Turn sequencing.
//!
//! Turn flow:
//! - `start` opens Blue's window on turn 1.
//! - Each submitted move is applied atomically; the window closes after
//!   `moves_per_player` moves, on a pass, or as soon as the opponent has
//!   no cells left.
//! - Closing a window evaluates termination. Production runs once per
//!   cycle, when Red's window closes, before that check.
//! - The turn number advances after Red's window. Exceeding `max_turns`
//!   ends the match in a tie.

use tracing::{debug, error, info};

use crate::board::{ensure_sound, Map, Move, MoveOutcome, Side};
use crate::error::{EngineError, IllegalMove};
use crate::rules::Rules;

/// The side whose window closes a full cycle.
const LAST_IN_CYCLE: Side = Side::Red;

/// How a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Side),
    Tie,
}

/// Turn manager states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    NotStarted,
    AwaitingPlayerTurn(Side),
    ApplyingMoves,
    EvaluatingTermination,
    Finished(Outcome),
    /// A board invariant broke. Terminal.
    Halted,
}

/// What happened as a result of a submission or pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The same side may keep moving.
    WindowOpen { side: Side, moves_left: u32 },
    /// The window closed and `next` is now active.
    TurnPassed { next: Side, turn: u32, produced: bool },
    Finished(Outcome),
}

/// Sequences turn windows and applies moves to the board.
#[derive(Debug, Clone)]
pub struct TurnManager {
    turn: u32,
    active: Side,
    moves_made: u32,
    state: TurnState,
    moves_per_player: u32,
    production: u32,
    max_turns: u32,
}

impl TurnManager {
    pub fn new(rules: &Rules) -> Self {
        Self {
            turn: 1,
            active: Side::Blue,
            moves_made: 0,
            state: TurnState::NotStarted,
            moves_per_player: rules.moves_per_player,
            production: rules.production,
            max_turns: rules.max_turns,
        }
    }

    /// Opens the first window. Returns the side to move.
    pub fn start(&mut self) -> Side {
        self.turn = 1;
        self.active = Side::Blue;
        self.moves_made = 0;
        self.state = TurnState::AwaitingPlayerTurn(self.active);
        info!(turn = self.turn, side = %self.active, "turn manager started");
        self.active
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn active(&self) -> Side {
        self.active
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn moves_made(&self) -> u32 {
        self.moves_made
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, TurnState::Finished(_) | TurnState::Halted)
    }

    /// The side whose window is open, if any.
    pub fn awaiting(&self) -> Option<Side> {
        match self.state {
            TurnState::AwaitingPlayerTurn(side) => Some(side),
            _ => None,
        }
    }

    /// Applies a move for the active side.
    ///
    /// Out-of-turn and illegal moves are rejected without any state change.
    pub fn submit(&mut self, map: &mut Map, mv: Move) -> Result<(MoveOutcome, Progress), EngineError> {
        let side = match self.state {
            TurnState::AwaitingPlayerTurn(side) if side == mv.side => side,
            TurnState::AwaitingPlayerTurn(_) => return Err(IllegalMove::OutOfTurn(mv.side).into()),
            _ => return Err(IllegalMove::NotAcceptingMoves.into()),
        };

        self.state = TurnState::ApplyingMoves;
        let outcome = match map.apply_move(&mv) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = TurnState::AwaitingPlayerTurn(side);
                return Err(e.into());
            }
        };
        self.check_board(map)?;
        self.moves_made += 1;

        let opponent_eliminated = map.count_owned(side.opponent()) == 0;
        if self.moves_made >= self.moves_per_player || opponent_eliminated {
            let progress = self.end_window(map)?;
            return Ok((outcome, progress));
        }

        self.state = TurnState::AwaitingPlayerTurn(side);
        Ok((
            outcome,
            Progress::WindowOpen {
                side,
                moves_left: self.moves_per_player - self.moves_made,
            },
        ))
    }

    /// Closes the active side's window early.
    pub fn pass_turn(&mut self, map: &mut Map) -> Result<Progress, EngineError> {
        if self.awaiting().is_none() {
            return Err(IllegalMove::NotAcceptingMoves.into());
        }
        debug!(side = %self.active, moves = self.moves_made, "window closed by pass");
        self.end_window(map)
    }

    fn end_window(&mut self, map: &mut Map) -> Result<Progress, EngineError> {
        self.state = TurnState::EvaluatingTermination;
        let closing = self.active;

        let produced = closing == LAST_IN_CYCLE;
        if produced {
            map.produce(self.production);
            self.check_board(map)?;
        }

        if let Some(outcome) = evaluate(map) {
            return Ok(self.finish(outcome));
        }

        if closing == LAST_IN_CYCLE {
            self.turn += 1;
            if self.turn > self.max_turns {
                return Ok(self.finish(Outcome::Tie));
            }
        }

        self.active = closing.opponent();
        self.moves_made = 0;
        self.state = TurnState::AwaitingPlayerTurn(self.active);
        Ok(Progress::TurnPassed {
            next: self.active,
            turn: self.turn,
            produced,
        })
    }

    fn finish(&mut self, outcome: Outcome) -> Progress {
        self.state = TurnState::Finished(outcome);
        info!(turn = self.turn, ?outcome, "match finished");
        Progress::Finished(outcome)
    }

    fn check_board(&mut self, map: &Map) -> Result<(), EngineError> {
        if let Err(violation) = ensure_sound(map) {
            error!(%violation, "halting match");
            self.state = TurnState::Halted;
            return Err(violation.into());
        }
        Ok(())
    }
}

/// Decides whether the board is in a terminal position.
pub fn evaluate(map: &Map) -> Option<Outcome> {
    let blue = map.count_owned(Side::Blue);
    let red = map.count_owned(Side::Red);
    match (blue, red) {
        (0, 0) => Some(Outcome::Tie),
        (0, _) => Some(Outcome::Winner(Side::Red)),
        (_, 0) => Some(Outcome::Winner(Side::Blue)),
        _ => None,
    }
}
