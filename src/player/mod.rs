//! Players: one per side, either human or computer controlled.
//!
//! Both variants share identity and color and answer the same turn-window
//! contract: [`Player::on_turn_start`] opens a window, and each call to
//! [`Player::next_action`] yields a move, a pass, or a request to wait
//! for human input.

pub mod computer;
pub mod human;

pub use computer::{choose_move, ComputerPlayer, Intent};
pub use human::{HumanPlayer, Selection};

use crate::board::{Color, Map, Move, Position, Side};
use crate::rules::Rules;

/// What a player wants to do next within its turn window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAction {
    /// Submit this move to the turn manager.
    Submit(Move),
    /// Close the window.
    Pass,
    /// Wait for cell selections.
    AwaitInput,
}

#[derive(Debug, Clone)]
pub enum PlayerKind {
    Human(HumanPlayer),
    Computer(ComputerPlayer),
}

/// A participant in a match.
#[derive(Debug, Clone)]
pub struct Player {
    side: Side,
    color: Color,
    kind: PlayerKind,
    bound: bool,
}

impl Player {
    pub fn human(side: Side) -> Self {
        Self {
            side,
            color: side.color(),
            kind: PlayerKind::Human(HumanPlayer::new(side)),
            bound: false,
        }
    }

    pub fn computer(side: Side) -> Self {
        Self {
            side,
            color: side.color(),
            kind: PlayerKind::Computer(ComputerPlayer::new(side)),
            bound: false,
        }
    }

    /// Binds the player to a match's rules. Called once by the game.
    pub fn initialize(&mut self, rules: &Rules) {
        match &mut self.kind {
            PlayerKind::Human(h) => h.set_transfer(rules.transfer),
            PlayerKind::Computer(c) => c.set_move_limit(rules.moves_per_player),
        }
        self.bound = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.bound
    }

    /// Clears per-match decision state. Side and color are kept.
    pub fn restart(&mut self) {
        match &mut self.kind {
            PlayerKind::Human(h) => h.reset(),
            PlayerKind::Computer(c) => c.restart(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_blue(&self) -> bool {
        self.side == Side::Blue
    }

    pub fn is_human(&self) -> bool {
        matches!(self.kind, PlayerKind::Human(_))
    }

    pub fn kind(&self) -> &PlayerKind {
        &self.kind
    }

    /// Opens this player's turn window and returns its first action.
    pub fn on_turn_start(&mut self, map: &Map) -> TurnAction {
        match &mut self.kind {
            PlayerKind::Human(h) => h.reset(),
            PlayerKind::Computer(c) => c.begin_window(),
        }
        self.next_action(map)
    }

    /// Next action within an open window.
    pub fn next_action(&mut self, map: &Map) -> TurnAction {
        match &mut self.kind {
            PlayerKind::Human(_) => TurnAction::AwaitInput,
            PlayerKind::Computer(c) => match c.next_move(map) {
                Some(mv) => TurnAction::Submit(mv),
                None => TurnAction::Pass,
            },
        }
    }

    /// Routes a cell selection to a human player. Computers ignore it.
    pub fn on_cell_selected(&mut self, map: &Map, position: Position) -> Option<Move> {
        match &mut self.kind {
            PlayerKind::Human(h) => h.select(map, position),
            PlayerKind::Computer(_) => None,
        }
    }
}
