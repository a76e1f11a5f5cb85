//! Human player driven by cell selections.
//!
//! Two consecutive selections form a move: first an owned source cell
//! with units to spare, then an adjacent destination. Anything that does
//! not fit resets the selection to "awaiting source" without an error.

use tracing::debug;

use crate::board::{Map, Move, Position, Side, TransferPolicy};

/// Selection progress within a turn window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    AwaitingSource,
    SourceSelected(Position),
}

#[derive(Debug, Clone)]
pub struct HumanPlayer {
    side: Side,
    transfer: TransferPolicy,
    selection: Selection,
}

impl HumanPlayer {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            transfer: TransferPolicy::AllButOne,
            selection: Selection::AwaitingSource,
        }
    }

    pub(crate) fn set_transfer(&mut self, transfer: TransferPolicy) {
        self.transfer = transfer;
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Drops any half-made selection.
    pub fn reset(&mut self) {
        self.selection = Selection::AwaitingSource;
    }

    /// Feeds one selected cell. Returns a candidate move once a source and
    /// a valid destination have both been picked.
    pub fn select(&mut self, map: &Map, position: Position) -> Option<Move> {
        let Some(cell) = map.cell_at(position) else {
            self.reset();
            return None;
        };

        match self.selection {
            Selection::AwaitingSource => {
                if cell.is_owned_by(self.side) && self.transfer.quantity(cell.units).is_some() {
                    self.selection = Selection::SourceSelected(position);
                } else {
                    debug!(side = %self.side, %position, "ignored source selection");
                }
                None
            }
            Selection::SourceSelected(from) => {
                self.reset();
                if !map.is_adjacent(from, position) {
                    debug!(side = %self.side, %from, to = %position, "discarded non-adjacent selection");
                    return None;
                }
                let source = map.cell_at(from)?;
                if !source.is_owned_by(self.side) {
                    return None;
                }
                let quantity = self.transfer.quantity(source.units)?;
                Some(Move::new(self.side, from, position, quantity))
            }
        }
    }
}
