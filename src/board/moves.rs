//! Unit transfer orders.
//!
//! A `Move` is an immutable request by one side to send units from a cell
//! it owns to an adjacent cell. It is consumed exactly once when the turn
//! manager applies it to the map.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::cell::{Position, Side};

/// A unit transfer from `from` to `to`, issued by `side`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub side: Side,
    pub from: Position,
    pub to: Position,
    pub quantity: u32,
}

impl Move {
    pub const fn new(side: Side, from: Position, to: Position, quantity: u32) -> Self {
        Self { side, from, to, quantity }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} {} {}", self.from, self.to, self.quantity, self.side)
    }
}

/// How many units a human selection transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPolicy {
    /// Send everything except one unit, which stays behind to hold the cell.
    #[default]
    AllButOne,
    /// Send a fixed amount, capped so one unit stays behind.
    Fixed(u32),
}

impl TransferPolicy {
    /// Units to send from a cell currently holding `available` units.
    ///
    /// Returns `None` when nothing can be sent.
    pub fn quantity(self, available: u32) -> Option<u32> {
        let spare = available.saturating_sub(1);
        let qty = match self {
            TransferPolicy::AllButOne => spare,
            TransferPolicy::Fixed(n) => n.min(spare),
        };
        (qty > 0).then_some(qty)
    }

    /// Parses `all` or a positive integer.
    pub fn parse(s: &str) -> Option<TransferPolicy> {
        if s.eq_ignore_ascii_case("all") {
            return Some(TransferPolicy::AllButOne);
        }
        match s.parse::<u32>() {
            Ok(n) if n > 0 => Some(TransferPolicy::Fixed(n)),
            _ => None,
        }
    }
}
