//! Board representation.
//!
//! Contains cells, sides, the map with its adjacency graph and combat
//! rules, unit transfer orders, and board sanity checks.

pub mod cell;
pub mod invariants;
pub mod map;
pub mod moves;

pub use cell::{Cell, Color, Position, Side, ALL_SIDES};
pub use invariants::{check_invariants, ensure_sound};
pub use map::{Map, MoveOutcome, Topology};
pub use moves::{Move, TransferPolicy};
