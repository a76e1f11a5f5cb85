//! Computer move selection.
//!
//! The computer sends all but one unit from a cell and ranks candidate
//! moves in three tiers:
//!
//! 1. Captures: the sent units outnumber a hostile or neutral neighbour.
//!    Smallest leftover garrison wins, then lowest destination, then
//!    lowest source.
//! 2. Reinforcements: an interior cell pushes units one step closer to
//!    the frontier. Largest transfer wins.
//! 3. Attrition: a frontier cell wears down an adjacent enemy cell it
//!    cannot take yet. Weakest resulting defender wins.
//!
//! Only cells with more than one unit are ever sources. Every emitted
//! move passes [`Map::validate_move`].

use tracing::debug;

use crate::board::{Cell, Map, Move, Position, Side};

/// Which ranking tier produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Intent {
    Capture,
    Reinforce,
    Attrition,
}

/// Computer-controlled side. Holds only per-window bookkeeping.
#[derive(Debug, Clone)]
pub struct ComputerPlayer {
    side: Side,
    move_limit: u32,
    emitted: u32,
}

impl ComputerPlayer {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            move_limit: crate::rules::NUMBER_MOVES_PER_PLAYER,
            emitted: 0,
        }
    }

    pub(crate) fn set_move_limit(&mut self, limit: u32) {
        self.move_limit = limit;
    }

    /// Opens a new turn window.
    pub fn begin_window(&mut self) {
        self.emitted = 0;
    }

    pub fn restart(&mut self) {
        self.emitted = 0;
    }

    /// Next move for the current window, or `None` when the window should
    /// close.
    pub fn next_move(&mut self, map: &Map) -> Option<Move> {
        if self.emitted >= self.move_limit {
            return None;
        }
        let (mv, intent) = choose_move(self.side, map)?;
        debug!(side = %self.side, %mv, ?intent, "computer chose move");
        self.emitted += 1;
        Some(mv)
    }
}

/// Picks the best move for `side` on `map`, if any move is worth making.
pub fn choose_move(side: Side, map: &Map) -> Option<(Move, Intent)> {
    best_capture(side, map)
        .map(|mv| (mv, Intent::Capture))
        .or_else(|| best_reinforcement(side, map).map(|mv| (mv, Intent::Reinforce)))
        .or_else(|| best_attrition(side, map).map(|mv| (mv, Intent::Attrition)))
        .filter(|(mv, _)| map.validate_move(mv).is_ok())
}

/// Owned cells that can send at least one unit, with the amount they send.
fn sources(side: Side, map: &Map) -> impl Iterator<Item = (&Cell, u32)> + '_ {
    map.cells_owned_by(side)
        .filter(|c| c.units > 1)
        .map(|c| (c, c.units - 1))
}

fn best_capture(side: Side, map: &Map) -> Option<Move> {
    let mut best: Option<(u32, Position, Position, u32)> = None;
    for (src, qty) in sources(side, map) {
        for dest in map.neighbors(src.position) {
            if dest.is_owned_by(side) || qty <= dest.units {
                continue;
            }
            let key = (qty - dest.units, dest.position, src.position, qty);
            if best.map_or(true, |b| key < b) {
                best = Some(key);
            }
        }
    }
    best.map(|(_, to, from, qty)| Move::new(side, from, to, qty))
}

fn best_reinforcement(side: Side, map: &Map) -> Option<Move> {
    let hostile: Vec<Position> = map
        .cells()
        .iter()
        .filter(|c| !c.is_owned_by(side))
        .map(|c| c.position)
        .collect();
    if hostile.is_empty() {
        return None;
    }

    let dist = map.distances_from_any(&hostile);
    let depth = |p: Position| -> Option<u32> { map.index_of(p).and_then(|i| dist[i]) };

    let mut best: Option<(std::cmp::Reverse<u32>, Position, Position)> = None;
    for (src, qty) in sources(side, map) {
        let Some(src_depth) = depth(src.position) else {
            continue;
        };
        if src_depth < 2 {
            continue;
        }
        for dest in map.neighbors(src.position) {
            if !dest.is_owned_by(side) {
                continue;
            }
            if depth(dest.position).map_or(true, |d| d >= src_depth) {
                continue;
            }
            let key = (std::cmp::Reverse(qty), dest.position, src.position);
            if best.map_or(true, |b| key < b) {
                best = Some(key);
            }
        }
    }
    best.map(|(std::cmp::Reverse(qty), to, from)| Move::new(side, from, to, qty))
}

fn best_attrition(side: Side, map: &Map) -> Option<Move> {
    let enemy = side.opponent();
    let mut best: Option<(u32, Position, Position, u32)> = None;
    for (src, qty) in sources(side, map) {
        for dest in map.neighbors(src.position) {
            if !dest.is_owned_by(enemy) {
                continue;
            }
            let key = (dest.units.saturating_sub(qty), dest.position, src.position, qty);
            if best.map_or(true, |b| key < b) {
                best = Some(key);
            }
        }
    }
    best.map(|(_, to, from, qty)| Move::new(side, from, to, qty))
}
