//! The board: cells, adjacency, combat resolution, and production.
//!
//! Cells are stored in load order in a `Vec` with a position index for
//! O(1) lookup. Adjacency is computed once at construction and never
//! changes. The loaded owner/unit values are snapshotted so `restart`
//! can restore them without rebuilding the graph.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use super::cell::{Cell, Position, Side};
use super::moves::Move;
use crate::error::{IllegalMove, MapError};

/// How cells are connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topology {
    /// Cells are adjacent when they are orthogonal grid neighbours.
    Grid,
    /// Explicit undirected edges.
    Edges(Vec<(Position, Position)>),
}

/// Result of a successfully applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Units joined a friendly cell.
    Reinforced,
    /// The destination changed hands.
    Captured { previous_owner: Option<Side> },
    /// The attack was absorbed; the defender keeps the cell.
    Repelled,
}

/// A loaded map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    name: String,
    cells: Vec<Cell>,
    initial: Vec<(Option<Side>, u32)>,
    index: HashMap<Position, usize>,
    adjacency: Vec<Vec<usize>>,
}

impl Map {
    /// Builds a map from its cells and topology.
    ///
    /// Fails if there are no cells, a position repeats, or an edge names
    /// a position with no cell.
    pub fn new(name: impl Into<String>, cells: Vec<Cell>, topology: Topology) -> Result<Map, MapError> {
        if cells.is_empty() {
            return Err(MapError::Empty);
        }

        let mut index = HashMap::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            if index.insert(cell.position, i).is_some() {
                return Err(MapError::DuplicatePosition(cell.position));
            }
        }

        let mut adjacency = vec![Vec::new(); cells.len()];
        match topology {
            Topology::Grid => {
                for (i, cell) in cells.iter().enumerate() {
                    for n in cell.position.orthogonal() {
                        if let Some(&j) = index.get(&n) {
                            adjacency[i].push(j);
                        }
                    }
                }
            }
            Topology::Edges(edges) => {
                for (a, b) in edges {
                    let i = *index.get(&a).ok_or(MapError::UnknownEdgeEndpoint(a))?;
                    let j = *index.get(&b).ok_or(MapError::UnknownEdgeEndpoint(b))?;
                    if i == j {
                        continue;
                    }
                    if !adjacency[i].contains(&j) {
                        adjacency[i].push(j);
                    }
                    if !adjacency[j].contains(&i) {
                        adjacency[j].push(i);
                    }
                }
            }
        }
        for list in &mut adjacency {
            list.sort_by_key(|&j| cells[j].position);
        }

        let initial = cells.iter().map(|c| (c.owner, c.units)).collect();

        Ok(Map {
            name: name.into(),
            cells,
            initial,
            index,
            adjacency,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All cells in load order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index of the cell at `position` in [`Map::cells`] order.
    pub(crate) fn index_of(&self, position: Position) -> Option<usize> {
        self.index.get(&position).copied()
    }

    /// The owner/unit values the map was loaded with, paired with each
    /// cell's position in load order.
    pub(crate) fn loaded_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .zip(&self.initial)
            .map(|(c, &(owner, units))| Cell::new(c.position, owner, units))
    }

    /// Looks up a cell by coordinate.
    pub fn cell_at(&self, position: Position) -> Option<&Cell> {
        self.index.get(&position).map(|&i| &self.cells[i])
    }

    /// Cells adjacent to `position`, ordered by position. Empty if the
    /// position has no cell.
    pub fn neighbors(&self, position: Position) -> impl Iterator<Item = &Cell> + '_ {
        self.index
            .get(&position)
            .map(|&i| self.adjacency[i].as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&j| &self.cells[j])
    }

    /// Returns true if both positions hold cells and they share an edge.
    pub fn is_adjacent(&self, a: Position, b: Position) -> bool {
        match (self.index.get(&a), self.index.get(&b)) {
            (Some(&i), Some(&j)) => self.adjacency[i].contains(&j),
            _ => false,
        }
    }

    /// Cells owned by `side`, in load order.
    pub fn cells_owned_by(&self, side: Side) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().filter(move |c| c.is_owned_by(side))
    }

    pub fn count_owned(&self, side: Side) -> usize {
        self.cells_owned_by(side).count()
    }

    /// Total units standing on cells owned by `side`.
    pub fn units_of(&self, side: Side) -> u64 {
        self.cells_owned_by(side).map(|c| u64::from(c.units)).sum()
    }

    /// Checks adjacency, ownership, and quantity without mutating anything.
    pub fn validate_move(&self, mv: &Move) -> Result<(), IllegalMove> {
        let src = self.cell_at(mv.from).ok_or(IllegalMove::UnknownCell(mv.from))?;
        if self.cell_at(mv.to).is_none() {
            return Err(IllegalMove::UnknownCell(mv.to));
        }
        if !self.is_adjacent(mv.from, mv.to) {
            return Err(IllegalMove::NotAdjacent { from: mv.from, to: mv.to });
        }
        if !src.is_owned_by(mv.side) {
            return Err(IllegalMove::NotOwner { side: mv.side, position: mv.from });
        }
        if mv.quantity == 0 || mv.quantity > src.units {
            return Err(IllegalMove::InvalidQuantity {
                quantity: mv.quantity,
                available: src.units,
            });
        }
        Ok(())
    }

    /// Applies a move atomically.
    ///
    /// Friendly destinations absorb the units. Hostile or neutral
    /// destinations are captured when the attackers outnumber the
    /// defenders, leaving the surplus behind; otherwise the defenders are
    /// reduced by the attacking amount. The source always loses the sent
    /// units. Nothing changes if the move is illegal.
    pub fn apply_move(&mut self, mv: &Move) -> Result<MoveOutcome, IllegalMove> {
        self.validate_move(mv)?;
        let src = self.index[&mv.from];
        let dst = self.index[&mv.to];

        self.cells[src].units -= mv.quantity;

        let dest = &mut self.cells[dst];
        let outcome = if dest.owner == Some(mv.side) {
            dest.units = dest.units.saturating_add(mv.quantity);
            MoveOutcome::Reinforced
        } else if mv.quantity > dest.units {
            let previous_owner = dest.owner;
            dest.owner = Some(mv.side);
            dest.units = mv.quantity - dest.units;
            MoveOutcome::Captured { previous_owner }
        } else {
            dest.units -= mv.quantity;
            MoveOutcome::Repelled
        };

        debug!(%mv, ?outcome, "applied move");
        Ok(outcome)
    }

    /// Adds `rate` units to every owned cell.
    pub fn produce(&mut self, rate: u32) {
        for cell in self.cells.iter_mut().filter(|c| c.owner.is_some()) {
            cell.units = cell.units.saturating_add(rate);
        }
    }

    /// Restores every cell's owner and units to the loaded values.
    pub fn restart(&mut self) {
        for (cell, &(owner, units)) in self.cells.iter_mut().zip(&self.initial) {
            cell.owner = owner;
            cell.units = units;
        }
    }

    /// Hands a cell to `side` during initialization.
    pub(crate) fn assign(&mut self, position: Position, side: Side, units: u32) -> bool {
        match self.index.get(&position) {
            Some(&i) => {
                self.cells[i].owner = Some(side);
                self.cells[i].units = units;
                true
            }
            None => false,
        }
    }

    /// Breadth-first hop distance from `origin` to every cell, indexed like
    /// [`Map::cells`]. Unreachable cells are `None`.
    pub fn distances_from(&self, origin: Position) -> Vec<Option<u32>> {
        self.distances_from_any(&[origin])
    }

    /// Hop distance from the nearest of `origins` to every cell, indexed
    /// like [`Map::cells`]. Origins with no cell are ignored.
    pub fn distances_from_any(&self, origins: &[Position]) -> Vec<Option<u32>> {
        let mut dist = vec![None; self.cells.len()];
        let mut queue = VecDeque::with_capacity(self.cells.len());

        for origin in origins {
            if let Some(&i) = self.index.get(origin) {
                if dist[i].is_none() {
                    dist[i] = Some(0);
                    queue.push_back(i);
                }
            }
        }

        while let Some(cur) = queue.pop_front() {
            let d = dist[cur].unwrap_or(0);
            for &next in &self.adjacency[cur] {
                if dist[next].is_none() {
                    dist[next] = Some(d + 1);
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    /// Raw adjacency lists, indexed like [`Map::cells`].
    pub(crate) fn adjacency(&self) -> &[Vec<usize>] {
        &self.adjacency
    }

    /// Adds `from -> to` without its reverse, leaving the board unsound.
    #[cfg(test)]
    pub(crate) fn add_one_way_edge(&mut self, from: Position, to: Position) {
        if let (Some(i), Some(j)) = (self.index_of(from), self.index_of(to)) {
            self.adjacency[i].push(j);
        }
    }
}
