//! Board sanity checks.
//!
//! These never fire in a correct engine. The turn manager runs them after
//! every mutation and halts the match on the first violation.

use super::map::Map;
use crate::error::InvariantViolation;

/// Checks the structural invariants of the board: every cell is reachable
/// through the position index and adjacency is symmetric without
/// self-loops. Unit counts are not bounded; production saturates.
///
/// Returns all violations found; empty means the board is sound.
#[must_use]
pub fn check_invariants(map: &Map) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let cells = map.cells();
    let adjacency = map.adjacency();

    for (i, cell) in cells.iter().enumerate() {
        if map.cell_at(cell.position).map(|c| c.position) != Some(cell.position) {
            violations.push(InvariantViolation::new(format!(
                "cell {} is not reachable through the position index",
                cell.position
            )));
        }

        for &j in &adjacency[i] {
            if j == i {
                violations.push(InvariantViolation::new(format!(
                    "cell {} is adjacent to itself",
                    cell.position
                )));
            } else if !adjacency[j].contains(&i) {
                violations.push(InvariantViolation::new(format!(
                    "adjacency {} -> {} has no reverse edge",
                    cell.position, cells[j].position
                )));
            }
        }
    }

    violations
}

/// Converts the first violation, if any, into an error.
pub fn ensure_sound(map: &Map) -> Result<(), InvariantViolation> {
    match check_invariants(map).into_iter().next() {
        Some(v) => Err(v),
        None => Ok(()),
    }
}
