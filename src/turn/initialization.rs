//! Starting-cell assignment.
//!
//! Runs once per match start and once per restart. Draws
//! `rules.initial_cells` cells per side from the unowned pool so the two
//! sets are disjoint and exactly sized, then places
//! `rules.starting_units` on each.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::board::{Map, Position, Side, ALL_SIDES};
use crate::error::MapError;
use crate::rules::{Placement, Rules};

/// Cells handed to each side.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    pub blue: Vec<Position>,
    pub red: Vec<Position>,
}

impl Assignment {
    pub fn cells_of(&self, side: Side) -> &[Position] {
        match side {
            Side::Blue => &self.blue,
            Side::Red => &self.red,
        }
    }
}

/// Assigns starting cells on `map`.
///
/// Fails without touching the map if fewer than `2 * rules.initial_cells`
/// unowned cells exist.
pub fn initialize(map: &mut Map, rules: &Rules, rng: &mut impl Rng) -> Result<Assignment, MapError> {
    let pool: Vec<Position> = map
        .cells()
        .iter()
        .filter(|c| c.is_neutral())
        .map(|c| c.position)
        .collect();

    let required = rules.required_cells();
    if pool.len() < required {
        return Err(MapError::TooFewCells {
            required,
            available: pool.len(),
        });
    }

    let assignment = match rules.placement {
        Placement::Random => random_placement(pool, rules.initial_cells, rng),
        Placement::Separated => separated_placement(map, pool, rules.initial_cells, rng),
    };

    for side in ALL_SIDES {
        for &position in assignment.cells_of(side) {
            map.assign(position, side, rules.starting_units);
        }
    }

    info!(
        map = map.name(),
        placement = ?rules.placement,
        cells_per_side = rules.initial_cells,
        "initialized starting cells"
    );
    Ok(assignment)
}

/// Shuffles the pool and deals cells alternately, Blue first.
fn random_placement(mut pool: Vec<Position>, per_side: usize, rng: &mut impl Rng) -> Assignment {
    pool.shuffle(rng);
    let mut assignment = Assignment::default();
    for (i, position) in pool.into_iter().take(per_side * 2).enumerate() {
        if i % 2 == 0 {
            assignment.blue.push(position);
        } else {
            assignment.red.push(position);
        }
    }
    assignment
}

/// Seeds Blue at a random cell and Red at the farthest cell from it, then
/// grows each side outward one nearest cell at a time, alternating.
fn separated_placement(map: &Map, pool: Vec<Position>, per_side: usize, rng: &mut impl Rng) -> Assignment {
    let mut free = pool;
    let mut assignment = Assignment::default();

    let blue_seed = free.swap_remove(rng.gen_range(0..free.len()));
    assignment.blue.push(blue_seed);

    let red_seed = take_nearest(map, &mut free, &[blue_seed], true, rng);
    if let Some(p) = red_seed {
        assignment.red.push(p);
    }

    while assignment.blue.len() < per_side || assignment.red.len() < per_side {
        for side in ALL_SIDES {
            let own = match side {
                Side::Blue => &mut assignment.blue,
                Side::Red => &mut assignment.red,
            };
            if own.len() >= per_side {
                continue;
            }
            if let Some(p) = take_nearest(map, &mut free, own, false, rng) {
                own.push(p);
            }
        }
    }

    debug!(?blue_seed, ?red_seed, "separated placement seeds");
    assignment
}

/// Removes and returns the free cell nearest to (or, with `farthest`, most
/// distant from) `origins`. Unreachable cells count as infinitely far.
/// Ties are broken at random.
fn take_nearest(
    map: &Map,
    free: &mut Vec<Position>,
    origins: &[Position],
    farthest: bool,
    rng: &mut impl Rng,
) -> Option<Position> {
    if free.is_empty() {
        return None;
    }

    let dist = map.distances_from_any(origins);
    let distance_of = |p: &Position| -> u32 { map.index_of(*p).and_then(|i| dist[i]).unwrap_or(u32::MAX) };

    let scores: Vec<u32> = free.iter().map(distance_of).collect();
    let target = if farthest {
        scores.iter().copied().max()
    } else {
        scores.iter().copied().min()
    }?;

    let tied: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|&(_, &s)| s == target)
        .map(|(i, _)| i)
        .collect();
    let pick = *tied.choose(rng)?;
    Some(free.swap_remove(pick))
}
