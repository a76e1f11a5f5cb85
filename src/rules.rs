//! Match configuration.
//!
//! `Rules` carries every policy value the engine consults. Options are
//! set by name the same way the text front end's `setoption` command
//! does; a bad name or value leaves the rules unchanged.

use serde::{Deserialize, Serialize};

use crate::board::TransferPolicy;
use crate::error::RulesError;

/// Default number of starting cells per side.
pub const NUMBER_INITIAL_CELLS: usize = 5;

/// Default number of moves per side per turn window.
pub const NUMBER_MOVES_PER_PLAYER: u32 = 2;

/// How starting cells are drawn from the unowned pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Uniformly random, alternating picks.
    #[default]
    Random,
    /// Each side grows outward from a seed cell placed far from the other.
    Separated,
}

impl Placement {
    fn parse(s: &str) -> Option<Placement> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Some(Placement::Random),
            "separated" => Some(Placement::Separated),
            _ => None,
        }
    }
}

/// Policy values for a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub initial_cells: usize,
    pub moves_per_player: u32,
    /// Units added to each owned cell per production tick.
    pub production: u32,
    /// Units placed on each starting cell.
    pub starting_units: u32,
    /// The match is a tie once the turn number exceeds this.
    pub max_turns: u32,
    /// Amount a human selection sends.
    pub transfer: TransferPolicy,
    pub placement: Placement,
    /// RNG seed; 0 draws from entropy.
    pub seed: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            initial_cells: NUMBER_INITIAL_CELLS,
            moves_per_player: NUMBER_MOVES_PER_PLAYER,
            production: 1,
            starting_units: 5,
            max_turns: 200,
            transfer: TransferPolicy::AllButOne,
            placement: Placement::Random,
            seed: 0,
        }
    }
}

impl Rules {
    /// Sets an option by its protocol name.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), RulesError> {
        let invalid = || RulesError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };

        let mut next = self.clone();
        match name {
            "InitialCells" => next.initial_cells = value.parse().map_err(|_| invalid())?,
            "MovesPerPlayer" => next.moves_per_player = value.parse().map_err(|_| invalid())?,
            "Production" => next.production = value.parse().map_err(|_| invalid())?,
            "StartingUnits" => next.starting_units = value.parse().map_err(|_| invalid())?,
            "MaxTurns" => next.max_turns = value.parse().map_err(|_| invalid())?,
            "Transfer" => next.transfer = TransferPolicy::parse(value).ok_or_else(invalid)?,
            "Placement" => next.placement = Placement::parse(value).ok_or_else(invalid)?,
            "Seed" => next.seed = value.parse().map_err(|_| invalid())?,
            other => return Err(RulesError::UnknownOption(other.to_string())),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Rejects configurations under which a match cannot make progress.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.initial_cells == 0 {
            return Err(RulesError::MustBePositive("InitialCells"));
        }
        if self.moves_per_player == 0 {
            return Err(RulesError::MustBePositive("MovesPerPlayer"));
        }
        if self.max_turns == 0 {
            return Err(RulesError::MustBePositive("MaxTurns"));
        }
        if self.starting_units == 0 {
            return Err(RulesError::MustBePositive("StartingUnits"));
        }
        Ok(())
    }

    /// Minimum number of unowned cells a map needs for initialization.
    /// Saturates, so an absurd cell count fails the map-size check.
    pub fn required_cells(&self) -> usize {
        self.initial_cells.saturating_mul(2)
    }
}
