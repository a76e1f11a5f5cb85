//! Text formats.
//!
//! Map-definition codecs (grid text and JSON) and the command parser for
//! the interactive front end.

pub mod mapfile;
pub mod parser;

pub use mapfile::{load_map, parse_grid, parse_json, CellDefinition, MapDefinition};
pub use parser::{parse_command, Command};
