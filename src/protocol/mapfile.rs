//! Map definition codecs.
//!
//! Two formats produce a [`Map`]:
//!
//! Grid text, one row per line after a `name` header:
//!
//! ```text
//! name Duel
//! 3.3.3
//! 22222
//! 3.3.3
//! ```
//!
//! `.` or space is a hole, `0`-`9` a neutral cell with that many units,
//! `b`/`r` a cell held by Blue/Red with 1 unit and `B`/`R` with 5.
//! Adjacency is the orthogonal grid neighbourhood.
//!
//! JSON, for graph-shaped maps with explicit edges:
//!
//! ```text
//! {"name": "Ring", "cells": [{"x": 0, "y": 0, "units": 2}, ...],
//!  "edges": [[{"x": 0, "y": 0}, {"x": 1, "y": 0}], ...]}
//! ```
//!
//! Without `edges` the JSON form also uses grid adjacency.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{Cell, Map, Position, Side, Topology};
use crate::error::MapError;

/// Units on a cell written with an uppercase side glyph.
const STRONG_OWNED_UNITS: u32 = 5;

/// A cell entry in a JSON map definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDefinition {
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Side>,
    #[serde(default)]
    pub units: u32,
}

/// A JSON map definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDefinition {
    pub name: String,
    pub cells: Vec<CellDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<(Position, Position)>>,
}

impl MapDefinition {
    /// Builds the map this definition describes.
    pub fn build(self) -> Result<Map, MapError> {
        let cells = self
            .cells
            .iter()
            .map(|c| Cell::new(Position::new(c.x, c.y), c.owner, c.units))
            .collect();
        let topology = match self.edges {
            Some(edges) => Topology::Edges(edges),
            None => Topology::Grid,
        };
        Map::new(self.name, cells, topology)
    }

    /// Captures a map's loaded cells and adjacency as a definition.
    /// Play since loading is not recorded.
    pub fn from_map(map: &Map) -> MapDefinition {
        let cells = map
            .loaded_cells()
            .map(|c| CellDefinition {
                x: c.position.x,
                y: c.position.y,
                owner: c.owner,
                units: c.units,
            })
            .collect();
        let mut edges = Vec::new();
        for cell in map.cells() {
            for n in map.neighbors(cell.position) {
                if cell.position < n.position {
                    edges.push((cell.position, n.position));
                }
            }
        }
        MapDefinition {
            name: map.name().to_string(),
            cells,
            edges: Some(edges),
        }
    }
}

/// Parses a grid-text map definition.
pub fn parse_grid(text: &str) -> Result<Map, MapError> {
    let mut lines = text.lines();
    let name = lines
        .next()
        .and_then(|l| l.trim().strip_prefix("name"))
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(MapError::MissingName)?;

    let mut cells = Vec::new();
    for (y, row) in lines.enumerate() {
        for (x, glyph) in row.trim_end().chars().enumerate() {
            let position = Position::new(x as i32, y as i32);
            if let Some(cell) = parse_glyph(glyph, position)? {
                cells.push(cell);
            }
        }
    }

    Map::new(name, cells, Topology::Grid)
}

/// Parses a single grid glyph. Holes return `None`.
fn parse_glyph(glyph: char, position: Position) -> Result<Option<Cell>, MapError> {
    match glyph {
        '.' | ' ' => Ok(None),
        '0'..='9' => {
            let units = glyph.to_digit(10).unwrap_or(0);
            Ok(Some(Cell::new(position, None, units)))
        }
        _ => {
            let side = Side::from_map_char(glyph).ok_or(MapError::UnknownGlyph { glyph, position })?;
            let units = if glyph.is_ascii_uppercase() { STRONG_OWNED_UNITS } else { 1 };
            Ok(Some(Cell::new(position, Some(side), units)))
        }
    }
}

/// Parses a JSON map definition.
pub fn parse_json(text: &str) -> Result<Map, MapError> {
    let def: MapDefinition = serde_json::from_str(text)?;
    def.build()
}

/// Loads a map from disk, choosing the codec by file extension.
pub fn load_map(path: impl AsRef<Path>) -> Result<Map, MapError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json(&text),
        _ => parse_grid(&text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Move;

    const DUEL: &str = "name Duel\n3.3\nB2r\n";

    #[test]
    fn parse_grid_cells_and_owners() {
        let map = parse_grid(DUEL).unwrap();
        assert_eq!(map.name(), "Duel");
        assert_eq!(map.len(), 5);

        let blue = map.cell_at(Position::new(0, 1)).unwrap();
        assert_eq!(blue.owner, Some(Side::Blue));
        assert_eq!(blue.units, STRONG_OWNED_UNITS);

        let red = map.cell_at(Position::new(2, 1)).unwrap();
        assert_eq!(red.owner, Some(Side::Red));
        assert_eq!(red.units, 1);

        assert!(map.cell_at(Position::new(1, 0)).is_none());
        assert_eq!(map.cell_at(Position::new(2, 0)).unwrap().units, 3);
    }

    #[test]
    fn parse_grid_adjacency_skips_holes() {
        let map = parse_grid(DUEL).unwrap();
        assert!(map.is_adjacent(Position::new(0, 0), Position::new(0, 1)));
        assert!(!map.is_adjacent(Position::new(0, 0), Position::new(2, 0)));
    }

    #[test]
    fn parse_grid_requires_name() {
        assert!(matches!(parse_grid("3.3\n"), Err(MapError::MissingName)));
        assert!(matches!(parse_grid("name   \n33"), Err(MapError::MissingName)));
    }

    #[test]
    fn parse_grid_rejects_unknown_glyph() {
        let err = parse_grid("name Bad\n3x\n").unwrap_err();
        assert!(matches!(
            err,
            MapError::UnknownGlyph { glyph: 'x', position } if position == Position::new(1, 0)
        ));
    }

    #[test]
    fn parse_grid_rejects_empty_board() {
        assert!(matches!(parse_grid("name Void\n...\n"), Err(MapError::Empty)));
    }

    #[test]
    fn parse_json_with_edges() {
        let text = r#"{
            "name": "Ring",
            "cells": [
                {"x": 0, "y": 0, "units": 2},
                {"x": 4, "y": 0, "owner": "blue", "units": 3},
                {"x": 2, "y": 3}
            ],
            "edges": [
                [{"x": 0, "y": 0}, {"x": 4, "y": 0}],
                [{"x": 4, "y": 0}, {"x": 2, "y": 3}],
                [{"x": 2, "y": 3}, {"x": 0, "y": 0}]
            ]
        }"#;
        let map = parse_json(text).unwrap();
        assert_eq!(map.len(), 3);
        assert!(map.is_adjacent(Position::new(4, 0), Position::new(0, 0)));
        assert_eq!(map.cell_at(Position::new(4, 0)).unwrap().owner, Some(Side::Blue));
        assert_eq!(map.cell_at(Position::new(2, 3)).unwrap().units, 0);
    }

    #[test]
    fn parse_json_reports_syntax_errors() {
        assert!(matches!(parse_json("{"), Err(MapError::Json(_))));
    }

    #[test]
    fn definition_preserves_adjacency() {
        let map = parse_grid(DUEL).unwrap();
        let rebuilt = MapDefinition::from_map(&map).build().unwrap();
        for a in map.cells() {
            for b in map.cells() {
                assert_eq!(
                    map.is_adjacent(a.position, b.position),
                    rebuilt.is_adjacent(a.position, b.position)
                );
            }
        }
    }

    #[test]
    fn definition_ignores_play_since_loading() {
        let mut map = parse_grid("name t\nB3\n").unwrap();
        let loaded = map.clone();
        let mv = Move::new(Side::Blue, Position::new(0, 0), Position::new(1, 0), 4);
        map.apply_move(&mv).unwrap();
        map.produce(1);

        let definition = MapDefinition::from_map(&map);
        assert_eq!(definition.cells[0].owner, Some(Side::Blue));
        assert_eq!(definition.cells[0].units, STRONG_OWNED_UNITS);
        assert_eq!(definition.cells[1].owner, None);
        assert_eq!(definition.cells[1].units, 3);
        assert_eq!(definition.build().unwrap(), loaded);
    }

    #[test]
    fn parse_json_at_coordinate_extremes() {
        let map = parse_json(
            r#"{"name": "edge", "cells": [
                {"x": 2147483647, "y": 0, "units": 1},
                {"x": -2147483648, "y": 0, "units": 1},
                {"x": 0, "y": -2147483648, "units": 1}
            ]}"#,
        )
        .unwrap();
        assert_eq!(map.len(), 3);
        for cell in map.cells() {
            assert_eq!(map.neighbors(cell.position).count(), 0);
        }
    }

    #[test]
    fn load_map_missing_file() {
        assert!(matches!(load_map("/nonexistent/andwars.map"), Err(MapError::Io(_))));
    }
}
