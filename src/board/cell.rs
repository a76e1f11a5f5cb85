//! Cells, sides, and board coordinates.
//!
//! A cell is the unit of territory: it sits at a fixed grid position, is
//! owned by at most one side, and holds a non-negative unit count.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two players in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Blue,
    Red,
}

/// Both sides in turn order. Blue always opens.
pub const ALL_SIDES: [Side; 2] = [Side::Blue, Side::Red];

impl Side {
    /// Returns the other side.
    pub const fn opponent(self) -> Side {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }

    /// Index into per-side arrays.
    pub const fn index(self) -> usize {
        match self {
            Side::Blue => 0,
            Side::Red => 1,
        }
    }

    /// Returns the lowercase single-character abbreviation used in map files.
    pub const fn map_char(self) -> char {
        match self {
            Side::Blue => 'b',
            Side::Red => 'r',
        }
    }

    /// Parses a side from its abbreviation, ignoring case.
    pub fn from_map_char(c: char) -> Option<Side> {
        match c.to_ascii_lowercase() {
            'b' => Some(Side::Blue),
            'r' => Some(Side::Red),
            _ => None,
        }
    }

    /// Display color used for cell borders and the end-of-match message.
    pub const fn color(self) -> Color {
        match self {
            Side::Blue => Color::BLUE,
            Side::Red => Color::RED,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Side::Blue => "blue",
            Side::Red => "red",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opaque RGB color handed to the render collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLUE: Color = Color { r: 0x21, g: 0x6b, b: 0xd6 };
    pub const RED: Color = Color { r: 0xd6, g: 0x2d, b: 0x21 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A cell coordinate. Ordered by x, then y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The orthogonal neighbours of this coordinate, in +x, -x, +y, -y
    /// order. Offsets that leave the `i32` range are skipped.
    pub fn orthogonal(self) -> impl Iterator<Item = Position> {
        let Position { x, y } = self;
        [
            x.checked_add(1).map(|nx| Position::new(nx, y)),
            x.checked_sub(1).map(|nx| Position::new(nx, y)),
            y.checked_add(1).map(|ny| Position::new(x, ny)),
            y.checked_sub(1).map(|ny| Position::new(x, ny)),
        ]
        .into_iter()
        .flatten()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A single cell of territory.
///
/// Owner and unit count are only mutated through [`crate::board::Map`]
/// operations; everything outside the board module sees cells by shared
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub position: Position,
    pub owner: Option<Side>,
    pub units: u32,
}

impl Cell {
    pub const fn new(position: Position, owner: Option<Side>, units: u32) -> Self {
        Self { position, owner, units }
    }

    /// Returns true if the cell is owned by `side`.
    pub fn is_owned_by(&self, side: Side) -> bool {
        self.owner == Some(side)
    }

    pub fn is_neutral(&self) -> bool {
        self.owner.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_map_char_roundtrip() {
        for side in ALL_SIDES {
            assert_eq!(Side::from_map_char(side.map_char()), Some(side));
        }
        assert_eq!(Side::from_map_char('B'), Some(Side::Blue));
        assert_eq!(Side::from_map_char('x'), None);
    }

    #[test]
    fn opponent_is_involution() {
        assert_eq!(Side::Blue.opponent(), Side::Red);
        assert_eq!(Side::Red.opponent().opponent(), Side::Red);
    }

    #[test]
    fn positions_order_by_x_then_y() {
        assert!(Position::new(0, 5) < Position::new(1, 0));
        assert!(Position::new(1, 0) < Position::new(1, 1));
    }

    #[test]
    fn orthogonal_stops_at_coordinate_range() {
        let inner: Vec<_> = Position::new(0, 0).orthogonal().collect();
        assert_eq!(
            inner,
            vec![Position::new(1, 0), Position::new(-1, 0), Position::new(0, 1), Position::new(0, -1)]
        );

        let corner: Vec<_> = Position::new(i32::MAX, i32::MIN).orthogonal().collect();
        assert_eq!(corner, vec![Position::new(i32::MAX - 1, i32::MIN), Position::new(i32::MAX, i32::MIN + 1)]);
    }

    #[test]
    fn color_formats_as_hex() {
        assert_eq!(Color::BLACK.to_string(), "#000000");
        assert_eq!(Side::Red.color().to_string(), "#d62d21");
    }

    #[test]
    fn cell_ownership_predicates() {
        let cell = Cell::new(Position::new(0, 0), Some(Side::Blue), 3);
        assert!(cell.is_owned_by(Side::Blue));
        assert!(!cell.is_owned_by(Side::Red));
        assert!(!cell.is_neutral());
    }
}
