use std::fmt::{Display, Formatter};

use strum::VariantArray;

use crate::shape::Orientation;

/// The largest number of bridge units an island can carry: two in each of four directions.
pub const MAX_CLUE: u8 = 8;

/// A cell of an unsolved puzzle.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Cell {
    /// An island which must end up with exactly `clue` bridge units.
    Island {
        /// Required number of bridge units.
        clue: u8,
    },
    /// Water. Bridges may pass through.
    #[default]
    Empty,
}

impl Cell {
    /// The clue of an island, or [`None`] for an empty cell.
    pub fn clue(&self) -> Option<u8> {
        match self {
            Cell::Island { clue } => Some(*clue),
            Cell::Empty => None,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Island { clue } => write!(f, "{}", clue),
            Cell::Empty => write!(f, "."),
        }
    }
}

/// What a cell holds in a solution. Exactly one of these is true for each cell of a satisfying assignment.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, VariantArray)]
pub enum Tile {
    /// Nothing here.
    #[default]
    Empty,
    /// One of the puzzle's islands.
    Island,
    /// One bridge unit running left to right.
    SingleHorizontal,
    /// One bridge unit running top to bottom.
    SingleVertical,
    /// Two bridge units running left to right.
    DoubleHorizontal,
    /// Two bridge units running top to bottom.
    DoubleVertical,
}

impl Tile {
    /// The single and double bridge tiles running along `orientation`.
    pub fn bridges(orientation: Orientation) -> [Tile; 2] {
        match orientation {
            Orientation::Horizontal => [Tile::SingleHorizontal, Tile::DoubleHorizontal],
            Orientation::Vertical => [Tile::SingleVertical, Tile::DoubleVertical],
        }
    }

    /// The single bridge tile running along `orientation`.
    pub fn single(orientation: Orientation) -> Tile {
        Self::bridges(orientation)[0]
    }

    /// The double bridge tile running along `orientation`.
    pub fn double(orientation: Orientation) -> Tile {
        Self::bridges(orientation)[1]
    }

    /// The direction this tile carries a bridge in, if it is a bridge at all.
    pub fn orientation(&self) -> Option<Orientation> {
        match self {
            Tile::SingleHorizontal | Tile::DoubleHorizontal => Some(Orientation::Horizontal),
            Tile::SingleVertical | Tile::DoubleVertical => Some(Orientation::Vertical),
            Tile::Empty | Tile::Island => None,
        }
    }

    /// Number of bridge units carried through this tile.
    pub fn units(&self) -> u8 {
        match self {
            Tile::SingleHorizontal | Tile::SingleVertical => 1,
            Tile::DoubleHorizontal | Tile::DoubleVertical => 2,
            Tile::Empty | Tile::Island => 0,
        }
    }

    /// The display glyph for this tile. Islands are not drawn here since they show their clue instead.
    pub fn glyph(&self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Island => '#',
            Tile::SingleHorizontal => '-',
            Tile::SingleVertical => '|',
            Tile::DoubleHorizontal => '=',
            Tile::DoubleVertical => '‖',
        }
    }
}
