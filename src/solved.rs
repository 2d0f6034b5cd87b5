use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;
use strum::VariantArray;
use thiserror::Error;

use crate::cell::{Cell, Tile};
use crate::connectivity::Connectivity;
use crate::location::{Dimension, Location};
use crate::shape::Step;

/// Rule violations found by [`SolvedBoard::validate`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Violation {
    /// A cell is an island in the solution but not in the puzzle, or the other way around.
    #[error("cell {location} disagrees with the puzzle about being an island")]
    IslandMismatch {
        /// The offending cell.
        location: Location,
    },
    /// A bridge tile is not continued by the same tile or an island on both ends.
    #[error("bridge at {location} does not run between two islands")]
    DanglingBridge {
        /// The offending cell.
        location: Location,
    },
    /// An island carries the wrong number of bridge units.
    #[error("island at {location} has {found} bridge units, expected {expected}")]
    ClueMismatch {
        /// The offending cell.
        location: Location,
        /// The clue.
        expected: u8,
        /// Units actually arriving.
        found: u8,
    },
    /// The non-empty cells form more than one structure.
    #[error("solution falls apart into {components} separate structures")]
    Disconnected {
        /// Number of structures.
        components: usize,
    },
}

/// A board with a [`Tile`] decided for every cell, frozen for output or checking.
#[derive(Clone, Debug)]
pub struct SolvedBoard {
    // width, height
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) clues: Array2<Cell>,
    pub(crate) tiles: Array2<Tile>,
}

impl SolvedBoard {
    /// Width and height, in that order.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    /// The tile at `location`, or [`None`] if that is off the board.
    pub fn tile(&self, location: Location) -> Option<Tile> {
        self.tiles.get(location.as_index()).copied()
    }

    /// Every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item=(Location, Tile)> + '_ {
        self.tiles.indexed_iter().map(|(index, tile)| (Location::from(index), *tile))
    }

    /// Bridge units leaving `location` toward `step`: those carried by the neighbor, if it runs the same way.
    pub fn bridge_units(&self, location: Location, step: Step) -> u8 {
        match self.tile(step.attempt_from(location)) {
            Some(tile) if tile.orientation() == Some(step.orientation()) => tile.units(),
            _ => 0,
        }
    }

    /// The non-empty cells, with an edge between each pair of neighbors joined under `connectivity`.
    pub(crate) fn graph(&self, connectivity: Connectivity) -> UnGraphMap<Location, ()> {
        let mut graph = UnGraphMap::new();

        for (location, tile) in self.tiles() {
            if tile == Tile::Empty {
                continue;
            }
            graph.add_node(location);

            for step in Step::FORWARD_VARIANTS {
                let other = step.attempt_from(location);
                let Some(other_tile) = self.tile(other) else { continue };
                if other_tile == Tile::Empty {
                    continue;
                }

                let joined = match connectivity {
                    Connectivity::Adjacency => true,
                    Connectivity::Bridged => [tile, other_tile].iter()
                        .any(|t| t.orientation() == Some(step.orientation())),
                };
                if joined {
                    graph.add_edge(location, other, ());
                }
            }
        }

        graph
    }

    /// Number of connected structures under `connectivity`, found by breadth-first search.
    pub fn components(&self, connectivity: Connectivity) -> usize {
        let graph = self.graph(connectivity);
        let mut seen = HashSet::with_capacity(graph.node_count());
        let mut components = 0;

        for start in graph.nodes() {
            if seen.contains(&start) {
                continue;
            }
            components += 1;

            let mut bfs = Bfs::new(&graph, start);
            while let Some(node) = bfs.next(&graph) {
                seen.insert(node);
            }
        }

        components
    }

    /// Whether the non-empty cells form at most one structure under `connectivity`.
    pub fn is_connected(&self, connectivity: Connectivity) -> bool {
        self.components(connectivity) <= 1
    }

    /// Check the solution against the puzzle rules without any reference to the SAT encoding.
    pub fn validate(&self, connectivity: Connectivity) -> Result<(), Violation> {
        for (index, tile) in self.tiles.indexed_iter() {
            let location = Location::from(index);
            let clue = self.clues[index].clue();

            if clue.is_some() != (*tile == Tile::Island) {
                return Err(Violation::IslandMismatch { location });
            }

            if let Some(orientation) = tile.orientation() {
                let forward = orientation.forward();
                for step in [forward, forward.invert()] {
                    match self.tile(step.attempt_from(location)) {
                        Some(Tile::Island) => {}
                        Some(next) if next == *tile => {}
                        _ => return Err(Violation::DanglingBridge { location }),
                    }
                }
            }

            if let Some(expected) = clue {
                let found = Step::VARIANTS.iter()
                    .map(|step| self.bridge_units(location, *step))
                    .sum::<u8>();
                if found != expected {
                    return Err(Violation::ClueMismatch { location, expected, found });
                }
            }
        }

        match self.components(connectivity) {
            0 | 1 => Ok(()),
            components => Err(Violation::Disconnected { components }),
        }
    }
}

impl Display for SolvedBoard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (tiles, clues) in self.tiles.rows().into_iter().zip(self.clues.rows()) {
            for (tile, clue) in tiles.iter().zip(clues.iter()) {
                match (tile, clue) {
                    (Tile::Island, Cell::Island { clue }) => write!(f, "{}", clue)?,
                    (tile, _) => write!(f, "{}", tile.glyph())?,
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
