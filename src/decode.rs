use itertools::Itertools;
use ndarray::Array2;
use strum::VariantArray;
use thiserror::Error;
use varisat::{Lit, Var};

use crate::board::Board;
use crate::cell::Tile;
use crate::location::Location;
use crate::pool::{VarKey, VarPool};
use crate::solved::SolvedBoard;

/// Ways a model can fail to describe a board. Any of these means the encoding or the backend is broken.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
    /// Some cell has no tile, or several.
    #[error("cell {location} has {count} tiles asserted, expected exactly one")]
    TileCount {
        /// The offending cell.
        location: Location,
        /// How many of its tile variables are true.
        count: usize,
    },
}

/// A satisfying assignment, indexed by variable index.
///
/// Variables the model does not mention read as false.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Model(Vec<bool>);

impl Model {
    /// Wrap raw values, where `values[i]` is the value of the variable with index `i`.
    pub fn from_values(values: Vec<bool>) -> Self {
        Self(values)
    }

    /// The value of `var`.
    pub fn value(&self, var: Var) -> bool {
        self.0.get(var.index()).copied().unwrap_or(false)
    }

    /// Number of variables with a recorded value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variable has a recorded value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Lit>> for Model {
    /// Convert a model as returned by [`varisat::Solver::model`].
    fn from(lits: Vec<Lit>) -> Self {
        let len = lits.iter().map(|lit| lit.var().index() + 1).max().unwrap_or(0);
        let mut values = vec![false; len];
        for lit in lits {
            values[lit.var().index()] = lit.is_positive();
        }

        Self(values)
    }
}

/// Read the tile of every cell of `board` off `model`.
pub(crate) fn decode(board: &Board, pool: &VarPool, model: &Model) -> Result<SolvedBoard, DecodeError> {
    let mut tiles = Array2::from_elem(board.cells.raw_dim(), Tile::Empty);

    for (index, tile) in tiles.indexed_iter_mut() {
        let location = Location::from(index);

        let asserted = Tile::VARIANTS.iter()
            .filter(|candidate| pool.get(&VarKey::Tile { location, tile: **candidate })
                .is_some_and(|var| model.value(var)))
            .collect_vec();

        match asserted.as_slice() {
            [only] => *tile = **only,
            _ => return Err(DecodeError::TileCount { location, count: asserted.len() }),
        }
    }

    Ok(SolvedBoard {
        dims: board.dims,
        clues: board.cells.clone(),
        tiles,
    })
}
