use itertools::Itertools;
use log::{debug, info};
use strum::VariantArray;
use varisat::{CnfFormula, ExtendFormula, Lit, Var};

use crate::board::Board;
use crate::cell::{Cell, Tile};
use crate::connectivity::Connectivity;
use crate::location::Location;
use crate::logic::Cardinality;
use crate::pool::{VarKey, VarPool};
use crate::shape::Orientation;

/// A compiled board: the CNF formula together with the pool that names its variables.
pub struct Compiled {
    /// The clauses, with the variable count set to everything the pool allocated.
    pub formula: CnfFormula,
    /// Names of the variables in `formula`.
    pub pool: VarPool,
}

impl Compiled {
    /// Number of variables, as written in the DIMACS header.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    /// Number of clauses.
    pub fn clause_count(&self) -> usize {
        self.formula.len()
    }
}

/// Owns everything needed for one compilation of one board.
///
/// Each encoder appends to `formula`, allocating through `pool` and building cardinality constraints through
/// `cardinality`. Encoders live in [`crate::degree`] and [`crate::connectivity`] as well as here.
pub(crate) struct Compiler<'a, C: Cardinality> {
    pub(crate) board: &'a Board,
    pub(crate) cardinality: C,
    pub(crate) connectivity: Connectivity,
    pub(crate) pool: VarPool,
    pub(crate) formula: CnfFormula,
}

impl<'a, C: Cardinality> Compiler<'a, C> {
    pub(crate) fn new(board: &'a Board, cardinality: C, connectivity: Connectivity) -> Self {
        Self {
            board,
            cardinality,
            connectivity,
            pool: VarPool::default(),
            formula: CnfFormula::new(),
        }
    }

    #[inline]
    pub(crate) fn tile_var(&mut self, location: Location, tile: Tile) -> Var {
        self.pool.id(VarKey::Tile { location, tile })
    }

    #[inline]
    pub(crate) fn add_clause(&mut self, clause: &[Lit]) {
        self.formula.add_clause(clause);
    }

    pub(crate) fn add_clauses(&mut self, clauses: Vec<Vec<Lit>>) {
        clauses.iter().for_each(|clause| self.formula.add_clause(clause));
    }

    pub(crate) fn exactly(&mut self, lits: &[Lit], k: usize) {
        let clauses = self.cardinality.exactly(&mut self.pool, lits, k);
        self.add_clauses(clauses);
    }

    fn stage(&mut self, name: &str, encode: fn(&mut Self)) {
        let (clauses, vars) = (self.formula.len(), self.pool.var_count());
        encode(self);
        debug!("{}: {} clauses, {} variables", name, self.formula.len() - clauses, self.pool.var_count() - vars);
    }

    /// Run every encoder and assemble the formula.
    ///
    /// The variable count of the resulting formula is the highest id the pool handed out,
    /// even if some variable happens to appear in no clause.
    pub(crate) fn compile(mut self) -> Compiled {
        self.stage("tile exclusivity", Self::encode_tiles);
        self.stage("bridge adjacency", Self::encode_adjacency);
        self.stage("island degree", Self::encode_degrees);
        self.stage("connectivity", Self::encode_connectivity);

        self.formula.set_var_count(self.pool.var_count());
        info!("compiled {}x{} board into {} variables and {} clauses",
            self.board.dims.0, self.board.dims.1, self.formula.var_count(), self.formula.len());

        Compiled {
            formula: self.formula,
            pool: self.pool,
        }
    }

    /// Every cell holds exactly one [`Tile`], and it is an island exactly when the puzzle says so.
    pub(crate) fn encode_tiles(&mut self) {
        let board = self.board;

        for (index, cell) in board.cells.indexed_iter() {
            let location = Location::from(index);

            let tiles = Tile::VARIANTS.iter()
                .map(|tile| self.tile_var(location, *tile).positive())
                .collect_vec();
            self.exactly(&tiles, 1);

            let island = self.tile_var(location, Tile::Island);
            self.add_clause(&[island.lit(matches!(cell, Cell::Island { .. }))]);
        }
    }

    /// Bridges run in straight lines from island to island and never leave the board.
    pub(crate) fn encode_adjacency(&mut self) {
        let board = self.board;

        for location in board.locations() {
            for orientation in Orientation::VARIANTS {
                let forward = orientation.forward();
                let off_grid = [forward, forward.invert()].iter()
                    .any(|step| board.step(location, *step).is_none());

                for tile in Tile::bridges(*orientation) {
                    let here = self.tile_var(location, tile);

                    // a bridge on the rim would run off the board
                    if off_grid {
                        self.add_clause(&[here.negative()]);
                    }

                    let Some(next) = board.step(location, forward) else { continue };
                    let there = self.tile_var(next, tile);
                    let island_here = self.tile_var(location, Tile::Island);
                    let island_there = self.tile_var(next, Tile::Island);

                    // a bridge tile continues into the same tile or ends at an island, both ways
                    self.add_clause(&[here.negative(), island_there.positive(), there.positive()]);
                    self.add_clause(&[there.negative(), island_here.positive(), here.positive()]);
                }
            }
        }
    }
}
