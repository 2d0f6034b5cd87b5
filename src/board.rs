use std::fmt::{Display, Formatter};

use itertools::Itertools;
use log::{info, warn};
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;

use crate::cell::Cell;
use crate::compiler::{Compiled, Compiler};
use crate::connectivity::Connectivity;
use crate::decode::decode;
use crate::location::{Dimension, Location};
use crate::logic::{Binomial, Cardinality, CardinalityEncoding, SequentialCounter};
use crate::shape::Step;
use crate::solved::SolvedBoard;
use crate::solver::{Backend, SolveOptions, SolveOutcome, SolverFailure, Verdict, VarisatBackend};

/// An unsolved puzzle: a rectangular grid of islands and empty cells.
///
/// [`Board`]s should be built using a [`BoardBuilder`](crate::builder::BoardBuilder) or parsed from the text format with
/// [`str::parse`].
#[derive(Clone, Debug)]
pub struct Board {
    // width, height
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) cells: Array2<Cell>,
    // grid adjacency; each edge is labelled with the forward step from its lower indexed endpoint
    pub(crate) graph: UnGraphMap<Location, Step>,
}

impl Board {
    /// Width and height, in that order.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// The puzzle cell at `location`, or [`None`] if that is off the board.
    pub fn cell(&self, location: Location) -> Option<Cell> {
        self.cells.get(location.as_index()).copied()
    }

    /// Every location on the board, in row-major order.
    pub fn locations(&self) -> impl Iterator<Item=Location> + '_ {
        self.cells.indexed_iter().map(|(index, _)| Location::from(index))
    }

    /// Every island on the board together with its clue, in row-major order.
    pub fn islands(&self) -> impl Iterator<Item=(Location, u8)> + '_ {
        self.cells.indexed_iter()
            .filter_map(|(index, cell)| cell.clue().map(|clue| (Location::from(index), clue)))
    }

    /// Step from `location` toward `step`, returning [`None`] when that would leave the board.
    pub fn step(&self, location: Location, step: Step) -> Option<Location> {
        let new_loc = step.attempt_from(location);
        self.cells.get(new_loc.as_index()).map(|_| new_loc)
    }

    /// The grid neighbors of `location` along with the direction in which each lies.
    pub fn neighbors(&self, location: Location) -> Vec<(Step, Location)> {
        self.graph.neighbors(location)
            .filter_map(|other| Step::between(location, other).map(|step| (step, other)))
            .collect_vec()
    }

    /// Compile this board into CNF with an injected cardinality encoding.
    pub fn compile_with<C: Cardinality>(&self, cardinality: C, connectivity: Connectivity) -> Compiled {
        Compiler::new(self, cardinality, connectivity).compile()
    }

    /// Compile this board into CNF as configured by `options`.
    pub fn compile(&self, options: &SolveOptions) -> Compiled {
        match options.cardinality {
            CardinalityEncoding::SequentialCounter => self.compile_with(SequentialCounter, options.connectivity),
            CardinalityEncoding::Binomial => self.compile_with(Binomial, options.connectivity),
        }
    }

    /// Compile, solve with [`VarisatBackend`] and decode.
    ///
    /// Returns the [`Verdict`] reached by the backend. Unsatisfiable boards and timeouts are verdicts, not errors.
    pub fn solve(&self, options: &SolveOptions) -> Result<Verdict, SolverFailure> {
        self.solve_with(&VarisatBackend::from(options), options)
    }

    /// As [`Self::solve`], with a caller-supplied [`Backend`].
    pub fn solve_with<B: Backend>(&self, backend: &B, options: &SolveOptions) -> Result<Verdict, SolverFailure> {
        let Compiled { formula, pool } = self.compile(options);

        Ok(match backend.solve(formula)? {
            SolveOutcome::Satisfiable(model) => {
                let solved: SolvedBoard = decode(self, &pool, &model)?;
                info!("decoded a solution for a {}x{} board", self.dims.0, self.dims.1);

                if let Err(violation) = solved.validate(options.connectivity) {
                    warn!("decoded solution breaks the rules: {}", violation);
                } else if !solved.is_connected(Connectivity::Bridged) {
                    info!("solution is connected through touching cells, not by bridges alone");
                }

                Verdict::Solved(solved)
            }
            SolveOutcome::Unsatisfiable => Verdict::Unsatisfiable,
            SolveOutcome::TimedOut => Verdict::TimedOut,
            SolveOutcome::Cancelled => Verdict::Cancelled,
        })
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.rows() {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
