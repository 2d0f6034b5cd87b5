#![warn(missing_docs)]

//! # `bridgesat`
//!
//! A compiler from the [bridges puzzle](https://en.wikipedia.org/wiki/Hashiwokakero) (Hashiwokakero) to SAT.
//! Begin by parsing a board from its text format with [`str::parse`], or build one with a [`BoardBuilder`].
//! Then either [`compile()`](Board::compile) it into CNF and write it out as DIMACS, or [`solve()`](Board::solve) it
//! and print the resulting [`SolvedBoard`].
//!
//! # Internals
//! Every cell of the grid holds exactly one [`Tile`]: empty, an island, or a single or double bridge running
//! horizontally or vertically. The board is expressed as a Boolean satisfiability problem over those tile choices
//! and handed to [`varisat`].
//!
//! A high level overview is as follows:
//!
//! 1. Every cell holds exactly one tile, and it is an island exactly when the puzzle says so.
//! 2. A bridge tile continues into the same tile or ends at an island, in both directions, and never touches the rim.
//! 3. Each side of an island carries 0, 1 or 2 bridge units, counted in two bits, and the bits of an island sum to
//! its clue.
//! 4. All non-empty cells form one connected structure, expressed as bounded-hop reachability from a single root.
//! See [`connectivity`] for the details and for the two notions of "connected" on offer.
//!
//! Cardinality constraints go through the [`Cardinality`] trait so that the encoding can be swapped out;
//! the SAT engine goes through [`Backend`] for the same reason.

pub use board::Board;
pub use builder::{BoardBuilder, BuilderInvalidReason};
pub use cell::{Cell, Tile};
pub use compiler::Compiled;
pub use connectivity::Connectivity;
pub use decode::{DecodeError, Model};
pub use location::{Coord, Dimension, Location};
pub use logic::{Binomial, Cardinality, CardinalityEncoding, SequentialCounter};
pub use parse::ParseError;
pub use pool::VarPool;
pub use shape::{Orientation, Step};
pub use solved::{SolvedBoard, Violation};
pub use solver::{Backend, CancelToken, SolveOptions, SolveOutcome, SolverFailure, VarisatBackend, Verdict};

pub(crate) mod board;
mod tests;
pub(crate) mod location;
pub(crate) mod logic;
pub mod shape;
pub(crate) mod cell;
pub mod builder;
pub(crate) mod pool;
pub(crate) mod parse;
pub(crate) mod compiler;
pub(crate) mod degree;
pub mod connectivity;
pub(crate) mod dimacs;
pub(crate) mod decode;
pub(crate) mod solved;
pub(crate) mod solver;
