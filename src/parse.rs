//! The puzzle text format.
//!
//! ```text
//! n 3
//! 2.2
//! ...
//! 2.2
//! ```
//!
//! The header is `n <dim>` for a square board, or `n <width> <height>`.
//! Each following row has one character per cell: `.` for an empty cell or a digit for an island with that clue.
//! Anything after the last row is ignored.

use std::num::NonZero;
use std::str::FromStr;

use thiserror::Error;

use crate::board::Board;
use crate::builder::{BoardBuilder, BuilderInvalidReason};
use crate::location::{Dimension, Location};

/// Reasons a puzzle text may fail to parse.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParseError {
    /// The input is empty or starts with a blank line.
    #[error("missing `n <dim>` header")]
    MissingHeader,
    /// The first line is not `n <dim>` or `n <width> <height>`.
    #[error("malformed header {0:?}, expected `n <dim>` or `n <width> <height>`")]
    BadHeader(String),
    /// A dimension of zero.
    #[error("grid dimensions must be positive")]
    ZeroDimension,
    #[error("a {width}x{height} grid has too many cells")]
    /// The cell count does not fit in memory's address space.
    TooLarge {
        /// Width from the header.
        width: usize,
        /// Height from the header.
        height: usize,
    },
    /// The input ended before every row was read.
    #[error("unexpected end of input: expected {expected} rows, found {found}")]
    UnexpectedEof {
        /// Rows announced by the header.
        expected: usize,
        /// Rows present.
        found: usize,
    },
    /// A row is not as wide as the header says.
    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        /// Zero-based row index.
        row: usize,
        /// Width from the header.
        expected: usize,
        /// Characters on the row.
        found: usize,
    },
    /// A row holds something other than `.` or a digit.
    #[error("unexpected character {ch:?} at row {row}, column {column}")]
    UnexpectedChar {
        /// The character found.
        ch: char,
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
    },
    /// The builder rejected the board.
    #[error("invalid board: {0:?}")]
    Invalid(Vec<BuilderInvalidReason>),
}

fn parse_dimension(token: &str, header: &str) -> Result<Dimension, ParseError> {
    let value = token.parse::<usize>().map_err(|_| ParseError::BadHeader(header.to_string()))?;
    NonZero::new(value).ok_or(ParseError::ZeroDimension)
}

fn parse_header(header: &str) -> Result<(Dimension, Dimension), ParseError> {
    let tokens = header.split_whitespace().collect::<Vec<_>>();
    match tokens.as_slice() {
        ["n", dim] => {
            let dim = parse_dimension(dim, header)?;
            Ok((dim, dim))
        }
        ["n", width, height] => Ok((parse_dimension(width, header)?, parse_dimension(height, header)?)),
        _ => Err(ParseError::BadHeader(header.to_string())),
    }
}

fn check_size((width, height): (Dimension, Dimension)) -> Result<(), ParseError> {
    let (width, height) = (width.get(), height.get());
    match width.checked_mul(height) {
        Some(_) => Ok(()),
        None => Err(ParseError::TooLarge { width, height }),
    }
}

impl FromStr for Board {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines().map(str::trim);

        let header = lines.next().filter(|line| !line.is_empty()).ok_or(ParseError::MissingHeader)?;
        let dims = parse_header(header)?;
        check_size(dims)?;
        let (width, height) = (dims.0.get(), dims.1.get());

        // every row must be present before anything is allocated for the grid
        let rows = lines.take(height).collect::<Vec<_>>();
        if rows.len() < height {
            return Err(ParseError::UnexpectedEof { expected: height, found: rows.len() });
        }

        for (y, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(ParseError::RowLength { row: y, expected: width, found });
            }
        }

        let mut builder = BoardBuilder::with_dims(dims);

        for (y, line) in rows.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                match ch {
                    '.' => {}
                    digit if digit.is_ascii_digit() => {
                        // is_ascii_digit guarantees a value in 0..=9
                        let clue = digit.to_digit(10).unwrap_or_default() as u8;
                        builder.add_island(Location(x, y), clue);
                    }
                    other => return Err(ParseError::UnexpectedChar { ch: other, row: y, column: x }),
                }
            }
        }

        builder.build().map_err(|reasons| ParseError::Invalid(reasons.clone()))
    }
}
