//! The DIMACS CNF wire format.

use std::fmt::{Display, Formatter};
use std::io;

use crate::compiler::Compiled;

impl Display for Compiled {
    /// `p cnf <vars> <clauses>`, then one line per clause with its literals and a closing `0`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.formula.var_count(), self.formula.len())?;

        for clause in self.formula.iter() {
            for lit in clause {
                write!(f, "{} ", lit.to_dimacs())?;
            }
            writeln!(f, "0")?;
        }

        Ok(())
    }
}

impl Compiled {
    /// Write this formula in DIMACS format to `target`.
    pub fn write_dimacs(&self, target: &mut impl io::Write) -> io::Result<()> {
        write!(target, "{}", self)
    }
}
