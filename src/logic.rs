//! Cardinality constraints over sets of literals.
//!
//! Encoders never build these clauses themselves; they go through a [`Cardinality`] implementation handed to the
//! [`Compiler`](crate::compiler::Compiler), so the encoding can be swapped out.

use itertools::Itertools;
use varisat::Lit;

use crate::pool::VarPool;

/// Which built-in [`Cardinality`] implementation to compile with.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CardinalityEncoding {
    /// [`SequentialCounter`].
    #[default]
    SequentialCounter,
    /// [`Binomial`].
    Binomial,
}

/// A strategy for turning "at most / at least / exactly `k` of these literals are true" into clauses.
///
/// Only [`at_most`](Self::at_most) must be provided: "at least `k` of `n`" is "at most `n - k`" over the negations.
pub trait Cardinality {
    /// Clauses forcing at most `k` of `lits` to be true. May allocate auxiliary variables from `pool`.
    fn at_most(&self, pool: &mut VarPool, lits: &[Lit], k: usize) -> Vec<Vec<Lit>>;

    /// Clauses forcing at least `k` of `lits` to be true.
    fn at_least(&self, pool: &mut VarPool, lits: &[Lit], k: usize) -> Vec<Vec<Lit>> {
        if k == 0 {
            return Vec::new();
        }
        if k > lits.len() {
            return contradiction(pool);
        }

        let negated = lits.iter().map(|lit| !*lit).collect_vec();
        self.at_most(pool, &negated, lits.len() - k)
    }

    /// Clauses forcing exactly `k` of `lits` to be true.
    fn exactly(&self, pool: &mut VarPool, lits: &[Lit], k: usize) -> Vec<Vec<Lit>> {
        if k > lits.len() {
            return contradiction(pool);
        }

        let mut clauses = self.at_most(pool, lits, k);
        clauses.extend(self.at_least(pool, lits, k));
        clauses
    }
}

/// An unsatisfiable pair of unit clauses over a fresh variable.
///
/// Used instead of an empty clause so the DIMACS output stays readable by every tool.
pub(crate) fn contradiction(pool: &mut VarPool) -> Vec<Vec<Lit>> {
    let var = pool.fresh();
    vec![vec![var.positive()], vec![var.negative()]]
}

/// The naive encoding: every choice of `k + 1` literals has at least one false.
///
/// No auxiliary variables, but `C(n, k + 1)` clauses, so this is only suitable for small sets.
/// It is the reference the other encodings are tested against.
#[derive(Clone, Copy, Debug, Default)]
pub struct Binomial;

impl Cardinality for Binomial {
    fn at_most(&self, _pool: &mut VarPool, lits: &[Lit], k: usize) -> Vec<Vec<Lit>> {
        if k >= lits.len() {
            return Vec::new();
        }

        // no k + 1 are true; (!A + !B) * (!A + !C) * ... for k = 1
        lits.iter()
            .combinations(k + 1)
            .map(|selection| selection.into_iter().map(|lit| !*lit).collect_vec())
            .collect_vec()
    }
}

/// Sinz's sequential counter, with `O(n * k)` clauses and auxiliary variables.
///
/// Auxiliary `s(i, j)` is forced true when at least `j + 1` of the first `i + 1` literals are true.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialCounter;

impl Cardinality for SequentialCounter {
    fn at_most(&self, pool: &mut VarPool, lits: &[Lit], k: usize) -> Vec<Vec<Lit>> {
        let n = lits.len();
        if k >= n {
            return Vec::new();
        }
        if k == 0 {
            return lits.iter().map(|lit| vec![!*lit]).collect_vec();
        }

        // registers for the first n - 1 literals; the last one only needs to be checked against overflow
        let s = (0..n - 1)
            .map(|_| (0..k).map(|_| pool.fresh()).collect_vec())
            .collect_vec();

        let mut clauses = Vec::with_capacity(2 * n * k + n);

        clauses.push(vec![!lits[0], s[0][0].positive()]);
        for j in 1..k {
            clauses.push(vec![s[0][j].negative()]);
        }

        for i in 1..n - 1 {
            clauses.push(vec![!lits[i], s[i][0].positive()]);
            clauses.push(vec![s[i - 1][0].negative(), s[i][0].positive()]);
            for j in 1..k {
                clauses.push(vec![!lits[i], s[i - 1][j - 1].negative(), s[i][j].positive()]);
                clauses.push(vec![s[i - 1][j].negative(), s[i][j].positive()]);
            }
            // overflow: the i-th literal would be the (k + 1)-th true one
            clauses.push(vec![!lits[i], s[i - 1][k - 1].negative()]);
        }

        clauses.push(vec![!lits[n - 1], s[n - 2][k - 1].negative()]);

        clauses
    }
}
