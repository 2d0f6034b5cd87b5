use std::collections::HashMap;

use unordered_pair::UnorderedPair;
use varisat::Var;

use crate::cell::Tile;
use crate::location::Location;
use crate::shape::Step;

/// Which of the two bridge-unit bits on one side of an island.
pub(crate) type UnitBit = u8;

/// Structured name of a variable.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum VarKey {
    /// The cell at `location` holds `tile`.
    Tile { location: Location, tile: Tile },
    /// One of the two bits counting bridge units leaving the island at `location` toward `step`.
    Units { location: Location, step: Step, bit: UnitBit },
    /// The cell at `location` is reachable from the root within `hop` steps.
    Reach { location: Location, hop: usize },
    /// The two cells are joined by a bridge tile.
    Link { cells: UnorderedPair<Location> },
    /// `location` is reached at `hop` through its neighbor toward `step`.
    Via { location: Location, step: Step, hop: usize },
}

/// Deterministic mapping from [`VarKey`]s to solver variables.
///
/// Allocation is monotonic: the first variable is DIMACS 1, and a variable is never handed out twice or freed.
#[derive(Debug, Default)]
pub struct VarPool {
    ids: HashMap<VarKey, Var>,
    next: usize,
}

impl VarPool {
    /// The variable named by `key`, allocating it on first use.
    pub(crate) fn id(&mut self, key: VarKey) -> Var {
        if let Some(var) = self.ids.get(&key) {
            return *var;
        }

        let var = self.fresh();
        self.ids.insert(key, var);
        var
    }

    /// A new anonymous variable, as used for auxiliaries inside cardinality encodings.
    pub fn fresh(&mut self) -> Var {
        let var = Var::from_index(self.next);
        self.next += 1;
        var
    }

    /// Look up `key` without allocating.
    pub(crate) fn get(&self, key: &VarKey) -> Option<Var> {
        self.ids.get(key).copied()
    }

    /// The number of variables allocated so far, which is also the highest DIMACS id in use.
    pub fn var_count(&self) -> usize {
        self.next
    }

    /// Every named reachability variable at `location`, in increasing hop order.
    #[cfg(test)]
    pub(crate) fn reach_vars(&self, location: Location) -> Vec<(usize, Var)> {
        let mut vars = self.ids.iter()
            .filter_map(|(key, var)| match key {
                VarKey::Reach { location: here, hop } if *here == location => Some((*hop, *var)),
                _ => None,
            })
            .collect::<Vec<_>>();
        vars.sort_by_key(|(hop, _)| *hop);
        vars
    }
}
