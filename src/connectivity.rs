//! Encoding "all non-empty cells form one connected structure" with local clauses only.
//!
//! # Bounded-hop reachability
//! Let `V` be the number of cells and `d(c, i)` mean "cell `c` is reachable from the root within `i` hops",
//! for `0 <= i <= V - 2`. We assert:
//!
//! 1. Exactly one cell has `d(c, 0)`; that cell is the root.
//! 2. `d(c, i) => d(c, i + 1)`: a budget that suffices keeps sufficing.
//! 3. `d(c, i) => d(c, i - 1) + d(n_1, i - 1) + d(n_2, i - 1) + ...` over the neighbors `n` of `c`:
//!    a cell only becomes reachable at `i` if it or a neighbor already was at `i - 1`.
//! 4. `d(c, V - 2) <=> c is not empty`, as two clauses.
//!
//! Together these say that every non-empty cell lies in the wavefront grown from the root, and nothing else does.
//! A connected structure of `k >= 3` cells always has a cell within `k - 2` hops of every other, so the solver can
//! always pick a root for which `V - 2` hops is enough. Boards of fewer than two cells clamp the budget to 0.
//!
//! The cost is `O(V^2)` variables and clauses, which dominates the formula on larger boards.
//!
//! # What counts as a neighbor
//! See [`Connectivity`].

use itertools::Itertools;
use unordered_pair::UnorderedPair;
use varisat::Var;

use crate::cell::Tile;
use crate::compiler::Compiler;
use crate::location::Location;
use crate::logic::Cardinality;
use crate::pool::VarKey;
use crate::shape::{Orientation, Step};

/// The neighbor relation used when growing reachability.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Connectivity {
    /// Any two grid-adjacent non-empty cells are connected, whether or not a bridge joins them.
    ///
    /// This is the looser, historical rule: two structures that merely touch, such as two islands side by side,
    /// count as one.
    #[default]
    Adjacency,
    /// Two adjacent cells are connected only through a bridge tile running between them.
    Bridged,
}

/// The largest hop budget used for a board of `cell_count` cells.
pub(crate) fn max_hop(cell_count: usize) -> usize {
    cell_count.saturating_sub(2)
}

impl<C: Cardinality> Compiler<'_, C> {
    #[inline]
    pub(crate) fn reach_var(&mut self, location: Location, hop: usize) -> Var {
        self.pool.id(VarKey::Reach { location, hop })
    }

    pub(crate) fn encode_connectivity(&mut self) {
        let board = self.board;
        let max_hop = max_hop(board.cell_count());
        let locations = board.locations().collect_vec();

        // exactly one root
        let roots = locations.iter()
            .map(|location| self.reach_var(*location, 0).positive())
            .collect_vec();
        self.exactly(&roots, 1);

        for location in locations.iter().copied() {
            // once reachable, always reachable
            for hop in 0..max_hop {
                let now = self.reach_var(location, hop);
                let next = self.reach_var(location, hop + 1);
                self.add_clause(&[now.negative(), next.positive()]);
            }

            // reachable at hop i only through itself or a neighbor at hop i - 1
            let neighbors = board.neighbors(location);
            for hop in 1..=max_hop {
                let mut clause = Vec::with_capacity(2 + neighbors.len());
                clause.push(self.reach_var(location, hop).negative());
                clause.push(self.reach_var(location, hop - 1).positive());

                for (step, neighbor) in neighbors.iter().copied() {
                    clause.push(match self.connectivity {
                        Connectivity::Adjacency => self.reach_var(neighbor, hop - 1),
                        Connectivity::Bridged => self.via(location, step, neighbor, hop),
                    }.positive());
                }

                self.add_clause(&clause);
            }

            // reachable in the end exactly when not empty
            let empty = self.tile_var(location, Tile::Empty);
            let last = self.reach_var(location, max_hop);
            self.add_clause(&[empty.negative(), last.negative()]);
            self.add_clause(&[empty.positive(), last.positive()]);
        }
    }

    /// `Link(a, b)`: the adjacent cells `a` and `b` are joined by a bridge.
    ///
    /// We only demand a bridge tile of the right orientation on either end; the adjacency rules then force the other
    /// end to be an island or the same bridge tile.
    fn link(&mut self, a: Location, b: Location, orientation: Orientation) -> Var {
        let key = VarKey::Link { cells: UnorderedPair::from((a, b)) };
        if let Some(link) = self.pool.get(&key) {
            return link;
        }

        let link = self.pool.id(key);
        let mut clause = vec![link.negative()];
        for location in [a, b] {
            for tile in Tile::bridges(orientation) {
                clause.push(self.tile_var(location, tile).positive());
            }
        }
        self.add_clause(&clause);

        link
    }

    /// `Via(c, n, i)`: `c` is reached at `hop` through `neighbor`, meaning `Link(c, n) * d(n, i - 1)`.
    fn via(&mut self, location: Location, step: Step, neighbor: Location, hop: usize) -> Var {
        let via = self.pool.id(VarKey::Via { location, step, hop });
        let link = self.link(location, neighbor, step.orientation());
        let reach = self.reach_var(neighbor, hop - 1);

        self.add_clause(&[via.negative(), link.positive()]);
        self.add_clause(&[via.negative(), reach.positive()]);

        via
    }
}
