use log::warn;
use strum::VariantArray;

use crate::cell::{Tile, MAX_CLUE};
use crate::compiler::Compiler;
use crate::logic::Cardinality;
use crate::pool::VarKey;
use crate::shape::Step;

impl<C: Cardinality> Compiler<'_, C> {
    /// Every island carries exactly as many bridge units as its clue.
    ///
    /// Each side of an island gets two bits `b0`, `b1`; the number of true bits is the number of bridge units leaving
    /// on that side, and that number decides which tile the neighbor holds:
    /// * no bit: neither the single nor the double bridge of that orientation,
    /// * one bit: the single bridge,
    /// * both bits: the double bridge.
    ///
    /// Summed over all sides, the true bits must number exactly the clue.
    pub(crate) fn encode_degrees(&mut self) {
        let board = self.board;

        for (location, clue) in board.islands() {
            if clue > MAX_CLUE {
                warn!("island at {} asks for {} bridge units, more than any island can carry", location, clue);
            }

            let mut unit_bits = Vec::with_capacity(2 * Step::VARIANTS.len());

            for step in Step::VARIANTS {
                // sides facing off the board simply contribute nothing
                let Some(neighbor) = board.step(location, *step) else { continue };

                let b0 = self.pool.id(VarKey::Units { location, step: *step, bit: 0 });
                let b1 = self.pool.id(VarKey::Units { location, step: *step, bit: 1 });
                let single = self.tile_var(neighbor, Tile::single(step.orientation()));
                let double = self.tile_var(neighbor, Tile::double(step.orientation()));

                self.add_clauses(vec![
                    // !b0 * !b1 => !S, !b0 * !b1 => !D
                    vec![b0.positive(), b1.positive(), single.negative()],
                    vec![b0.positive(), b1.positive(), double.negative()],
                    // b0 * !b1 => S, !b0 * b1 => S
                    vec![b0.negative(), b1.positive(), single.positive()],
                    vec![b0.positive(), b1.negative(), single.positive()],
                    // b0 * b1 => D
                    vec![b0.negative(), b1.negative(), double.positive()],
                ]);

                unit_bits.extend([b0.positive(), b1.positive()]);
            }

            self.exactly(&unit_bits, clue as usize);
        }
    }
}
