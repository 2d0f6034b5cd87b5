#[cfg(test)]
mod tests {
    use std::num::NonZero;
    use std::thread;
    use std::time::{Duration, Instant};

    use itertools::Itertools;
    use proptest::prelude::*;
    use strum::VariantArray;
    use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

    use crate::builder::{BoardBuilder, BuilderInvalidReason};
    use crate::cell::{Cell, Tile};
    use crate::compiler::Compiled;
    use crate::connectivity::{max_hop, Connectivity};
    use crate::decode::{decode, Model};
    use crate::location::Location;
    use crate::logic::{Binomial, Cardinality, CardinalityEncoding, SequentialCounter};
    use crate::parse::ParseError;
    use crate::pool::{VarKey, VarPool};
    use crate::shape::Step;
    use crate::solved::SolvedBoard;
    use crate::solver::{Backend, CancelToken, SolveOptions, SolveOutcome, SolverFailure, VarisatBackend, Verdict};
    use crate::Board;

    const TWO_PAIRS: &str = "n 3
1.1
...
...
";

    const RING: &str = "n 3
2.2
...
2.2
";

    const DOUBLE: &str = "n 3
3.2
...
1..
";

    const FAR_CORNERS: &str = "n 4
1..1
....
....
1..1
";

    const TOUCHING_ROWS: &str = "n 3
1.1
1.1
...
";

    const FIVE: &str = "n 5
2.3.1
.....
..4.2
.....
3.3..
";

    fn options(connectivity: Connectivity) -> SolveOptions {
        SolveOptions {
            connectivity,
            ..Default::default()
        }
    }

    fn solve(text: &str, connectivity: Connectivity) -> Verdict {
        let board = text.parse::<Board>().unwrap();
        board.solve(&options(connectivity)).unwrap()
    }

    fn solved(text: &str, connectivity: Connectivity) -> SolvedBoard {
        match solve(text, connectivity) {
            Verdict::Solved(solved) => solved,
            other => panic!("expected a solution, got {:?}", other),
        }
    }

    fn model_of(compiled: &Compiled) -> Option<Model> {
        let mut solver = Solver::new();
        solver.add_formula(&compiled.formula);
        match solver.solve().unwrap() {
            true => Some(Model::from(solver.model().unwrap())),
            false => None,
        }
    }

    #[test]
    fn parse_and_display() {
        let board = FIVE.parse::<Board>().unwrap();
        assert_eq!(board.dims(), (NonZero::new(5).unwrap(), NonZero::new(5).unwrap()));
        assert_eq!(board.islands().count(), 7);
        assert_eq!(board.cell(Location(2, 2)), Some(Cell::Island { clue: 4 }));
        assert_eq!(board.cell(Location(1, 0)), Some(Cell::Empty));
        assert_eq!(board.cell(Location(5, 0)), None);
        assert_eq!(format!("{}", board), "2.3.1
.....
..4.2
.....
3.3..
");
    }

    #[test]
    fn parse_rectangular_header() {
        let board = "n 3 1\n1.1\n".parse::<Board>().unwrap();
        assert_eq!(board.dims(), (NonZero::new(3).unwrap(), NonZero::new(1).unwrap()));
        assert_eq!(format!("{}", board), "1.1\n");
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<Board>().unwrap_err(), ParseError::MissingHeader);
        assert_eq!("x 3".parse::<Board>().unwrap_err(), ParseError::BadHeader("x 3".to_string()));
        assert_eq!("n 0".parse::<Board>().unwrap_err(), ParseError::ZeroDimension);
        assert_eq!("n 2\n..".parse::<Board>().unwrap_err(), ParseError::UnexpectedEof { expected: 2, found: 1 });
        assert_eq!("n 2\n...\n..".parse::<Board>().unwrap_err(), ParseError::RowLength { row: 0, expected: 2, found: 3 });
        assert_eq!("n 2\n.a\n..".parse::<Board>().unwrap_err(), ParseError::UnexpectedChar { ch: 'a', row: 0, column: 1 });
    }

    #[test]
    fn huge_header_with_short_body() {
        // nothing may be allocated for the grid before its rows are known to exist
        assert_eq!("n 5000000000\n.\n".parse::<Board>().unwrap_err(), ParseError::UnexpectedEof { expected: 5000000000, found: 1 });
        assert_eq!("n 3000000000 4000000000\n.".parse::<Board>().unwrap_err(), ParseError::UnexpectedEof { expected: 4000000000, found: 1 });
        assert_eq!(
            format!("n {} 2\n.\n.", usize::MAX).parse::<Board>().unwrap_err(),
            ParseError::TooLarge { width: usize::MAX, height: 2 },
        );
    }

    #[test]
    fn builder_out_of_bounds() {
        let mut builder = BoardBuilder::square(NonZero::new(3).unwrap());
        builder.add_island(Location(3, 0), 1);
        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::FeatureOutOfBounds]));
        assert!(builder.build().is_err());
    }

    #[test]
    fn remove_island() {
        let board = BoardBuilder::square(NonZero::new(2).unwrap())
            .add_island(Location(0, 0), 1)
            .add_island(Location(1, 1), 1)
            .remove_island(Location(0, 0))
            .build()
            .unwrap();

        assert_eq!(format!("{}", board), "..\n.1\n");
    }

    #[test]
    fn step_invalid() {
        let board = BoardBuilder::default().build().unwrap();
        assert_eq!(board.step(Location(0, 0), Step::Up), None);
        assert_eq!(board.step(Location(4, 0), Step::Right), None);
    }

    #[test]
    fn step_valid() {
        let board = BoardBuilder::default().build().unwrap();
        assert_eq!(board.step(Location(4, 4), Step::Left), Some(Location(3, 4)));
        assert_eq!(board.neighbors(Location(0, 0)).len(), 2);
        assert_eq!(board.neighbors(Location(2, 2)).len(), 4);
    }

    #[test]
    fn solve_single_bridge() {
        assert_eq!(format!("{}", solved(TWO_PAIRS, Connectivity::Adjacency)), "1-1
...
...
");
    }

    #[test]
    fn solve_minimal_row() {
        assert_eq!(format!("{}", solved("n 3 1\n1.1\n", Connectivity::Adjacency)), "1-1\n");
    }

    #[test]
    fn solve_ring() {
        assert_eq!(format!("{}", solved(RING, Connectivity::Adjacency)), "2-2
|.|
2-2
");
    }

    #[test]
    fn solve_double_bridge() {
        assert_eq!(format!("{}", solved(DOUBLE, Connectivity::Adjacency)), "3=2
|..
1..
");
    }

    #[test]
    fn solve_larger() {
        for cardinality in [CardinalityEncoding::SequentialCounter, CardinalityEncoding::Binomial] {
            for connectivity in [Connectivity::Adjacency, Connectivity::Bridged] {
                let board = FIVE.parse::<Board>().unwrap();
                let solved = match board.solve(&SolveOptions { connectivity, cardinality, ..Default::default() }).unwrap() {
                    Verdict::Solved(solved) => solved,
                    other => panic!("expected a solution, got {:?}", other),
                };

                assert_eq!(solved.validate(connectivity), Ok(()));
                assert!(solved.is_connected(Connectivity::Bridged));
            }
        }
    }

    #[test]
    fn single_island_without_bridges() {
        assert_eq!(format!("{}", solved("n 1\n0\n", Connectivity::Adjacency)), "0\n");
    }

    #[test]
    fn empty_board_unsatisfiable() {
        // the root must be a non-empty cell
        assert!(matches!(solve("n 1\n.\n", Connectivity::Adjacency), Verdict::Unsatisfiable));
    }

    #[test]
    fn touching_islands_unsatisfiable() {
        assert!(matches!(solve("n 2\n11\n11\n", Connectivity::Adjacency), Verdict::Unsatisfiable));
        assert!(matches!(solve("n 2 1\n11\n", Connectivity::Adjacency), Verdict::Unsatisfiable));
    }

    #[test]
    fn oversized_clue_unsatisfiable() {
        assert!(matches!(solve("n 3\n9..\n...\n...\n", Connectivity::Adjacency), Verdict::Unsatisfiable));
    }

    #[test]
    fn disconnected_unsatisfiable() {
        assert!(matches!(solve(FAR_CORNERS, Connectivity::Adjacency), Verdict::Unsatisfiable));
        assert!(matches!(solve(FAR_CORNERS, Connectivity::Bridged), Verdict::Unsatisfiable));
    }

    #[test]
    fn touching_structures_depend_on_connectivity() {
        let loose = solved(TOUCHING_ROWS, Connectivity::Adjacency);
        assert_eq!(format!("{}", loose), "1-1
1-1
...
");
        assert_eq!(loose.validate(Connectivity::Adjacency), Ok(()));
        assert_eq!(loose.components(Connectivity::Bridged), 2);
        assert!(matches!(loose.validate(Connectivity::Bridged), Err(crate::Violation::Disconnected { components: 2 })));

        assert!(matches!(solve(TOUCHING_ROWS, Connectivity::Bridged), Verdict::Unsatisfiable));
    }

    #[test]
    fn one_tile_per_cell() {
        let board = FIVE.parse::<Board>().unwrap();
        let compiled = board.compile(&SolveOptions::default());
        let model = model_of(&compiled).unwrap();

        for location in board.locations() {
            let asserted = Tile::VARIANTS.iter()
                .filter(|tile| model.value(compiled.pool.get(&VarKey::Tile { location, tile: **tile }).unwrap()))
                .count();
            assert_eq!(asserted, 1, "cell {}", location);
        }
    }

    #[test]
    fn reachability_is_monotone() {
        let board = RING.parse::<Board>().unwrap();
        let compiled = board.compile(&SolveOptions::default());
        let model = model_of(&compiled).unwrap();
        let solved = decode(&board, &compiled.pool, &model).unwrap();

        let mut roots = 0;
        for location in board.locations() {
            let reach = compiled.pool.reach_vars(location);
            assert_eq!(reach.len(), max_hop(board.cell_count()) + 1);

            let values = reach.iter().map(|(_, var)| model.value(*var)).collect::<Vec<_>>();
            assert!(values.windows(2).all(|pair| !pair[0] || pair[1]), "cell {}: {:?}", location, values);
            assert_eq!(values.last().copied(), Some(solved.tile(location) != Some(Tile::Empty)));

            if values[0] {
                roots += 1;
            }
        }
        assert_eq!(roots, 1);
    }

    #[test]
    fn decoded_tiles_reassert() {
        let board = DOUBLE.parse::<Board>().unwrap();
        let compiled = board.compile(&SolveOptions::default());
        let model = model_of(&compiled).unwrap();
        let solved = decode(&board, &compiled.pool, &model).unwrap();

        let mut solver = Solver::new();
        solver.add_formula(&compiled.formula);
        for (location, tile) in solved.tiles() {
            let var = compiled.pool.get(&VarKey::Tile { location, tile }).unwrap();
            solver.add_clause(&[var.positive()]);
        }
        assert!(solver.solve().unwrap());
    }

    #[test]
    fn dimacs_format() {
        let board = TWO_PAIRS.parse::<Board>().unwrap();
        let compiled = board.compile(&SolveOptions::default());
        let text = compiled.to_string();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some(format!("p cnf {} {}", compiled.var_count(), compiled.clause_count()).as_str()));
        assert_eq!(compiled.var_count(), compiled.pool.var_count());

        let mut clauses = 0;
        for line in lines {
            let lits = line.split(' ').map(|token| token.parse::<isize>().unwrap()).collect::<Vec<_>>();
            assert_eq!(lits.last(), Some(&0));
            assert!(lits.len() > 1);
            assert!(lits[..lits.len() - 1].iter().all(|lit| *lit != 0 && lit.unsigned_abs() <= compiled.var_count()));
            clauses += 1;
        }
        assert_eq!(clauses, compiled.clause_count());

        let mut written = Vec::new();
        compiled.write_dimacs(&mut written).unwrap();
        assert_eq!(String::from_utf8(written).unwrap(), text);
    }

    #[test]
    fn compile_is_deterministic() {
        let board = FIVE.parse::<Board>().unwrap();
        let options = options(Connectivity::Bridged);
        assert_eq!(board.compile(&options).to_string(), board.compile(&options).to_string());
    }

    #[test]
    fn model_from_lits() {
        let model = Model::from(vec![Lit::from_dimacs(1), Lit::from_dimacs(-3)]);
        assert_eq!(model.len(), 3);
        assert!(model.value(varisat::Var::from_dimacs(1)));
        assert!(!model.value(varisat::Var::from_dimacs(2)));
        assert!(!model.value(varisat::Var::from_dimacs(3)));
        assert!(!model.value(varisat::Var::from_dimacs(10)));
    }

    #[test]
    fn cancelled_before_start() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let board = FIVE.parse::<Board>().unwrap();
        let verdict = board.solve(&SolveOptions { cancel: Some(cancel), ..Default::default() }).unwrap();
        assert!(matches!(verdict, Verdict::Cancelled));
    }

    /// `holes + 1` pigeons in `holes` holes, one per hole: unsatisfiable, and hard for CDCL.
    fn pigeonhole(holes: usize) -> CnfFormula {
        let var = |pigeon: usize, hole: usize| Var::from_index(pigeon * holes + hole);
        let mut formula = CnfFormula::new();

        for pigeon in 0..=holes {
            formula.add_clause(&(0..holes).map(|hole| var(pigeon, hole).positive()).collect_vec());
        }
        for hole in 0..holes {
            for (a, b) in (0..=holes).tuple_combinations() {
                formula.add_clause(&[var(a, hole).negative(), var(b, hole).negative()]);
            }
        }

        formula
    }

    #[test]
    fn small_pigeonhole_unsatisfiable() {
        let outcome = VarisatBackend::new().solve(pigeonhole(3)).unwrap();
        assert!(matches!(outcome, SolveOutcome::Unsatisfiable));
    }

    #[test]
    fn cancelled_mid_solve() {
        let cancel = CancelToken::new();
        let backend = VarisatBackend::new().with_cancel(cancel.clone());

        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            cancel.cancel();
        });

        let started = Instant::now();
        let outcome = backend.solve(pigeonhole(12)).unwrap();
        canceller.join().unwrap();

        assert!(matches!(outcome, SolveOutcome::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn timed_out_mid_solve() {
        let backend = VarisatBackend::new().with_timeout(Duration::from_millis(100));

        let started = Instant::now();
        let outcome = backend.solve(pigeonhole(12)).unwrap();

        assert!(matches!(outcome, SolveOutcome::TimedOut));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn zero_timeout() {
        let board = FIVE.parse::<Board>().unwrap();
        let verdict = board.solve(&SolveOptions { timeout: Some(Duration::ZERO), ..Default::default() }).unwrap();
        assert!(matches!(verdict, Verdict::TimedOut));
    }

    #[test]
    fn generous_timeout() {
        let board = DOUBLE.parse::<Board>().unwrap();
        let solved = match board.solve(&SolveOptions { timeout: Some(Duration::from_secs(60)), ..Default::default() }).unwrap() {
            Verdict::Solved(solved) => solved,
            other => panic!("expected a solution, got {:?}", other),
        };
        assert_eq!(format!("{}", solved), "3=2\n|..\n1..\n");
    }

    struct Refuse;

    impl Backend for Refuse {
        fn solve(&self, _formula: CnfFormula) -> Result<SolveOutcome, SolverFailure> {
            Ok(SolveOutcome::Unsatisfiable)
        }
    }

    struct Garbage;

    impl Backend for Garbage {
        fn solve(&self, formula: CnfFormula) -> Result<SolveOutcome, SolverFailure> {
            Ok(SolveOutcome::Satisfiable(Model::from_values(vec![true; formula.var_count()])))
        }
    }

    #[test]
    fn custom_backend() {
        let board = TWO_PAIRS.parse::<Board>().unwrap();
        let options = SolveOptions::default();

        assert!(matches!(board.solve_with(&Refuse, &options), Ok(Verdict::Unsatisfiable)));
        assert!(matches!(board.solve_with(&Garbage, &options), Err(SolverFailure::Decode(_))));
    }

    fn brute_force_check<C: Cardinality>(cardinality: C, n: usize, k: usize, bits: u8) -> Result<(), TestCaseError> {
        let mut pool = VarPool::default();
        let vars = (0..n).map(|_| pool.fresh()).collect::<Vec<_>>();
        let lits = vars.iter().map(|var| var.positive()).collect::<Vec<_>>();
        let assignment = vars.iter().enumerate()
            .map(|(i, var)| var.lit(bits & (1 << i) != 0))
            .collect::<Vec<_>>();
        let count = (0..n).filter(|i| bits & (1 << i) != 0).count();

        let cases: [(Vec<Vec<Lit>>, bool); 3] = [
            (cardinality.at_most(&mut pool, &lits, k), count <= k),
            (cardinality.at_least(&mut pool, &lits, k), count >= k),
            (cardinality.exactly(&mut pool, &lits, k), count == k),
        ];

        for (clauses, expected) in cases {
            let mut solver = Solver::new();
            for clause in &clauses {
                solver.add_clause(clause);
            }
            for lit in &assignment {
                solver.add_clause(&[*lit]);
            }
            prop_assert_eq!(solver.solve().unwrap(), expected, "n = {}, k = {}, bits = {:#b}", n, k, bits);
        }

        Ok(())
    }

    proptest! {
        #[test]
        fn binomial_matches_brute_force(n in 0usize..6, k in 0usize..8, bits in 0u8..64) {
            brute_force_check(Binomial, n, k, bits)?;
        }

        #[test]
        fn sequential_counter_matches_brute_force(n in 0usize..7, k in 0usize..9, bits in 0u8..128) {
            brute_force_check(SequentialCounter, n, k, bits)?;
        }
    }
}
