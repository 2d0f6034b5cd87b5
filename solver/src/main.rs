//! Command-line front end: read a puzzle file, then either print its CNF as DIMACS or solve it.
//!
//! ```text
//! $ bridgesat puzzle.txt 1 > puzzle.cnf
//! $ bridgesat puzzle.txt 0 --timeout 30
//! 3=2
//! |..
//! 1..
//! ```

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use bridgesat::{Board, CardinalityEncoding, Connectivity, SolveOptions, Verdict};
use clap::{Parser, ValueEnum};
use log::{debug, LevelFilter};

/// Mode which prints the formula instead of solving it.
const DIMACS_MODE: i64 = 1;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ConnectivityArg {
    /// Touching non-empty cells count as connected
    Adjacency,
    /// Only bridges connect
    Bridged,
}

impl From<ConnectivityArg> for Connectivity {
    fn from(value: ConnectivityArg) -> Self {
        match value {
            ConnectivityArg::Adjacency => Connectivity::Adjacency,
            ConnectivityArg::Bridged => Connectivity::Bridged,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CardinalityArg {
    /// Sinz sequential counter
    Sequential,
    /// One clause per forbidden combination
    Binomial,
}

impl From<CardinalityArg> for CardinalityEncoding {
    fn from(value: CardinalityArg) -> Self {
        match value {
            CardinalityArg::Sequential => CardinalityEncoding::SequentialCounter,
            CardinalityArg::Binomial => CardinalityEncoding::Binomial,
        }
    }
}

/// Compile a bridges puzzle to SAT, and optionally solve it.
#[derive(Parser)]
#[command(about, long_about = None, version)]
struct Args {
    /// Puzzle file: an `n <dim>` header followed by one row of `.` and clue digits per line
    problem_file: PathBuf,

    /// 1 prints the formula in DIMACS format, anything else solves the puzzle
    #[arg(allow_negative_numbers = true)]
    mode: i64,

    /// Give up solving after this many seconds
    #[arg(short, long)]
    timeout: Option<f64>,

    /// What counts as connected
    #[arg(value_enum, short, long, default_value_t = ConnectivityArg::Adjacency)]
    connectivity: ConnectivityArg,

    /// How cardinality constraints are encoded
    #[arg(value_enum, short = 'k', long, default_value_t = CardinalityArg::Sequential)]
    cardinality: CardinalityArg,

    /// Enable debug messages
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

fn read_board(path: &Path) -> Result<Board> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file {}", path.display()))?;
    let board = text.parse::<Board>()
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    debug!("read a {}x{} board with {} islands", board.dims().0, board.dims().1, board.islands().count());
    Ok(board)
}

fn timeout(seconds: Option<f64>) -> Result<Option<Duration>> {
    seconds
        .map(|seconds| Duration::try_from_secs_f64(seconds).context("Timeout must be a non-negative number of seconds"))
        .transpose()
}

fn run(args: Args) -> Result<()> {
    let board = read_board(&args.problem_file)?;

    let options = SolveOptions {
        connectivity: args.connectivity.into(),
        cardinality: args.cardinality.into(),
        timeout: timeout(args.timeout)?,
        cancel: None,
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.mode == DIMACS_MODE {
        board.compile(&options).write_dimacs(&mut out).context("Failed to write formula")?;
    } else {
        match board.solve(&options)? {
            Verdict::Solved(solved) => write!(out, "{}", solved)?,
            Verdict::Unsatisfiable => writeln!(out, "UNSAT")?,
            Verdict::TimedOut => writeln!(out, "TIMEOUT")?,
            Verdict::Cancelled => writeln!(out, "CANCELLED")?,
        }
    }

    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.debug {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
