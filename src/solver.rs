use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use thiserror::Error;
use varisat::{CnfFormula, Solver};

use crate::connectivity::Connectivity;
use crate::decode::{DecodeError, Model};
use crate::logic::CardinalityEncoding;
use crate::solved::SolvedBoard;

/// How often a waiting caller checks its [`CancelToken`].
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Reasons solving may fail outright, as opposed to reaching a [`Verdict`].
#[derive(Debug, Error)]
pub enum SolverFailure {
    /// The SAT backend reported an error of its own.
    #[error("SAT backend failed: {0}")]
    Backend(String),
    /// The worker thread went away without a result, most likely by panicking.
    #[error("solver worker exited without reporting a result")]
    WorkerLost,
    /// The model did not describe a board. This should never happen.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A shared flag which asks a running solve to give up.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token which has not been cancelled yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every solve holding a clone of this token to stop. There is no way back.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`Self::cancel`] was called on this token or a clone of it.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Everything that can be tuned about compiling and solving a board.
#[derive(Clone, Debug, Default)]
pub struct SolveOptions {
    /// What counts as connected.
    pub connectivity: Connectivity,
    /// How cardinality constraints are encoded.
    pub cardinality: CardinalityEncoding,
    /// Give up after this long. [`None`] waits as long as it takes.
    pub timeout: Option<Duration>,
    /// Give up once this is cancelled.
    pub cancel: Option<CancelToken>,
}

/// What a [`Backend`] found out about a formula.
#[derive(Clone, Debug)]
pub enum SolveOutcome {
    /// A satisfying assignment was found.
    Satisfiable(Model),
    /// No assignment satisfies the formula.
    Unsatisfiable,
    /// The timeout ran out first.
    TimedOut,
    /// The cancel token fired first.
    Cancelled,
}

/// What became of a board.
#[derive(Clone, Debug)]
pub enum Verdict {
    /// The decoded solution.
    Solved(SolvedBoard),
    /// The puzzle has no solution. This is an answer, not an error.
    Unsatisfiable,
    /// The timeout ran out first.
    TimedOut,
    /// The cancel token fired first.
    Cancelled,
}

/// A SAT engine.
pub trait Backend {
    /// Decide `formula`, returning a model if it is satisfiable.
    fn solve(&self, formula: CnfFormula) -> Result<SolveOutcome, SolverFailure>;
}

/// [`varisat`] as a [`Backend`].
///
/// Without a timeout or cancel token the solve runs on the calling thread.
/// Otherwise a worker thread owns the solver for its whole life, and the caller waits on it in short slices.
/// `varisat` cannot be interrupted, so a worker that runs out of time is detached and its result dropped.
#[derive(Clone, Debug, Default)]
pub struct VarisatBackend {
    timeout: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl From<&SolveOptions> for VarisatBackend {
    fn from(options: &SolveOptions) -> Self {
        Self {
            timeout: options.timeout,
            cancel: options.cancel.clone(),
        }
    }
}

fn run_varisat(formula: &CnfFormula) -> Result<SolveOutcome, SolverFailure> {
    let mut solver = Solver::new();
    solver.add_formula(formula);

    match solver.solve() {
        Ok(true) => solver.model()
            .map(|model| SolveOutcome::Satisfiable(Model::from(model)))
            .ok_or_else(|| SolverFailure::Backend("no model after a satisfiable result".to_string())),
        Ok(false) => Ok(SolveOutcome::Unsatisfiable),
        Err(err) => Err(SolverFailure::Backend(err.to_string())),
    }
}

impl VarisatBackend {
    /// A backend which waits as long as it takes on the calling thread.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Give up once `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn solve_on_worker(&self, formula: CnfFormula) -> Result<SolveOutcome, SolverFailure> {
        let (sender, receiver) = mpsc::sync_channel(1);

        thread::Builder::new()
            .name("varisat".to_string())
            .spawn(move || {
                // nobody is listening any more if the caller timed out
                let _ = sender.send(run_varisat(&formula));
            })
            .map_err(|err| SolverFailure::Backend(err.to_string()))?;

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);

        loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                warn!("solve cancelled");
                return Ok(SolveOutcome::Cancelled);
            }

            let mut wait = POLL_INTERVAL;
            if let Some(deadline) = deadline {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    warn!("solve timed out after {:?}", self.timeout.unwrap_or_default());
                    return Ok(SolveOutcome::TimedOut);
                }
                wait = wait.min(remaining);
            }

            match receiver.recv_timeout(wait) {
                Ok(result) => return result,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(SolverFailure::WorkerLost),
            }
        }
    }
}

impl Backend for VarisatBackend {
    fn solve(&self, formula: CnfFormula) -> Result<SolveOutcome, SolverFailure> {
        debug!("handing {} clauses over {} variables to varisat", formula.len(), formula.var_count());
        let started = Instant::now();

        let outcome = match (self.timeout, &self.cancel) {
            (None, None) => run_varisat(&formula),
            _ => self.solve_on_worker(formula),
        }?;

        info!("{} after {:?}", match outcome {
            SolveOutcome::Satisfiable(_) => "satisfiable",
            SolveOutcome::Unsatisfiable => "unsatisfiable",
            SolveOutcome::TimedOut => "timed out",
            SolveOutcome::Cancelled => "cancelled",
        }, started.elapsed());

        Ok(outcome)
    }
}
