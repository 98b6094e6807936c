//! Job dispatch for the parallel edge phases.
//!
//! Each phase is a list of independent jobs. A job receives its own
//! [`SmallRng`] derived from the run seed, the phase and the job index, so
//! the documents it emits do not depend on thread scheduling. The phase joins
//! every job before returning.

use std::{
    fmt,
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use rand::{SeedableRng, rngs::SmallRng};
use tracing::{debug, warn};

use crate::{
    Result, batch::BatchStats, cancel::CancellationToken, error::GeneratorError,
};

/// SplitMix64 increment (the 64-bit golden ratio).
const JOB_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

/// Stage of a run, used to decorrelate job seeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Vertex,
    Intra,
    Inter,
}

impl Phase {
    const fn tag(self) -> u64 {
        match self {
            Self::Vertex => 1,
            Self::Intra => 2,
            Self::Inter => 3,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Intra => "intra",
            Self::Inter => "inter",
        }
    }
}

#[inline]
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(JOB_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}

/// Seed of job `index` of `phase`.
#[inline]
pub(crate) fn mix_job_seed(base_seed: u64, phase: Phase, index: usize) -> u64 {
    let phase_seed = splitmix64(base_seed ^ phase.tag().wrapping_mul(JOB_SEED_SPACING));
    splitmix64(phase_seed ^ ((index as u64 + 1).wrapping_mul(JOB_SEED_SPACING)))
}

/// RNG of job `index` of `phase`.
pub(crate) fn job_rng(base_seed: u64, phase: Phase, index: usize) -> SmallRng {
    SmallRng::seed_from_u64(mix_job_seed(base_seed, phase, index))
}

/// Fixed-size pool running the jobs of a phase.
pub(crate) struct WorkerPool {
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
    workers: NonZeroUsize,
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl WorkerPool {
    /// Builds a pool of `workers` threads.
    ///
    /// # Errors
    /// Returns [`GeneratorError::WorkerPool`] when the threads cannot be
    /// spawned.
    pub(crate) fn new(workers: NonZeroUsize) -> Result<Self> {
        #[cfg(feature = "parallel")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers.get())
                .thread_name(|index| format!("cliquegen-worker-{index}"))
                .build()
                .map_err(|err| GeneratorError::WorkerPool {
                    message: err.to_string().into(),
                })?;
            Ok(Self { pool, workers })
        }
        #[cfg(not(feature = "parallel"))]
        {
            Ok(Self { workers })
        }
    }

    pub(crate) const fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Runs every job of `phase` and joins them.
    ///
    /// A failing job cancels `cancel` so its siblings stop at their next
    /// flush. The first error in job order that is not
    /// [`GeneratorError::Cancelled`] is returned; `Cancelled` is returned
    /// only when nothing else failed.
    pub(crate) fn run<J, F>(
        &self,
        phase: Phase,
        seed: u64,
        jobs: &[J],
        cancel: &CancellationToken,
        run_job: F,
    ) -> Result<BatchStats>
    where
        J: fmt::Display + Sync,
        F: Fn(&J, &mut SmallRng) -> Result<BatchStats> + Sync,
    {
        let execute = |index: usize, job: &J| -> Result<BatchStats> {
            let started = Instant::now();
            let mut rng = job_rng(seed, phase, index);
            let outcome = run_job(job, &mut rng);
            match &outcome {
                Ok(stats) => debug!(
                    phase = phase.as_str(),
                    job = %job,
                    edges = stats.documents,
                    batches = stats.batches,
                    elapsed_ms = whole_millis(started.elapsed()),
                    "job finished"
                ),
                Err(GeneratorError::Cancelled) => {
                    warn!(phase = phase.as_str(), job = %job, "job cancelled");
                }
                Err(err) => {
                    cancel.cancel();
                    warn!(
                        phase = phase.as_str(),
                        job = %job,
                        code = %err.code(),
                        error = %err,
                        "job failed"
                    );
                }
            }
            outcome
        };

        #[cfg(feature = "parallel")]
        let outcomes: Vec<Result<BatchStats>> = {
            use rayon::prelude::*;
            self.pool.install(|| {
                jobs.par_iter()
                    .enumerate()
                    .map(|(index, job)| execute(index, job))
                    .collect()
            })
        };
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<Result<BatchStats>> = jobs
            .iter()
            .enumerate()
            .map(|(index, job)| execute(index, job))
            .collect();

        join_outcomes(outcomes)
    }
}

/// Folds job outcomes into phase counters or the root-cause error.
fn join_outcomes(outcomes: Vec<Result<BatchStats>>) -> Result<BatchStats> {
    let mut total = BatchStats::default();
    let mut cancelled = false;
    for outcome in outcomes {
        match outcome {
            Ok(stats) => total = total.merge(stats),
            Err(GeneratorError::Cancelled) => cancelled = true,
            Err(err) => return Err(err),
        }
    }
    if cancelled {
        Err(GeneratorError::Cancelled)
    } else {
        Ok(total)
    }
}

/// Milliseconds in `elapsed`, saturating at `u64::MAX`.
fn whole_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
