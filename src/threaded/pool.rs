use tracing::debug;

use crate::error::{MatmulError, Result};

/// The worker pool a run executes on.
///
/// Built once with an explicit thread count and torn down on drop. Anything
/// executed through [`Scheduler::install`] (including nested
/// [`TaskGroup`](super::TaskGroup) cohorts) runs on this pool.
pub struct Scheduler {
    pool: rayon::ThreadPool,
}

impl Scheduler {
    /// Builds a pool with `threads` workers.
    ///
    /// `None` lets rayon decide, which honors `RAYON_NUM_THREADS` and
    /// otherwise uses the number of logical CPUs.
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|index| format!("quadmul-worker-{}", index));

        if let Some(threads) = threads {
            if threads == 0 {
                return Err(MatmulError::ZeroThreads);
            }
            builder = builder.num_threads(threads);
        }

        let pool = builder.build()?;
        debug!(threads = pool.current_num_threads(), "scheduler ready");
        Ok(Self { pool })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `op` inside the pool and returns its result.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}
