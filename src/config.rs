//! Run configuration shared by the binary and library callers.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::{MatmulError, Result};
use crate::kernels::BaseKernel;
use crate::matrix::Layout;
use crate::recursive::RecursiveEngine;
use crate::threaded::Scheduler;

/// Everything one multiplication run needs to know up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Matrix dimension n.
    pub size: usize,
    /// Recursion stops once a quadrant is at or below this size.
    pub block: usize,
    /// Worker threads; `None` defers to rayon.
    pub threads: Option<usize>,
    pub kernel: BaseKernel,
    /// Seed for the random operands; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl RunConfig {
    pub fn new(size: usize, block: usize) -> Self {
        Self {
            size,
            block,
            threads: None,
            kernel: BaseKernel::default(),
            seed: None,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_kernel(mut self, kernel: BaseKernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks every parameter before anything is allocated.
    pub fn validate(&self) -> Result<Layout> {
        if self.threads == Some(0) {
            return Err(MatmulError::ZeroThreads);
        }
        Layout::new(self.size, self.block)
    }

    pub fn engine(&self) -> Result<RecursiveEngine> {
        RecursiveEngine::new(self.block, self.kernel)
    }

    pub fn scheduler(&self) -> Result<Scheduler> {
        Scheduler::new(self.threads)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
