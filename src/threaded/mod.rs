//! Fork-join plumbing for the recursive engines.
//!
//! The engines only ever need "submit a cohort of closures, wait for all of
//! them". [`TaskGroup`] is that cohort; [`Scheduler`] owns the worker pool
//! the cohorts run on.
//!
//! - `task_group`: cohort + join barrier with error propagation
//! - `pool`: sized rayon pool, built once per run

pub mod pool;
pub mod task_group;

pub use pool::Scheduler;
pub use task_group::TaskGroup;
