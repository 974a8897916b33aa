use rayon::prelude::{IntoParallelIterator, ParallelIterator};

use crate::error::Result;

/// A boxed unit of work borrowed for the lifetime of its cohort.
pub type Task<'scope> = Box<dyn FnOnce() -> Result<()> + Send + 'scope>;

/// A cohort of independent tasks that share one join barrier.
///
/// Tasks are only collected by [`TaskGroup::spawn`]; nothing runs until
/// [`TaskGroup::wait`], which executes the whole cohort on the current rayon
/// pool (the calling thread included) and returns once every task finished.
///
/// There is no cancellation: a failing task does not stop its siblings. The
/// first error in spawn order is returned after the barrier. Panics propagate.
///
/// ```
/// use quadmul::threaded::TaskGroup;
///
/// let mut halves = [0u64; 2];
/// let (left, right) = halves.split_at_mut(1);
///
/// let mut group = TaskGroup::with_capacity(2);
/// group.spawn(|| { left[0] = (1..=10).sum(); Ok(()) });
/// group.spawn(|| { right[0] = (11..=20).sum(); Ok(()) });
/// group.wait().unwrap();
///
/// assert_eq!(halves, [55, 155]);
/// ```
#[must_use = "tasks only run when the group is waited on"]
pub struct TaskGroup<'scope> {
    tasks: Vec<Task<'scope>>,
}

impl<'scope> TaskGroup<'scope> {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tasks: Vec::with_capacity(capacity),
        }
    }

    /// Adds a task to the cohort.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: FnOnce() -> Result<()> + Send + 'scope,
    {
        self.tasks.push(Box::new(task));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Runs the cohort and blocks until every task in it has completed.
    pub fn wait(self) -> Result<()> {
        let outcomes: Vec<Result<()>> = self.tasks.into_par_iter().map(|task| task()).collect();
        outcomes.into_iter().collect()
    }
}

impl Default for TaskGroup<'_> {
    fn default() -> Self {
        Self::new()
    }
}
