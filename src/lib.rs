//! Recursive matrix multiplication on a quad-tree layout.
//!
//! An n×n matrix is stored as four (n/2)×(n/2) quadrants, recursively, until
//! a quadrant fits the block threshold and becomes a dense row-major block.
//! Multiplication follows the same shape: eight half-size products run as
//! one fork-join cohort, then four additions fold the scratch products into
//! the result as a second cohort.
//!
//! ## Usage
//!
//! ```
//! use quadmul::multiply;
//!
//! let a = vec![1.0f64; 64 * 64];
//! let b = vec![1.0f64; 64 * 64];
//! let mut c = vec![0.0f64; 64 * 64];
//!
//! multiply(&a, &b, &mut c, 64, 16).unwrap();
//! assert!(c.iter().all(|&x| x == 64.0));
//! ```
//!
//! With an explicit worker count:
//!
//! ```
//! use quadmul::multiply_parallel;
//!
//! let a = vec![1.0f64; 256 * 256];
//! let b = vec![1.0f64; 256 * 256];
//! let mut c = vec![0.0f64; 256 * 256];
//!
//! multiply_parallel(&a, &b, &mut c, 256, 32, 4).unwrap();
//! ```
//!
//! For repeated runs, build the pieces yourself: [`QuadMatrix`] operands,
//! a [`RecursiveEngine`] and a [`Scheduler`].
//!
//! ## What's inside
//!
//! - Quad-tree storage with borrow-based quadrant views
//! - 8-way multiply / 4-way add fork-join on rayon
//! - Scalar, cache-blocked and AVX2 base-case kernels

pub mod config;
pub mod error;
pub mod kernels;
pub mod logging;
pub mod matrix;
pub mod recursive;
pub mod threaded;

pub use config::RunConfig;
pub use error::{MatmulError, Result};
pub use kernels::BaseKernel;
pub use matrix::{Layout, QuadMatrix};
pub use recursive::RecursiveEngine;
pub use threaded::Scheduler;

/// Matrix multiply on row-major slices: C = A * B, single worker.
///
/// All three matrices are n×n; `c` is overwritten. `n` must halve evenly
/// down to `block`.
///
/// # Errors
///
/// Invalid sizes, mismatched slice lengths or allocation failure.
pub fn multiply(a: &[f64], b: &[f64], c: &mut [f64], n: usize, block: usize) -> Result<()> {
    multiply_dense(a, b, c, n, block, Some(1))
}

/// Same as [`multiply`] but runs the recursion on `num_threads` workers.
pub fn multiply_parallel(
    a: &[f64],
    b: &[f64],
    c: &mut [f64],
    n: usize,
    block: usize,
    num_threads: usize,
) -> Result<()> {
    multiply_dense(a, b, c, n, block, Some(num_threads))
}

fn multiply_dense(
    a: &[f64],
    b: &[f64],
    c: &mut [f64],
    n: usize,
    block: usize,
    threads: Option<usize>,
) -> Result<()> {
    let config = RunConfig {
        threads,
        ..RunConfig::new(n, block)
    };
    let layout = config.validate()?;
    for (operand, found) in [("A", a.len()), ("B", b.len()), ("C", c.len())] {
        if found != layout.len() {
            return Err(MatmulError::DenseLength {
                operand,
                expected: layout.len(),
                found,
            });
        }
    }

    let engine = config.engine()?;
    let qa = QuadMatrix::from_dense(n, block, a)?;
    let qb = QuadMatrix::from_dense(n, block, b)?;
    let mut qc = QuadMatrix::zeros(layout)?;
    let mut qd = QuadMatrix::zeros(layout)?;

    let scheduler = config.scheduler()?;
    scheduler.install(|| engine.multiply_with_scratch(&qa, &qb, &mut qc, &mut qd))?;

    c.copy_from_slice(&qc.to_dense());
    Ok(())
}
