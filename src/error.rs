//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

use crate::matrix::Layout;

/// Everything that can go wrong while building, multiplying or serializing matrices.
#[derive(Debug, Error)]
pub enum MatmulError {
    /// Matrix dimension of zero.
    #[error("matrix size must be positive")]
    ZeroSize,

    /// Block threshold of zero.
    #[error("block size must be positive")]
    ZeroBlock,

    /// Explicit thread count of zero.
    #[error("thread count must be positive")]
    ZeroThreads,

    /// The size cannot be halved evenly all the way down to the block threshold.
    #[error("matrix size {size} cannot be split evenly down to block size {block} (odd size {at})")]
    OddSplit { size: usize, block: usize, at: usize },

    /// A matrix of this size cannot be addressed, or a leaf buffer could not be allocated.
    #[error("out of memory allocating a {size}x{size} block")]
    Allocation { size: usize },

    /// An operand does not have the quad-tree shape the operation expects.
    #[error("operand {operand} has layout {found}, expected {expected}")]
    LayoutMismatch {
        operand: &'static str,
        expected: Layout,
        found: Layout,
    },

    /// Dense input slice has the wrong length.
    #[error("{operand}: expected {expected} elements, got {found}")]
    DenseLength {
        operand: &'static str,
        expected: usize,
        found: usize,
    },

    /// Rayon refused to build the worker pool.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed matrix text.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, MatmulError>;
