//! Recursive divide-and-conquer engines over [`QuadMatrix`] trees.
//!
//! At every internal level the multiply runs two cohorts:
//!
//! ```text
//! D11 = A11*B11   C11 = A12*B21   D12 = A11*B12   C12 = A12*B22
//! D21 = A21*B11   C21 = A22*B21   D22 = A21*B12   C22 = A22*B22
//! ---- join ----
//! C11 += D11      C12 += D12      C21 += D21      C22 += D22
//! ---- join ----
//! ```
//!
//! Each task gets its own `&mut` quadrant, so the borrow checker proves the
//! write sets of a cohort are disjoint. Leaves go to the [`BaseKernel`].

mod add;
mod multiply;

use tracing::trace;

use crate::error::{MatmulError, Result};
use crate::kernels::BaseKernel;
use crate::matrix::{Layout, QuadMatrix};

/// Recursive multiply/add over quad-trees built with one block threshold.
///
/// The threshold lives here rather than in global state, so engines with
/// different thresholds can coexist in one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursiveEngine {
    block: usize,
    kernel: BaseKernel,
}

impl RecursiveEngine {
    /// Creates an engine; `kernel` is resolved against the running CPU.
    pub fn new(block: usize, kernel: BaseKernel) -> Result<Self> {
        if block == 0 {
            return Err(MatmulError::ZeroBlock);
        }
        let resolved = kernel.resolve();
        trace!(requested = %kernel, resolved = %resolved, block, "base kernel selected");
        Ok(Self {
            block,
            kernel: resolved,
        })
    }

    pub fn block(&self) -> usize {
        self.block
    }

    /// The concrete kernel leaves are computed with.
    pub fn kernel(&self) -> BaseKernel {
        self.kernel
    }

    /// Layout an n×n operand must have for this engine.
    pub fn layout(&self, size: usize) -> Result<Layout> {
        Layout::new(size, self.block)
    }

    /// Allocates a zeroed n×n matrix shaped for this engine.
    pub fn allocate(&self, size: usize) -> Result<QuadMatrix> {
        QuadMatrix::zeros(self.layout(size)?)
    }

    fn check_operands(&self, operands: &[(&'static str, &QuadMatrix)]) -> Result<Layout> {
        let expected = match operands.first() {
            Some((_, first)) => self.layout(first.size())?,
            None => return Err(MatmulError::ZeroSize),
        };
        for &(operand, matrix) in operands {
            let found = matrix.layout();
            if found != expected {
                return Err(MatmulError::LayoutMismatch {
                    operand,
                    expected,
                    found,
                });
            }
        }
        Ok(expected)
    }
}

/// Error for two nodes that should have the same shape but don't.
///
/// Unreachable after the top-level layout check unless a tree was built by hand.
fn shape_mismatch(operand: &'static str, expected: &QuadMatrix, found: &QuadMatrix) -> MatmulError {
    MatmulError::LayoutMismatch {
        operand,
        expected: expected.layout(),
        found: found.layout(),
    }
}
