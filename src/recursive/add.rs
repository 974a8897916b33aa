use tracing::debug;

use super::{RecursiveEngine, shape_mismatch};
use crate::error::Result;
use crate::matrix::QuadMatrix;
use crate::threaded::TaskGroup;

impl RecursiveEngine {
    /// `c = a + b`, quadrant by quadrant in parallel.
    ///
    /// ```
    /// use quadmul::{BaseKernel, QuadMatrix, RecursiveEngine};
    ///
    /// let engine = RecursiveEngine::new(1, BaseKernel::Scalar).unwrap();
    /// let a = QuadMatrix::from_dense(2, 1, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    /// let b = QuadMatrix::from_dense(2, 1, &[10.0, 20.0, 30.0, 40.0]).unwrap();
    /// let mut c = engine.allocate(2).unwrap();
    ///
    /// engine.add(&a, &b, &mut c).unwrap();
    /// assert_eq!(c.to_dense(), vec![11.0, 22.0, 33.0, 44.0]);
    /// ```
    pub fn add(&self, a: &QuadMatrix, b: &QuadMatrix, c: &mut QuadMatrix) -> Result<()> {
        let layout = self.check_operands(&[("A", a), ("B", b), ("C", &*c)])?;
        debug!(size = layout.size(), leaf = layout.leaf(), "recursive add");
        self.add_node(a, b, c)
    }

    fn add_node(&self, a: &QuadMatrix, b: &QuadMatrix, c: &mut QuadMatrix) -> Result<()> {
        match (a, b, &mut *c) {
            (
                QuadMatrix::Leaf { data: a, .. },
                QuadMatrix::Leaf { data: b, .. },
                QuadMatrix::Leaf { data: c, .. },
            ) => {
                self.kernel.add(a, b, c);
                Ok(())
            }
            (
                QuadMatrix::Internal { quadrants: a, .. },
                QuadMatrix::Internal { quadrants: b, .. },
                QuadMatrix::Internal { quadrants: c, .. },
            ) => {
                let mut group = TaskGroup::with_capacity(4);
                for ((a, b), c) in a.iter().zip(b.iter()).zip(c.iter_mut()) {
                    group.spawn(move || self.add_node(a, b, c));
                }
                group.wait()
            }
            _ => Err(shape_mismatch("A", b, a)),
        }
    }

    /// `dst = src + dst`; the combine step after each multiply cohort.
    pub(super) fn accumulate_node(&self, src: &QuadMatrix, dst: &mut QuadMatrix) -> Result<()> {
        match (src, &mut *dst) {
            (QuadMatrix::Leaf { data: src, .. }, QuadMatrix::Leaf { data: dst, .. }) => {
                self.kernel.accumulate(src, dst);
                Ok(())
            }
            (QuadMatrix::Internal { quadrants: src, .. }, QuadMatrix::Internal { quadrants: dst, .. }) => {
                let mut group = TaskGroup::with_capacity(4);
                for (src, dst) in src.iter().zip(dst.iter_mut()) {
                    group.spawn(move || self.accumulate_node(src, dst));
                }
                group.wait()
            }
            _ => Err(shape_mismatch("D", dst, src)),
        }
    }
}
