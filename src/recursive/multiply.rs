use tracing::debug;

use super::{RecursiveEngine, shape_mismatch};
use crate::error::{MatmulError, Result};
use crate::matrix::QuadMatrix;
use crate::threaded::TaskGroup;

impl RecursiveEngine {
    /// `c = a * b`, allocating the top-level scratch matrix itself.
    ///
    /// Runs on whatever rayon pool is current; wrap the call in
    /// [`Scheduler::install`](crate::Scheduler::install) to pick the thread count.
    ///
    /// # Example
    ///
    /// ```
    /// use quadmul::{BaseKernel, QuadMatrix, RecursiveEngine};
    /// use quadmul::matrix::dense::identity;
    ///
    /// let engine = RecursiveEngine::new(2, BaseKernel::Scalar).unwrap();
    /// let values: Vec<f64> = (1..=16).map(f64::from).collect();
    /// let a = QuadMatrix::from_dense(4, 2, &values).unwrap();
    /// let b = QuadMatrix::from_dense(4, 2, &identity(4)).unwrap();
    /// let mut c = engine.allocate(4).unwrap();
    ///
    /// engine.multiply(&a, &b, &mut c).unwrap();
    /// assert_eq!(c.to_dense(), values);
    /// ```
    pub fn multiply(&self, a: &QuadMatrix, b: &QuadMatrix, c: &mut QuadMatrix) -> Result<()> {
        let layout = self.check_operands(&[("A", a), ("B", b), ("C", &*c)])?;
        let mut scratch = QuadMatrix::zeros(layout)?;
        self.multiply_with_scratch(a, b, c, &mut scratch)
    }

    /// `c = a * b` using the caller's `scratch` at the top level.
    ///
    /// All four operands must have this engine's layout. Deeper levels
    /// allocate their own half-size scratch and release it once that level's
    /// additions have joined. `scratch` is clobbered.
    pub fn multiply_with_scratch(
        &self,
        a: &QuadMatrix,
        b: &QuadMatrix,
        c: &mut QuadMatrix,
        scratch: &mut QuadMatrix,
    ) -> Result<()> {
        let layout = self.check_operands(&[("A", a), ("B", b), ("C", &*c), ("D", &*scratch)])?;
        debug!(
            size = layout.size(),
            leaf = layout.leaf(),
            depth = layout.depth(),
            kernel = %self.kernel,
            threads = rayon::current_num_threads(),
            "recursive multiply"
        );
        self.multiply_split(a, b, c, scratch)
    }

    /// One recursive call: leaf kernel, or a fresh scratch plus the two cohorts.
    fn multiply_node(&self, a: &QuadMatrix, b: &QuadMatrix, c: &mut QuadMatrix) -> Result<()> {
        if c.is_leaf() {
            return self.multiply_leaf(a, b, c);
        }
        let mut scratch = QuadMatrix::zeros(c.layout())?;
        self.multiply_split(a, b, c, &mut scratch)
    }

    fn multiply_leaf(&self, a: &QuadMatrix, b: &QuadMatrix, c: &mut QuadMatrix) -> Result<()> {
        let (QuadMatrix::Leaf { size, data: a_data }, QuadMatrix::Leaf { data: b_data, .. }) = (a, b)
        else {
            let (operand, found) = if a.is_leaf() { ("B", b) } else { ("A", a) };
            return Err(shape_mismatch(operand, c, found));
        };
        match c {
            QuadMatrix::Leaf { data, .. } => {
                self.kernel.multiply(a_data, b_data, data, *size);
                Ok(())
            }
            QuadMatrix::Internal { .. } => Err(shape_mismatch("C", a, c)),
        }
    }

    fn multiply_split(
        &self,
        a: &QuadMatrix,
        b: &QuadMatrix,
        c: &mut QuadMatrix,
        d: &mut QuadMatrix,
    ) -> Result<()> {
        if c.is_leaf() {
            return self.multiply_leaf(a, b, c);
        }

        let (Some(a), Some(b)) = (a.quadrants(), b.quadrants()) else {
            return Err(shape_mismatch("A", c, if a.is_leaf() { a } else { b }));
        };
        let (expected, found) = (c.layout(), d.layout());
        let (Some(c), Some(d)) = (c.quadrants_mut(), d.quadrants_mut()) else {
            return Err(MatmulError::LayoutMismatch {
                operand: "D",
                expected,
                found,
            });
        };

        let [a11, a12, a21, a22] = a;
        let [b11, b12, b21, b22] = b;
        let [c11, c12, c21, c22] = c;
        let [d11, d12, d21, d22] = d;

        let mut products = TaskGroup::with_capacity(8);
        products.spawn(|| self.multiply_node(a11, b11, d11));
        products.spawn(|| self.multiply_node(a12, b21, c11));
        products.spawn(|| self.multiply_node(a11, b12, d12));
        products.spawn(|| self.multiply_node(a12, b22, c12));
        products.spawn(|| self.multiply_node(a21, b11, d21));
        products.spawn(|| self.multiply_node(a22, b21, c21));
        products.spawn(|| self.multiply_node(a21, b12, d22));
        products.spawn(|| self.multiply_node(a22, b22, c22));
        products.wait()?;

        let mut sums = TaskGroup::with_capacity(4);
        sums.spawn(|| self.accumulate_node(d11, c11));
        sums.spawn(|| self.accumulate_node(d12, c12));
        sums.spawn(|| self.accumulate_node(d21, c21));
        sums.spawn(|| self.accumulate_node(d22, c22));
        sums.wait()
    }
}
