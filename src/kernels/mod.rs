//! Dense base-case kernels for leaf blocks.
//!
//! Every strategy computes `C = A * B` (overwrite, not accumulate) on a
//! row-major n×n block, single-threaded. They differ only in loop order and
//! vectorization, so results agree up to floating-point summation order.
//!
//! Available strategies:
//! - `scalar`: i-j-k dot products, bit-reproducible
//! - `blocked`: k-tiled i-k-j loops, stride-1 inner loop
//! - `simd`: 4×4 AVX2/FMA register tiles (x86_64 only)

pub mod blocked;
pub mod scalar;
pub mod simd;

use std::fmt;

/// Which dense kernel runs once the recursion reaches a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum BaseKernel {
    /// Plain dot-product loop. Deterministic across runs and thread counts.
    Scalar,
    /// Cache-friendly i-k-j loop tiled over k.
    Blocked,
    /// AVX2 + FMA 4×4 tiles. Falls back to `Blocked` on CPUs without them.
    Simd,
    /// `Simd` when the CPU supports it, otherwise `Blocked`.
    #[default]
    Auto,
}

impl BaseKernel {
    /// Picks the concrete strategy this CPU will actually run.
    ///
    /// ```
    /// use quadmul::BaseKernel;
    ///
    /// assert_eq!(BaseKernel::Scalar.resolve(), BaseKernel::Scalar);
    /// assert_ne!(BaseKernel::Auto.resolve(), BaseKernel::Auto);
    /// ```
    pub fn resolve(self) -> Self {
        match self {
            BaseKernel::Auto | BaseKernel::Simd if simd::is_available() => BaseKernel::Simd,
            BaseKernel::Auto | BaseKernel::Simd => BaseKernel::Blocked,
            other => other,
        }
    }

    /// `c = a * b` for row-major n×n blocks.
    ///
    /// # Panics
    ///
    /// Panics if the slice sizes don't match n.
    pub fn multiply(self, a: &[f64], b: &[f64], c: &mut [f64], n: usize) {
        assert_eq!(a.len(), n * n, "A: expected {}x{}={} elements", n, n, n * n);
        assert_eq!(b.len(), n * n, "B: expected {}x{}={} elements", n, n, n * n);
        assert_eq!(c.len(), n * n, "C: expected {}x{}={} elements", n, n, n * n);

        match self {
            BaseKernel::Scalar => scalar::multiply(a, b, c, n),
            BaseKernel::Blocked => blocked::multiply(a, b, c, n),
            BaseKernel::Simd | BaseKernel::Auto => simd::multiply(a, b, c, n),
        }
    }

    /// `c = a + b`, elementwise. Same for every strategy.
    pub fn add(self, a: &[f64], b: &[f64], c: &mut [f64]) {
        assert!(
            a.len() == c.len() && b.len() == c.len(),
            "add: operand lengths {} + {} -> {}",
            a.len(),
            b.len(),
            c.len()
        );
        for ((c, a), b) in c.iter_mut().zip(a).zip(b) {
            *c = a + b;
        }
    }

    /// `dst = src + dst`, elementwise.
    pub fn accumulate(self, src: &[f64], dst: &mut [f64]) {
        assert_eq!(src.len(), dst.len(), "accumulate: length mismatch");
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s + *d;
        }
    }
}

impl fmt::Display for BaseKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BaseKernel::Scalar => "scalar",
            BaseKernel::Blocked => "blocked",
            BaseKernel::Simd => "simd",
            BaseKernel::Auto => "auto",
        };
        f.write_str(name)
    }
}
