//! 4×4 AVX2 register-tile kernel.
//!
//! Works straight on the row-major leaf (no packing): leaves are at most a
//! block wide, so B's rows are already cache resident. Rows and columns
//! beyond the last full tile go through the scalar kernel.

use super::blocked;

/// True if this CPU can run the AVX2 + FMA path.
pub fn is_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

/// `c = a * b`, vectorized when possible, otherwise the blocked kernel.
pub fn multiply(a: &[f64], b: &[f64], c: &mut [f64], n: usize) {
    #[cfg(target_arch = "x86_64")]
    {
        if is_available() {
            // SAFETY: feature check above; slice lengths are asserted by the dispatcher.
            unsafe { multiply_avx2(a, b, c, n) };
            return;
        }
    }

    blocked::multiply(a, b, c, n);
}

/// Computes full 4×4 tiles of C with four YMM accumulators (one per row),
/// broadcasting A and FMA-ing against one 4-wide load of B per k step.
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports AVX2 and FMA
/// - `a`, `b` and `c` each hold `n * n` values
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn multiply_avx2(a: &[f64], b: &[f64], c: &mut [f64], n: usize) {
    use std::arch::x86_64::*;

    let n_main = (n / 4) * 4;
    let b_ptr = b.as_ptr();
    let c_ptr = c.as_mut_ptr();

    for i in (0..n_main).step_by(4) {
        let rows = [
            &a[i * n..(i + 1) * n],
            &a[(i + 1) * n..(i + 2) * n],
            &a[(i + 2) * n..(i + 3) * n],
            &a[(i + 3) * n..(i + 4) * n],
        ];

        for j in (0..n_main).step_by(4) {
            let mut c0 = _mm256_setzero_pd();
            let mut c1 = _mm256_setzero_pd();
            let mut c2 = _mm256_setzero_pd();
            let mut c3 = _mm256_setzero_pd();

            for p in 0..n {
                let b_vec = _mm256_loadu_pd(b_ptr.add(p * n + j));

                c0 = _mm256_fmadd_pd(_mm256_set1_pd(rows[0][p]), b_vec, c0);
                c1 = _mm256_fmadd_pd(_mm256_set1_pd(rows[1][p]), b_vec, c1);
                c2 = _mm256_fmadd_pd(_mm256_set1_pd(rows[2][p]), b_vec, c2);
                c3 = _mm256_fmadd_pd(_mm256_set1_pd(rows[3][p]), b_vec, c3);
            }

            _mm256_storeu_pd(c_ptr.add(i * n + j), c0);
            _mm256_storeu_pd(c_ptr.add((i + 1) * n + j), c1);
            _mm256_storeu_pd(c_ptr.add((i + 2) * n + j), c2);
            _mm256_storeu_pd(c_ptr.add((i + 3) * n + j), c3);
        }
    }

    // Leftover columns of the tiled rows, then the leftover rows in full
    if n_main < n {
        super::scalar::multiply_region(a, b, c, n, 0..n_main, n_main..n);
        super::scalar::multiply_region(a, b, c, n, n_main..n, 0..n);
    }
}
