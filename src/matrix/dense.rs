//! Row-major reference routines.
//!
//! These are the correctness baseline for the recursive engine: slow,
//! obvious, and independent of the quad-tree code.

/// Textbook i-j-k product of two row-major n×n matrices: `C = A * B`.
///
/// Overwrites `c`. Use this for verification, not for performance.
///
/// # Panics
///
/// Panics if any slice is not `n * n` long.
pub fn matmul_reference(a: &[f64], b: &[f64], c: &mut [f64], n: usize) {
    assert_eq!(a.len(), n * n, "A: expected {}x{}={} elements", n, n, n * n);
    assert_eq!(b.len(), n * n, "B: expected {}x{}={} elements", n, n, n * n);
    assert_eq!(c.len(), n * n, "C: expected {}x{}={} elements", n, n, n * n);

    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0;
            for p in 0..n {
                sum += a[i * n + p] * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
}

/// Row-major n×n identity.
pub fn identity(n: usize) -> Vec<f64> {
    let mut m = vec![0.0; n * n];
    for i in 0..n {
        m[i * n + i] = 1.0;
    }
    m
}

/// Largest elementwise difference, scaled by the magnitude of `expected`.
///
/// Returns 0 for empty input and infinity if any difference is NaN.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn max_relative_error(expected: &[f64], actual: &[f64]) -> f64 {
    assert_eq!(expected.len(), actual.len(), "length mismatch");

    expected
        .iter()
        .zip(actual)
        .map(|(e, a)| (e - a).abs() / e.abs().max(1.0))
        .fold(0.0, |worst, err| if err.is_nan() { f64::INFINITY } else { worst.max(err) })
}
