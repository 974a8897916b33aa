use std::ops::Range;

/// Dot-product kernel: each `c[i][j]` is one running sum over k.
///
/// The innermost loop walks B with stride `n`, which is slow for big
/// blocks but keeps the summation order fixed.
pub fn multiply(a: &[f64], b: &[f64], c: &mut [f64], n: usize) {
    multiply_region(a, b, c, n, 0..n, 0..n);
}

/// Same as [`multiply`] restricted to a rectangle of C.
///
/// The SIMD kernel uses this for rows and columns that don't fill a tile.
pub(crate) fn multiply_region(
    a: &[f64],
    b: &[f64],
    c: &mut [f64],
    n: usize,
    rows: Range<usize>,
    cols: Range<usize>,
) {
    for i in rows {
        let a_row = &a[i * n..(i + 1) * n];
        for j in cols.clone() {
            let mut sum = 0.0;
            for (p, a_ip) in a_row.iter().enumerate() {
                sum += a_ip * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
}
