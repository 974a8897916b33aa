//! k-tiled i-k-j kernel.

/// Depth of one k tile. Keeps the touched rows of B resident in L1/L2
/// while a full row of C is updated.
const K_TILE: usize = 128;

/// Cache-friendly kernel: `c = a * b` with the j loop innermost.
///
/// Both B and C are walked with stride 1 in the inner loop, which lets the
/// compiler vectorize it. C is zeroed first and then accumulated tile by tile.
pub fn multiply(a: &[f64], b: &[f64], c: &mut [f64], n: usize) {
    c.fill(0.0);

    for kk in (0..n).step_by(K_TILE) {
        let k_end = (kk + K_TILE).min(n);

        for (i, c_row) in c.chunks_exact_mut(n).enumerate() {
            let a_row = &a[i * n..(i + 1) * n];
            for p in kk..k_end {
                let a_ip = a_row[p];
                let b_row = &b[p * n..(p + 1) * n];
                for (c_ij, b_pj) in c_row.iter_mut().zip(b_row) {
                    *c_ij += a_ip * b_pj;
                }
            }
        }
    }
}
