//! The recursive matrix representation.

use rand::Rng;

use super::Layout;
use crate::error::{MatmulError, Result};

/// One of the four (n/2)×(n/2) submatrices of an n×n matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Position of this quadrant in an internal node's child array.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Maps a global coordinate at level `size` to its quadrant and the
    /// coordinate local to that quadrant.
    ///
    /// ```
    /// use quadmul::matrix::Quadrant;
    ///
    /// assert_eq!(Quadrant::locate(5, 1, 8), (Quadrant::BottomLeft, 1, 1));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `size < 2`: a 1×1 level has no quadrants.
    pub fn locate(row: usize, col: usize, size: usize) -> (Quadrant, usize, usize) {
        assert!(size >= 2, "cannot split a {}x{} level into quadrants", size, size);
        let half = size / 2;
        let q = Self::ALL[2 * usize::from(row >= half) + usize::from(col >= half)];
        (q, row % half, col % half)
    }

    /// Row and column of this quadrant's top-left element inside its parent.
    pub fn origin(self, half: usize) -> (usize, usize) {
        let i = self.index();
        ((i / 2) * half, (i % 2) * half)
    }
}

/// A square matrix stored as a quad-tree of dense row-major leaf blocks.
///
/// Every node owns its children outright; dropping the root releases the
/// whole tree children-first. Quadrant accessors hand out borrows, never copies.
#[derive(Debug, Clone, PartialEq)]
pub enum QuadMatrix {
    /// Dense `size`×`size` block, row-major.
    Leaf { size: usize, data: Vec<f64> },
    /// Four children of size `size / 2`, indexed by [`Quadrant::index`].
    Internal {
        size: usize,
        quadrants: Box<[QuadMatrix; 4]>,
    },
}

impl QuadMatrix {
    /// Allocates an n×n matrix of zeros, splitting until `n <= block`.
    ///
    /// # Example
    ///
    /// ```
    /// use quadmul::QuadMatrix;
    ///
    /// let m = QuadMatrix::new(8, 2).unwrap();
    /// assert_eq!(m.size(), 8);
    /// assert_eq!(m.layout().leaf(), 2);
    /// assert_eq!(m.get(7, 7), 0.0);
    /// ```
    pub fn new(size: usize, block: usize) -> Result<Self> {
        Self::zeros(Layout::new(size, block)?)
    }

    /// Allocates a zeroed tree with exactly the given layout.
    ///
    /// Leaf buffers are reserved fallibly; on failure everything built so far
    /// is dropped and [`MatmulError::Allocation`] is returned.
    pub fn zeros(layout: Layout) -> Result<Self> {
        if layout.is_leaf() {
            let size = layout.size();
            let len = layout.len();
            let mut data = Vec::new();
            data.try_reserve_exact(len)
                .map_err(|_| MatmulError::Allocation { size })?;
            data.resize(len, 0.0);
            return Ok(QuadMatrix::Leaf { size, data });
        }

        let half = layout.half();
        Ok(QuadMatrix::Internal {
            size: layout.size(),
            quadrants: Box::new([
                Self::zeros(half)?,
                Self::zeros(half)?,
                Self::zeros(half)?,
                Self::zeros(half)?,
            ]),
        })
    }

    /// Builds a quad-tree from a row-major `size`×`size` slice.
    pub fn from_dense(size: usize, block: usize, data: &[f64]) -> Result<Self> {
        let layout = Layout::new(size, block)?;
        if data.len() != layout.len() {
            return Err(MatmulError::DenseLength {
                operand: "dense input",
                expected: layout.len(),
                found: data.len(),
            });
        }
        let mut matrix = Self::zeros(layout)?;
        matrix.load_dense(data, size, 0, 0);
        Ok(matrix)
    }

    pub fn size(&self) -> usize {
        match self {
            QuadMatrix::Leaf { size, .. } | QuadMatrix::Internal { size, .. } => *size,
        }
    }

    /// Size and leaf size of this tree.
    pub fn layout(&self) -> Layout {
        let mut node = self;
        while let QuadMatrix::Internal { quadrants, .. } = node {
            node = &quadrants[0];
        }
        Layout::from_parts(self.size(), node.size())
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, QuadMatrix::Leaf { .. })
    }

    /// All four children, or `None` for a leaf.
    pub fn quadrants(&self) -> Option<&[QuadMatrix; 4]> {
        match self {
            QuadMatrix::Internal { quadrants, .. } => Some(&**quadrants),
            QuadMatrix::Leaf { .. } => None,
        }
    }

    pub fn quadrants_mut(&mut self) -> Option<&mut [QuadMatrix; 4]> {
        match self {
            QuadMatrix::Internal { quadrants, .. } => Some(&mut **quadrants),
            QuadMatrix::Leaf { .. } => None,
        }
    }

    pub fn quadrant(&self, q: Quadrant) -> Option<&QuadMatrix> {
        self.quadrants().map(|children| &children[q.index()])
    }

    /// Dense row-major storage, or `None` for an internal node.
    pub fn leaf_data(&self) -> Option<&[f64]> {
        match self {
            QuadMatrix::Leaf { data, .. } => Some(data.as_slice()),
            QuadMatrix::Internal { .. } => None,
        }
    }

    /// Element at global position (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        match self {
            QuadMatrix::Leaf { size, data } => {
                assert!(col < *size, "column {} out of range for size {}", col, size);
                data[row * size + col]
            }
            QuadMatrix::Internal { size, quadrants } => {
                assert!(row < *size && col < *size, "({}, {}) out of range", row, col);
                let (q, r, c) = Quadrant::locate(row, col, *size);
                quadrants[q.index()].get(r, c)
            }
        }
    }

    /// Overwrites the element at global position (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the matrix.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        match self {
            QuadMatrix::Leaf { size, data } => {
                assert!(col < *size, "column {} out of range for size {}", col, size);
                data[row * *size + col] = value;
            }
            QuadMatrix::Internal { size, quadrants } => {
                assert!(row < *size && col < *size, "({}, {}) out of range", row, col);
                let (q, r, c) = Quadrant::locate(row, col, *size);
                quadrants[q.index()].set(r, c, value);
            }
        }
    }

    /// Copies global row `row` into `out` (length `size`).
    pub fn read_row(&self, row: usize, out: &mut [f64]) {
        match self {
            QuadMatrix::Leaf { size, data } => {
                out.copy_from_slice(&data[row * size..(row + 1) * size]);
            }
            QuadMatrix::Internal { size, quadrants } => {
                let half = size / 2;
                let (left, right) = out.split_at_mut(half);
                let base = if row >= half { 2 } else { 0 };
                quadrants[base].read_row(row % half, left);
                quadrants[base + 1].read_row(row % half, right);
            }
        }
    }

    /// Overwrites global row `row` from `values` (length `size`).
    pub fn write_row(&mut self, row: usize, values: &[f64]) {
        match self {
            QuadMatrix::Leaf { size, data } => {
                data[row * *size..(row + 1) * *size].copy_from_slice(values);
            }
            QuadMatrix::Internal { size, quadrants } => {
                let half = *size / 2;
                let (left, right) = values.split_at(half);
                let base = if row >= half { 2 } else { 0 };
                quadrants[base].write_row(row % half, left);
                quadrants[base + 1].write_row(row % half, right);
            }
        }
    }

    /// Fills every element with a uniform sample from `[0, 1)`.
    ///
    /// Values are drawn in global row-major order, so the same seed produces
    /// the same logical matrix whatever the block threshold.
    pub fn fill_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut row = vec![0.0; self.size()];
        for i in 0..self.size() {
            for value in row.iter_mut() {
                *value = rng.random::<f64>();
            }
            self.write_row(i, &row);
        }
    }

    /// Row-major copy of the whole matrix.
    pub fn to_dense(&self) -> Vec<f64> {
        let size = self.size();
        let mut out = vec![0.0; size * size];
        self.store_dense(&mut out, size, 0, 0);
        out
    }

    fn load_dense(&mut self, src: &[f64], stride: usize, row0: usize, col0: usize) {
        match self {
            QuadMatrix::Leaf { size, data } => {
                for (r, dst_row) in data.chunks_exact_mut(*size).enumerate() {
                    let start = (row0 + r) * stride + col0;
                    dst_row.copy_from_slice(&src[start..start + dst_row.len()]);
                }
            }
            QuadMatrix::Internal { size, quadrants } => {
                let half = *size / 2;
                for (q, child) in Quadrant::ALL.iter().zip(quadrants.iter_mut()) {
                    let (dr, dc) = q.origin(half);
                    child.load_dense(src, stride, row0 + dr, col0 + dc);
                }
            }
        }
    }

    fn store_dense(&self, dst: &mut [f64], stride: usize, row0: usize, col0: usize) {
        match self {
            QuadMatrix::Leaf { size, data } => {
                for (r, src_row) in data.chunks_exact(*size).enumerate() {
                    let start = (row0 + r) * stride + col0;
                    dst[start..start + src_row.len()].copy_from_slice(src_row);
                }
            }
            QuadMatrix::Internal { size, quadrants } => {
                let half = size / 2;
                for (q, child) in Quadrant::ALL.iter().zip(quadrants.iter()) {
                    let (dr, dc) = q.origin(half);
                    child.store_dense(dst, stride, row0 + dr, col0 + dc);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn leaf_when_size_fits_block() {
        let m = QuadMatrix::new(4, 4).unwrap();
        assert!(m.is_leaf());
        assert_eq!(m.leaf_data().unwrap().len(), 16);
    }

    #[test]
    fn internal_nodes_split_in_half() {
        let m = QuadMatrix::new(16, 4).unwrap();
        let children = m.quadrants().unwrap();
        for child in children {
            assert_eq!(child.size(), 8);
            for grandchild in child.quadrants().unwrap() {
                assert!(grandchild.is_leaf());
                assert_eq!(grandchild.size(), 4);
            }
        }
    }

    #[test]
    fn set_lands_in_expected_quadrant() {
        let mut m = QuadMatrix::new(4, 2).unwrap();
        m.set(1, 3, 7.0);
        m.set(2, 0, 9.0);

        let tr = m.quadrant(Quadrant::TopRight).unwrap().leaf_data().unwrap();
        assert_eq!(tr, &[0.0, 0.0, 0.0, 7.0]);
        let bl = m.quadrant(Quadrant::BottomLeft).unwrap().leaf_data().unwrap();
        assert_eq!(bl, &[9.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn dense_conversion_preserves_positions() {
        let dense: Vec<f64> = (0..64).map(|i| i as f64).collect();
        let m = QuadMatrix::from_dense(8, 2, &dense).unwrap();
        for i in 0..8 {
            for j in 0..8 {
                assert_eq!(m.get(i, j), (i * 8 + j) as f64);
            }
        }
        assert_eq!(m.to_dense(), dense);
    }

    #[test]
    fn random_fill_is_in_unit_interval_and_layout_independent() {
        let mut coarse = QuadMatrix::new(16, 16).unwrap();
        let mut fine = QuadMatrix::new(16, 2).unwrap();
        coarse.fill_random(&mut StdRng::seed_from_u64(7));
        fine.fill_random(&mut StdRng::seed_from_u64(7));

        let values = fine.to_dense();
        assert_eq!(coarse.to_dense(), values);
        assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_matrix_is_an_allocation_error() {
        assert!(matches!(
            QuadMatrix::new(1 << 33, 1 << 33),
            Err(MatmulError::Allocation { .. })
        ));
        // Addressable, but a 2 EiB leaf is beyond any real allocator
        assert!(matches!(
            QuadMatrix::new(1 << 29, 1 << 29),
            Err(MatmulError::Allocation { size }) if size == 1 << 29
        ));
    }

    #[test]
    fn locate_maps_each_quadrant() {
        assert_eq!(Quadrant::locate(0, 0, 2), (Quadrant::TopLeft, 0, 0));
        assert_eq!(Quadrant::locate(0, 1, 2), (Quadrant::TopRight, 0, 0));
        assert_eq!(Quadrant::locate(3, 2, 4), (Quadrant::BottomRight, 1, 0));
    }

    #[test]
    #[should_panic(expected = "cannot split")]
    fn locate_rejects_a_single_element() {
        Quadrant::locate(0, 0, 1);
    }

    #[test]
    fn dense_length_is_checked() {
        let err = QuadMatrix::from_dense(4, 2, &[0.0; 15]).unwrap_err();
        assert!(matches!(err, MatmulError::DenseLength { expected: 16, found: 15, .. }));
    }
}
