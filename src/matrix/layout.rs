//! Shape of a quad-tree: total size and the size of its dense leaves.

use std::{fmt, mem};

use crate::error::{MatmulError, Result};

/// Size of a quad-tree matrix together with the size of its leaf blocks.
///
/// Two matrices with equal layouts have identical tree shapes, which is what
/// the recursive engines rely on when they walk operands in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    size: usize,
    leaf: usize,
}

impl Layout {
    /// Validates that `size` halves evenly until it is at or below `block`.
    ///
    /// Powers of two always qualify, but so does e.g. 12 with block 3. A size
    /// whose `size * size` f64 buffer could never be addressed is reported as
    /// [`MatmulError::Allocation`] here, before anything is allocated.
    ///
    /// # Example
    ///
    /// ```
    /// use quadmul::matrix::Layout;
    ///
    /// let layout = Layout::new(256, 64).unwrap();
    /// assert_eq!(layout.leaf(), 64);
    /// assert_eq!(layout.depth(), 2);
    ///
    /// // 20 -> 10 -> 5, and 5 cannot be halved
    /// assert!(Layout::new(20, 4).is_err());
    /// ```
    pub fn new(size: usize, block: usize) -> Result<Self> {
        if size == 0 {
            return Err(MatmulError::ZeroSize);
        }
        if block == 0 {
            return Err(MatmulError::ZeroBlock);
        }

        let mut leaf = size;
        while leaf > block {
            if leaf % 2 != 0 {
                return Err(MatmulError::OddSplit {
                    size,
                    block,
                    at: leaf,
                });
            }
            leaf /= 2;
        }

        let addressable = size
            .checked_mul(size)
            .and_then(|len| len.checked_mul(mem::size_of::<f64>()))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !addressable {
            return Err(MatmulError::Allocation { size });
        }

        Ok(Self { size, leaf })
    }

    pub(crate) fn from_parts(size: usize, leaf: usize) -> Self {
        Self { size, leaf }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn leaf(&self) -> usize {
        self.leaf
    }

    /// True when this layout is a single dense block (no recursion).
    pub fn is_leaf(&self) -> bool {
        self.size == self.leaf
    }

    /// Number of recursive splits between the root and the leaves.
    pub fn depth(&self) -> u32 {
        (self.size / self.leaf).trailing_zeros()
    }

    /// Layout of one quadrant.
    ///
    /// Calling this on a leaf layout is a logic error; it returns the leaf itself.
    pub fn half(&self) -> Self {
        if self.is_leaf() {
            return *self;
        }
        Self {
            size: self.size / 2,
            leaf: self.leaf,
        }
    }

    /// Element count of the whole matrix. Cannot overflow for a validated layout.
    pub fn len(&self) -> usize {
        self.size * self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} (leaf {})", self.size, self.size, self.leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_of_two_sizes() {
        let layout = Layout::new(1024, 64).unwrap();
        assert_eq!(layout.leaf(), 64);
        assert_eq!(layout.depth(), 4);
        assert_eq!(layout.half().size(), 512);
    }

    #[test]
    fn block_at_or_above_size_is_a_single_leaf() {
        for block in [8, 9, 1000] {
            let layout = Layout::new(8, block).unwrap();
            assert!(layout.is_leaf());
            assert_eq!(layout.depth(), 0);
        }
    }

    #[test]
    fn block_that_is_not_a_divisor_stops_below_it() {
        // 64 -> 32 -> 16, and 16 <= 20
        let layout = Layout::new(64, 20).unwrap();
        assert_eq!(layout.leaf(), 16);
    }

    #[test]
    fn non_power_of_two_that_halves_evenly() {
        let layout = Layout::new(12, 3).unwrap();
        assert_eq!(layout.leaf(), 3);
        assert_eq!(layout.depth(), 2);
    }

    #[test]
    fn odd_split_is_rejected() {
        match Layout::new(20, 4) {
            Err(MatmulError::OddSplit { size, block, at }) => {
                assert_eq!((size, block, at), (20, 4, 5));
            }
            other => panic!("expected OddSplit, got {:?}", other),
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn unaddressable_size_is_an_allocation_error() {
        // (2^33)^2 overflows usize; (2^31)^2 * 8 bytes overflows isize
        for size in [1usize << 33, 1 << 31] {
            match Layout::new(size, size) {
                Err(MatmulError::Allocation { size: reported }) => assert_eq!(reported, size),
                other => panic!("expected Allocation, got {:?}", other),
            }
        }
        assert!(Layout::new(1 << 30, 1 << 30).is_err());
        assert!(Layout::new(1 << 29, 1 << 29).is_ok());
    }

    #[test]
    fn zero_inputs_are_rejected() {
        assert!(matches!(Layout::new(0, 4), Err(MatmulError::ZeroSize)));
        assert!(matches!(Layout::new(16, 0), Err(MatmulError::ZeroBlock)));
    }
}
