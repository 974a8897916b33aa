//! Quad-tree matrix storage and its lifecycle.
//!
//! A [`QuadMatrix`] of size n is either a dense leaf (n at or below the block
//! threshold) or four owned quadrants of size n/2. The recursive engines walk
//! this tree directly, so a quadrant is just a borrow of a child node.
//!
//! - `layout`: size/leaf-size bookkeeping and split validation
//! - `quadtree`: the tree itself, allocation, element access, random fill
//! - `text`: row-major text serialization and parsing
//! - `dense`: row-major reference routines used for verification

pub mod dense;
pub mod layout;
pub mod quadtree;
pub mod text;

pub use layout::Layout;
pub use quadtree::{QuadMatrix, Quadrant};
