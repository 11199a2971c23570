//! In-memory collective for tests, single-process runs and coordinators.
//!
//! No messages are exchanged: every member of a `LocalGroup` of the same
//! size computes the same shape and the same row-major layout on its own,
//! which is what MPI produces for a non-periodic, non-reordered grid.

use super::{dims_create, CartesianHandle, CollectiveGroup, GridCoords, GridShape};
use crate::grid_error::GridError;

/// Row-major Cartesian layout: `rank = row * cols + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCartesian {
    shape: GridShape,
}

impl LocalCartesian {
    pub fn new(shape: GridShape) -> Self {
        Self { shape }
    }
}

impl CartesianHandle for LocalCartesian {
    fn shape(&self) -> GridShape {
        self.shape
    }

    fn coordinates_of(&self, rank: usize) -> GridCoords {
        assert!(
            rank < self.shape.cells(),
            "rank {} outside {}x{} grid",
            rank,
            self.shape.rows,
            self.shape.cols
        );
        GridCoords::new(rank / self.shape.cols, rank % self.shape.cols)
    }

    fn rank_of(&self, coords: GridCoords) -> usize {
        assert!(
            self.shape.contains(coords),
            "coordinates {:?} outside {}x{} grid",
            coords,
            self.shape.rows,
            self.shape.cols
        );
        coords.row * self.shape.cols + coords.col
    }
}

/// One member of an in-memory collective.
#[derive(Clone, Debug)]
pub struct LocalGroup {
    rank: usize,
    size: usize,
    shape: Option<GridShape>,
}

impl LocalGroup {
    /// Member `rank` of a collective of `size` workers.
    ///
    /// # Panics
    ///
    /// Panics if `size == 0` or `rank >= size`.
    pub fn new(rank: usize, size: usize) -> Self {
        assert!(size >= 1, "a collective needs at least one worker");
        assert!(rank < size, "rank {} outside collective of size {}", rank, size);
        Self {
            rank,
            size,
            shape: None,
        }
    }

    /// Single-worker collective.
    pub fn solo() -> Self {
        Self::new(0, 1)
    }

    /// Force `choose_grid_shape` to return `shape` instead of the
    /// near-square factorization. The shape is not checked until
    /// `build_cartesian`.
    pub fn with_shape(mut self, shape: GridShape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Every member of a collective of `size` workers, in rank order.
    pub fn members(size: usize) -> Vec<Self> {
        (0..size).map(|r| Self::new(r, size)).collect()
    }
}

impl CollectiveGroup for LocalGroup {
    type Handle = LocalCartesian;

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn choose_grid_shape(&self, total: usize) -> Result<GridShape, GridError> {
        match self.shape {
            Some(shape) => Ok(shape),
            None => dims_create(total),
        }
    }

    fn build_cartesian(
        &self,
        shape: GridShape,
        periods: [bool; 2],
        reorder: bool,
    ) -> Result<Self::Handle, GridError> {
        if periods.iter().any(|&p| p) {
            return Err(GridError::UnsupportedTopology(
                "local collective builds non-periodic grids only",
            ));
        }
        if reorder {
            return Err(GridError::UnsupportedTopology(
                "local collective never reorders ranks",
            ));
        }
        if shape.cells() != self.size {
            return Err(GridError::ShapeMismatch {
                rows: shape.rows,
                cols: shape.cols,
                size: self.size,
            });
        }
        Ok(LocalCartesian::new(shape))
    }

    fn abort(&self, code: i32) -> ! {
        panic!(
            "collective of {} workers aborted by rank {} (code {})",
            self.size, self.rank, code
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_layout() {
        let cart = LocalCartesian::new(GridShape::new(2, 3));
        assert_eq!(cart.coordinates_of(0), GridCoords::new(0, 0));
        assert_eq!(cart.coordinates_of(2), GridCoords::new(0, 2));
        assert_eq!(cart.coordinates_of(4), GridCoords::new(1, 1));
        for r in 0..6 {
            assert_eq!(cart.rank_of(cart.coordinates_of(r)), r);
        }
    }

    #[test]
    #[should_panic]
    fn coordinates_out_of_range_panics() {
        LocalCartesian::new(GridShape::new(2, 2)).coordinates_of(4);
    }

    #[test]
    #[should_panic]
    fn rank_past_size_panics() {
        let _ = LocalGroup::new(3, 3);
    }

    #[test]
    fn mismatched_shape_is_rejected() {
        let g = LocalGroup::new(0, 6).with_shape(GridShape::new(2, 2));
        let shape = g.choose_grid_shape(6).unwrap();
        assert_eq!(
            g.build_cartesian(shape, [false; 2], false),
            Err(GridError::ShapeMismatch {
                rows: 2,
                cols: 2,
                size: 6
            })
        );
    }

    #[test]
    fn periodic_or_reordered_is_rejected() {
        let g = LocalGroup::new(0, 4);
        let shape = GridShape::new(2, 2);
        assert!(matches!(
            g.build_cartesian(shape, [true, false], false),
            Err(GridError::UnsupportedTopology(_))
        ));
        assert!(matches!(
            g.build_cartesian(shape, [false, false], true),
            Err(GridError::UnsupportedTopology(_))
        ));
    }

    #[test]
    fn members_cover_all_ranks() {
        let m = LocalGroup::members(5);
        assert_eq!(m.len(), 5);
        assert!(m.iter().enumerate().all(|(i, g)| g.rank() == i && g.size() == 5));
    }
}
