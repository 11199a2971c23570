//! Thin façade over the collective runtime that forms the process grid.
//!
//! The decomposition never talks to a transport directly. It needs three
//! things from whatever runs the workers: a near-square factorization of the
//! worker count, a 2-D Cartesian topology built over the group, and a way to
//! ask that topology where a rank sits. [`CollectiveGroup`] and
//! [`CartesianHandle`] are exactly that surface.
//!
//! Backends:
//! - [`LocalGroup`]: in-memory and deterministic, for tests and coordinators.
//! - `MpiGroup` (feature `mpi-support`): `MPI_Dims_create` + `MPI_Cart_create`.

pub mod local;
#[cfg(feature = "mpi-support")]
pub mod mpi_backend;

pub use local::{LocalCartesian, LocalGroup};
#[cfg(feature = "mpi-support")]
pub use mpi_backend::{MpiCartesian, MpiGroup};

use crate::grid_error::GridError;

/// Extents of a 2-D process grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridShape {
    /// Cells along y.
    pub rows: usize,
    /// Cells along x.
    pub cols: usize,
}

impl GridShape {
    #[inline]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Number of cells (workers) in the grid.
    #[inline]
    pub const fn cells(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns true if `coords` lies inside the grid.
    #[inline]
    pub const fn contains(&self, coords: GridCoords) -> bool {
        coords.row < self.rows && coords.col < self.cols
    }
}

/// Position of a worker in the grid, `(row, col)` as MPI reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridCoords {
    pub row: usize,
    pub col: usize,
}

impl GridCoords {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Built Cartesian topology over a collective.
///
/// Handles are immutable once built; every `GridTopology` derived from the
/// same construction shares one handle.
pub trait CartesianHandle: 'static {
    /// Grid extents the topology was built with.
    fn shape(&self) -> GridShape;

    /// Grid coordinates of `rank`.
    ///
    /// `rank` must be in `0..shape().cells()`; implementations panic otherwise.
    fn coordinates_of(&self, rank: usize) -> GridCoords;

    /// Rank sitting at `coords`. Inverse of [`coordinates_of`](Self::coordinates_of).
    fn rank_of(&self, coords: GridCoords) -> usize;
}

/// Group of cooperating workers able to form a Cartesian topology.
///
/// `choose_grid_shape` and `build_cartesian` are collective: every member
/// must call them with the same arguments, and they may block.
pub trait CollectiveGroup {
    /// Topology handle produced by [`build_cartesian`](Self::build_cartesian).
    type Handle: CartesianHandle;

    /// This worker's rank in the group.
    fn rank(&self) -> usize;

    /// Number of workers in the group.
    fn size(&self) -> usize;

    /// Pick a `rows x cols` factorization of `total` workers.
    fn choose_grid_shape(&self, total: usize) -> Result<GridShape, GridError>;

    /// Build a 2-D Cartesian topology over the whole group.
    fn build_cartesian(
        &self,
        shape: GridShape,
        periods: [bool; 2],
        reorder: bool,
    ) -> Result<Self::Handle, GridError>;

    /// Terminate every member of the group. Never returns.
    fn abort(&self, code: i32) -> !;
}

/// Near-square factorization of `n` into two dimensions.
///
/// Follows the `MPI_Dims_create` convention for 2-D: dims are returned in
/// non-increasing order, so `rows >= cols`, and `rows - cols` is minimal.
/// Prime `n` yields `n x 1`.
///
/// Returns `Err(GridError::EmptyCollective)` for `n == 0`.
pub fn dims_create(n: usize) -> Result<GridShape, GridError> {
    if n == 0 {
        return Err(GridError::EmptyCollective);
    }
    let mut cols = n.isqrt();
    while n % cols != 0 {
        cols -= 1;
    }
    Ok(GridShape::new(n / cols, cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_create_matches_mpi_convention() {
        assert_eq!(dims_create(1).unwrap(), GridShape::new(1, 1));
        assert_eq!(dims_create(6).unwrap(), GridShape::new(3, 2));
        assert_eq!(dims_create(8).unwrap(), GridShape::new(4, 2));
        assert_eq!(dims_create(9).unwrap(), GridShape::new(3, 3));
        assert_eq!(dims_create(12).unwrap(), GridShape::new(4, 3));
        assert_eq!(dims_create(16).unwrap(), GridShape::new(4, 4));
    }

    #[test]
    fn dims_create_prime_is_a_strip() {
        for p in [2usize, 3, 7, 13, 97] {
            assert_eq!(dims_create(p).unwrap(), GridShape::new(p, 1));
        }
    }

    #[test]
    fn dims_create_zero_is_error() {
        assert_eq!(dims_create(0), Err(GridError::EmptyCollective));
    }

    #[test]
    fn shape_contains() {
        let s = GridShape::new(2, 3);
        assert_eq!(s.cells(), 6);
        assert!(s.contains(GridCoords::new(1, 2)));
        assert!(!s.contains(GridCoords::new(2, 0)));
        assert!(!s.contains(GridCoords::new(0, 3)));
    }
}
