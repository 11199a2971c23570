//! `GridTopology`: one worker's view of the 2-D process grid.
//!
//! A topology is formed once per run with [`GridTopology::create`], a
//! collective call that agrees on the grid shape and builds the Cartesian
//! handle. From then on [`GridTopology::reresolve`] answers "where would
//! rank K sit" locally: the shape and the handle are shared, only the
//! coordinates are recomputed.
//!
//! The handle lives behind an `Arc` and is never mutated after construction,
//! so re-resolved topologies can be read from any number of threads.

use std::fmt;
use std::sync::Arc;

use crate::collective::{CartesianHandle, CollectiveGroup, GridCoords, GridShape};
use crate::debug_invariants::DebugInvariants;
use crate::grid_error::GridError;

/// Exit code passed to [`CollectiveGroup::abort`] when the grid cannot form.
pub const ABORT_CODE: i32 = 1;

pub struct GridTopology<H: CartesianHandle> {
    shape: GridShape,
    coords: GridCoords,
    rank: usize,
    handle: Arc<H>,
}

impl<H: CartesianHandle> GridTopology<H> {
    /// Form the grid for `worker_rank` out of `total_workers`.
    ///
    /// Collective: every member of `group` must call this with the same
    /// `total_workers`. Asks the group for a near-square shape, builds a
    /// non-periodic, non-reordering Cartesian topology and resolves
    /// `worker_rank` in it.
    ///
    /// # Errors
    ///
    /// Any failure of the group to pick a shape or build the topology. The
    /// error is fatal for the whole collective; see
    /// [`create_or_abort`](Self::create_or_abort).
    ///
    /// # Panics
    ///
    /// Panics if `total_workers == 0` or `worker_rank >= total_workers`.
    pub fn create<G>(group: &G, worker_rank: usize, total_workers: usize) -> Result<Self, GridError>
    where
        G: CollectiveGroup<Handle = H>,
    {
        assert!(total_workers >= 1, "a grid needs at least one worker");
        assert!(
            worker_rank < total_workers,
            "worker rank {} outside collective of {} workers",
            worker_rank,
            total_workers
        );

        let shape = group.choose_grid_shape(total_workers)?;
        if shape.cells() != total_workers {
            return Err(GridError::ShapeMismatch {
                rows: shape.rows,
                cols: shape.cols,
                size: total_workers,
            });
        }
        let handle = group.build_cartesian(shape, [false, false], false)?;
        let handle_shape = handle.shape();
        if handle_shape != shape {
            return Err(GridError::TopologyConstruction {
                size: total_workers,
                rows: shape.rows,
                cols: shape.cols,
                reason: format!(
                    "topology reports {}x{} instead",
                    handle_shape.rows, handle_shape.cols
                ),
            });
        }

        let topo = Self::resolve(shape, Arc::new(handle), worker_rank);
        log::debug!(
            "rank {}/{}: {}x{} grid, coords (row {}, col {})",
            worker_rank,
            total_workers,
            shape.rows,
            shape.cols,
            topo.coords.row,
            topo.coords.col
        );
        Ok(topo)
    }

    /// [`create`](Self::create) for the calling worker of `group`.
    pub fn for_group<G>(group: &G) -> Result<Self, GridError>
    where
        G: CollectiveGroup<Handle = H>,
    {
        Self::create(group, group.rank(), group.size())
    }

    /// [`for_group`](Self::for_group), aborting the whole collective on failure.
    ///
    /// A worker without a valid grid cannot know its Domain, and continuing
    /// would leave part of the raster unowned, so there is no retry.
    pub fn create_or_abort<G>(group: &G) -> Self
    where
        G: CollectiveGroup<Handle = H>,
    {
        match Self::for_group(group) {
            Ok(topo) => topo,
            Err(e) => {
                log::error!(
                    "rank {}: error creating Cartesian topology: {}",
                    group.rank(),
                    e
                );
                group.abort(ABORT_CODE)
            }
        }
    }

    /// View of the same grid from `other_rank`'s position.
    ///
    /// Shares the shape and the topology handle with `self`; no collective
    /// communication takes place.
    ///
    /// # Panics
    ///
    /// Panics if `other_rank` is not a rank of the grid.
    pub fn reresolve(&self, other_rank: usize) -> Self {
        assert!(
            other_rank < self.total_workers(),
            "worker rank {} outside collective of {} workers",
            other_rank,
            self.total_workers()
        );
        let topo = Self::resolve(self.shape, Arc::clone(&self.handle), other_rank);
        log::trace!(
            "re-resolved rank {} -> (row {}, col {})",
            other_rank,
            topo.coords.row,
            topo.coords.col
        );
        topo
    }

    fn resolve(shape: GridShape, handle: Arc<H>, rank: usize) -> Self {
        let coords = handle.coordinates_of(rank);
        let topo = Self {
            shape,
            coords,
            rank,
            handle,
        };
        crate::debug_invariants!(topo.validate_invariants(), "GridTopology invalid");
        topo
    }

    /// Number of grid cells along x.
    #[inline]
    pub fn grid_cols(&self) -> usize {
        self.shape.cols
    }

    /// Number of grid cells along y.
    #[inline]
    pub fn grid_rows(&self) -> usize {
        self.shape.rows
    }

    #[inline]
    pub fn my_col(&self) -> usize {
        self.coords.col
    }

    #[inline]
    pub fn my_row(&self) -> usize {
        self.coords.row
    }

    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    #[inline]
    pub fn coords(&self) -> GridCoords {
        self.coords
    }

    /// Rank this view was resolved for.
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn total_workers(&self) -> usize {
        self.shape.cells()
    }

    /// Shared Cartesian handle.
    #[inline]
    pub fn handle(&self) -> &Arc<H> {
        &self.handle
    }

    /// Returns true if both views were derived from the same `create` call.
    pub fn shares_handle(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }

    #[inline]
    pub fn is_last_col(&self) -> bool {
        self.coords.col + 1 == self.shape.cols
    }

    #[inline]
    pub fn is_last_row(&self) -> bool {
        self.coords.row + 1 == self.shape.rows
    }
}

impl<H: CartesianHandle> Clone for GridTopology<H> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape,
            coords: self.coords,
            rank: self.rank,
            handle: Arc::clone(&self.handle),
        }
    }
}

impl<H: CartesianHandle> fmt::Debug for GridTopology<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridTopology")
            .field("grid_rows", &self.shape.rows)
            .field("grid_cols", &self.shape.cols)
            .field("my_row", &self.coords.row)
            .field("my_col", &self.coords.col)
            .field("rank", &self.rank)
            .finish()
    }
}

impl<H: CartesianHandle> DebugInvariants for GridTopology<H> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "GridTopology invalid");
    }

    fn validate_invariants(&self) -> Result<(), GridError> {
        if self.shape.rows == 0 || self.shape.cols == 0 {
            return Err(GridError::EmptyCollective);
        }
        if !self.shape.contains(self.coords) {
            return Err(GridError::TopologyConstruction {
                size: self.shape.cells(),
                rows: self.shape.rows,
                cols: self.shape.cols,
                reason: format!(
                    "rank {} resolved to ({}, {}) outside the grid",
                    self.rank, self.coords.row, self.coords.col
                ),
            });
        }
        Ok(())
    }
}
