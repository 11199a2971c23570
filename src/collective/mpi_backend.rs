//! MPI backend: `MPI_Dims_create` picks the shape, `MPI_Cart_create` builds
//! the grid, `MPI_Cart_coords` answers coordinate queries.

use super::{CartesianHandle, CollectiveGroup, GridCoords, GridShape};
use crate::grid_error::GridError;
use mpi::ffi;
use mpi::topology::{CartesianCommunicator, SimpleCommunicator};
use mpi::traits::*;

/// Cartesian communicator built over the whole group.
pub struct MpiCartesian {
    comm: CartesianCommunicator,
    shape: GridShape,
}

impl MpiCartesian {
    /// Underlying communicator, e.g. for neighbour exchange or gathers.
    pub fn communicator(&self) -> &CartesianCommunicator {
        &self.comm
    }
}

impl CartesianHandle for MpiCartesian {
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
        let coords = self.comm.rank_to_coordinates(rank as i32);
        GridCoords::new(coords[0] as usize, coords[1] as usize)
    }

    fn rank_of(&self, coords: GridCoords) -> usize {
        assert!(
            self.shape.contains(coords),
            "coordinates {:?} outside {}x{} grid",
            coords,
            self.shape.rows,
            self.shape.cols
        );
        self.comm
            .coordinates_to_rank(&[coords.row as i32, coords.col as i32]) as usize
    }
}

/// Collective backed by an MPI communicator (usually the world).
pub struct MpiGroup {
    comm: SimpleCommunicator,
}

impl MpiGroup {
    pub fn new(comm: SimpleCommunicator) -> Self {
        Self { comm }
    }

    /// Group over `MPI_COMM_WORLD`.
    pub fn world(universe: &mpi::environment::Universe) -> Self {
        Self::new(universe.world())
    }

    pub fn communicator(&self) -> &SimpleCommunicator {
        &self.comm
    }
}

impl CollectiveGroup for MpiGroup {
    type Handle = MpiCartesian;

    fn rank(&self) -> usize {
        self.comm.rank() as usize
    }

    fn size(&self) -> usize {
        self.comm.size() as usize
    }

    fn choose_grid_shape(&self, total: usize) -> Result<GridShape, GridError> {
        if total == 0 {
            return Err(GridError::EmptyCollective);
        }
        // 0 = let MPI pick the extent of that dimension
        let mut dims = [0i32; 2];
        let status = unsafe { ffi::MPI_Dims_create(total as i32, 2, dims.as_mut_ptr()) };
        if status != ffi::MPI_SUCCESS as i32 {
            return Err(GridError::Mpi {
                code: status,
                msg: "MPI_Dims_create failed".to_string(),
            });
        }
        Ok(GridShape::new(dims[0] as usize, dims[1] as usize))
    }

    fn build_cartesian(
        &self,
        shape: GridShape,
        periods: [bool; 2],
        reorder: bool,
    ) -> Result<Self::Handle, GridError> {
        let size = self.size();
        if shape.cells() != size {
            return Err(GridError::ShapeMismatch {
                rows: shape.rows,
                cols: shape.cols,
                size,
            });
        }
        let dims = [shape.rows as i32, shape.cols as i32];
        self.comm
            .create_cartesian_communicator(&dims, &periods, reorder)
            .map(|comm| MpiCartesian { comm, shape })
            .ok_or_else(|| GridError::TopologyConstruction {
                size,
                rows: shape.rows,
                cols: shape.cols,
                reason: "MPI_Cart_create returned MPI_COMM_NULL".to_string(),
            })
    }

    fn abort(&self, code: i32) -> ! {
        self.comm.abort(code)
    }
}
