#![cfg_attr(docsrs, feature(doc_cfg))]
//! # raster-grid
//!
//! raster-grid decomposes a 2-D raster over a collective of cooperating
//! workers. Each worker learns its cell in a near-square process grid and the
//! exact pixel rectangle it must produce; the rectangles of all workers tile
//! the raster with no gaps and no overlaps, so workers compute fully
//! independently.
//!
//! ## Features
//! - [`GridTopology`]: collective grid formation and cheap re-resolution for
//!   any other rank over a shared topology handle
//! - [`Domain`] / [`derive_domain`]: O(1) sub-raster for a grid cell, with
//!   remainder pixels absorbed by the last row and column
//! - Coordinator helpers in [`plan`]: every worker's Domain, pixel ownership,
//!   partition validation
//! - Pluggable collectives: in-memory ([`collective::LocalGroup`]) and MPI
//!   (`mpi-support` feature)
//!
//! ## Usage
//! ```rust
//! use raster_grid::prelude::*;
//!
//! let group = LocalGroup::new(8, 9);
//! let topo = GridTopology::for_group(&group).unwrap();
//! let d = derive_domain(&topo, 4096, 4096);
//! assert_eq!((d.width, d.start_x, d.end_x), (1366, 2730, 4095));
//! ```
//!
//! With MPI, build the group from the world communicator and abort the run
//! if the grid cannot form:
//!
//! ```ignore
//! let universe = mpi::initialize().unwrap();
//! let group = MpiGroup::world(&universe);
//! let topo = GridTopology::create_or_abort(&group);
//! let domain = Domain::for_raster(&topo, &RenderConfig::default().raster);
//! ```

pub mod collective;
pub mod config;
pub mod debug_invariants;
pub mod domain;
pub mod grid_error;
pub mod plan;
pub mod raster;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use domain::{derive_domain, Domain};
pub use grid_error::GridError;
pub use topology::GridTopology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::collective::{
        CartesianHandle, CollectiveGroup, GridCoords, GridShape, LocalCartesian, LocalGroup,
    };
    #[cfg(feature = "mpi-support")]
    pub use crate::collective::{MpiCartesian, MpiGroup};
    pub use crate::config::RenderConfig;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::domain::{derive_domain, Domain};
    pub use crate::grid_error::GridError;
    #[cfg(feature = "rayon")]
    pub use crate::plan::par_plan_domains;
    pub use crate::plan::{owner_of, plan_domains, validate_partition};
    pub use crate::raster::{PlaneRect, RasterExtent};
    pub use crate::topology::GridTopology;
}
