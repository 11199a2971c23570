//! GridError: Unified error type for raster-grid public APIs
//!
//! Group-formation failures, configuration problems and partition-validation
//! findings all surface through this one type. Precondition violations (an
//! out-of-range worker rank, an empty collective) are not represented here:
//! they panic at the API boundary.

use thiserror::Error;

/// Unified error type for raster-grid operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A collective with zero workers was asked to form a grid.
    #[error("Collective error: a grid needs at least one worker")]
    EmptyCollective,
    /// The requested grid shape does not cover the collective exactly.
    #[error("Grid shape {rows}x{cols} does not match collective size {size}")]
    ShapeMismatch { rows: usize, cols: usize, size: usize },
    /// The backend cannot build the requested kind of topology.
    #[error("Unsupported topology: {0}")]
    UnsupportedTopology(&'static str),
    /// Building the Cartesian topology failed in the collective runtime.
    #[error("Failed to create Cartesian topology (size={size}, dims={rows}x{cols}): {reason}")]
    TopologyConstruction {
        size: usize,
        rows: usize,
        cols: usize,
        reason: String,
    },
    /// A raw MPI call returned a non-success status.
    #[error("MPI error: ({code}) {msg}")]
    Mpi { code: i32, msg: String },
    /// Raster dimensions that cannot be partitioned.
    #[error("Invalid raster extent {width}x{height}")]
    InvalidRaster { width: usize, height: usize },
    /// A configuration value out of its allowed range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// A pixel not owned by any domain.
    #[error("Partition gap: pixel ({x}, {y}) is not owned by any worker")]
    PartitionGap { x: usize, y: usize },
    /// A pixel owned by two domains.
    #[error("Partition overlap: pixel ({x}, {y}) is owned by workers {first} and {second}")]
    PartitionOverlap {
        x: usize,
        y: usize,
        first: usize,
        second: usize,
    },
    /// A domain whose extents and bounds disagree.
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}
