//! `Domain`: the rectangle of the global raster one worker produces.
//!
//! Tiles are `floor(W / cols) x floor(H / rows)` pixels. The remainder of
//! each division goes entirely to the last column (resp. row), and start
//! offsets always use the base size, so the tiles abut without gaps and the
//! last column ends exactly at `W - 1`. The corner cell absorbs both
//! remainders.
//!
//! Gather plans and output writers downstream assume this last-edge layout.

use std::ops::RangeInclusive;

use crate::collective::{CartesianHandle, GridCoords, GridShape};
use crate::debug_invariants::DebugInvariants;
use crate::grid_error::GridError;
use crate::raster::RasterExtent;
use crate::topology::GridTopology;

/// Pixel rectangle owned by one worker. Bounds are inclusive global indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Domain {
    pub width: usize,
    pub height: usize,
    pub start_x: usize,
    pub start_y: usize,
    pub end_x: usize,
    pub end_y: usize,
}

/// Domain of `topology`'s worker in a `raster_width x raster_height` raster.
///
/// # Panics
///
/// Panics if the raster has fewer pixels than the grid has cells along either
/// axis, since some worker would get an empty tile.
pub fn derive_domain<H: CartesianHandle>(
    topology: &GridTopology<H>,
    raster_width: usize,
    raster_height: usize,
) -> Domain {
    let d = Domain::from_grid(
        topology.shape(),
        topology.coords(),
        raster_width,
        raster_height,
    );
    let shape = topology.shape();
    let (base_w, base_h) = (raster_width / shape.cols, raster_height / shape.rows);
    if topology.is_last_col() && raster_width % shape.cols > base_w / 2 {
        log::warn!(
            "rank {}: last column absorbs {} extra pixels over a base width of {}",
            topology.rank(),
            raster_width % shape.cols,
            base_w
        );
    }
    if topology.is_last_row() && raster_height % shape.rows > base_h / 2 {
        log::warn!(
            "rank {}: last row absorbs {} extra pixels over a base height of {}",
            topology.rank(),
            raster_height % shape.rows,
            base_h
        );
    }
    log::trace!(
        "rank {}: domain [{}..={}] x [{}..={}]",
        topology.rank(),
        d.start_x,
        d.end_x,
        d.start_y,
        d.end_y
    );
    d
}

impl Domain {
    /// Domain of the cell at `coords` in a `shape` grid over a
    /// `raster_width x raster_height` raster. O(1), no allocation.
    ///
    /// # Panics
    ///
    /// Panics if `coords` is outside `shape`, or if the raster is smaller
    /// than the grid along either axis.
    pub fn from_grid(
        shape: GridShape,
        coords: GridCoords,
        raster_width: usize,
        raster_height: usize,
    ) -> Self {
        assert!(
            shape.contains(coords),
            "coordinates {:?} outside {}x{} grid",
            coords,
            shape.rows,
            shape.cols
        );
        assert!(
            raster_width >= shape.cols && raster_height >= shape.rows,
            "raster {}x{} smaller than {}x{} grid",
            raster_width,
            raster_height,
            shape.rows,
            shape.cols
        );

        let base_w = raster_width / shape.cols;
        let base_h = raster_height / shape.rows;

        let mut width = base_w;
        let mut height = base_h;
        if coords.col == shape.cols - 1 {
            width += raster_width % shape.cols;
        }
        if coords.row == shape.rows - 1 {
            height += raster_height % shape.rows;
        }

        let start_x = coords.col * base_w;
        let start_y = coords.row * base_h;

        let d = Domain {
            width,
            height,
            start_x,
            start_y,
            end_x: start_x + width - 1,
            end_y: start_y + height - 1,
        };
        crate::debug_invariants!(d.validate_invariants(), "Domain invalid");
        d
    }

    /// Domain of `topology`'s worker in `raster`.
    pub fn for_raster<H: CartesianHandle>(topology: &GridTopology<H>, raster: &RasterExtent) -> Self {
        derive_domain(topology, raster.width, raster.height)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Global column indices covered.
    #[inline]
    pub fn x_range(&self) -> RangeInclusive<usize> {
        self.start_x..=self.end_x
    }

    /// Global row indices covered.
    #[inline]
    pub fn y_range(&self) -> RangeInclusive<usize> {
        self.start_y..=self.end_y
    }

    /// Returns true if global pixel `(x, y)` belongs to this domain.
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.x_range().contains(&x) && self.y_range().contains(&y)
    }

    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Domain) -> bool {
        self.start_x <= other.end_x
            && other.start_x <= self.end_x
            && self.start_y <= other.end_y
            && other.start_y <= self.end_y
    }

    /// Local (row-major) offset of global pixel `(x, y)` inside this domain.
    pub fn local_index(&self, x: usize, y: usize) -> Option<usize> {
        self.contains(x, y)
            .then(|| (y - self.start_y) * self.width + (x - self.start_x))
    }
}

impl DebugInvariants for Domain {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Domain invalid");
    }

    fn validate_invariants(&self) -> Result<(), GridError> {
        if self.width == 0 || self.height == 0 {
            return Err(GridError::InvalidDomain(format!(
                "empty extent {}x{}",
                self.width, self.height
            )));
        }
        if self.end_x < self.start_x || self.end_x - self.start_x + 1 != self.width {
            return Err(GridError::InvalidDomain(format!(
                "width {} disagrees with x bounds {}..={}",
                self.width, self.start_x, self.end_x
            )));
        }
        if self.end_y < self.start_y || self.end_y - self.start_y + 1 != self.height {
            return Err(GridError::InvalidDomain(format!(
                "height {} disagrees with y bounds {}..={}",
                self.height, self.start_y, self.end_y
            )));
        }
        Ok(())
    }
}
