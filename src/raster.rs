//! `RasterExtent`: the fixed global image being decomposed.
//!
//! The decomposition only ever looks at the pixel dimensions. The plane
//! rectangle rides along so the per-pixel kernel can map a pixel index to a
//! point of the complex plane; nothing in this crate interprets it.

use crate::grid_error::GridError;

/// Reference raster width in pixels.
pub const DEFAULT_WIDTH: usize = 4096;
/// Reference raster height in pixels.
pub const DEFAULT_HEIGHT: usize = 4096;

/// Rectangle of the parameter plane covered by the raster
/// (`min_x + i*min_y <= c < max_x + i*max_y`).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaneRect {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for PlaneRect {
    fn default() -> Self {
        Self {
            min_x: -2.1,
            max_x: 0.7,
            min_y: -1.4,
            max_y: 1.4,
        }
    }
}

impl PlaneRect {
    /// Returns true if the rectangle has positive, finite extent on both axes.
    pub fn is_well_formed(&self) -> bool {
        [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x < self.max_x
            && self.min_y < self.max_y
    }
}

/// Global raster dimensions `W x H` plus the plane rectangle they sample.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RasterExtent {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub plane: PlaneRect,
}

impl Default for RasterExtent {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            plane: PlaneRect::default(),
        }
    }
}

impl RasterExtent {
    /// Creates an extent over the reference plane rectangle.
    ///
    /// Returns `Err(GridError::InvalidRaster)` if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidRaster { width, height });
        }
        Ok(Self {
            width,
            height,
            plane: PlaneRect::default(),
        })
    }

    /// Replaces the plane rectangle.
    pub fn with_plane(mut self, plane: PlaneRect) -> Self {
        self.plane = plane;
        self
    }

    /// Total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Returns true if the raster can be split over a `rows x cols` grid
    /// without leaving any worker with an empty tile.
    #[inline]
    pub fn fits_grid(&self, rows: usize, cols: usize) -> bool {
        cols >= 1 && rows >= 1 && self.width >= cols && self.height >= rows
    }
}
