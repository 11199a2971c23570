//! Run configuration for a distributed render.
//!
//! `RenderConfig` is plain data: it deserializes with serde (every field
//! optional, falling back to the reference values) and is checked once with
//! [`RenderConfig::validate`] before any worker forms the grid. Every worker
//! must load the same configuration, otherwise their Domains disagree.

use crate::grid_error::GridError;
use crate::raster::RasterExtent;

/// Reference escape-time iteration cap.
pub const DEFAULT_MAX_ITERS: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Global raster being decomposed.
    pub raster: RasterExtent,
    /// Iteration cap handed to the per-pixel kernel.
    pub max_iters: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            raster: RasterExtent::default(),
            max_iters: DEFAULT_MAX_ITERS,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), GridError> {
        if self.raster.width == 0 || self.raster.height == 0 {
            return Err(GridError::InvalidRaster {
                width: self.raster.width,
                height: self.raster.height,
            });
        }
        if !self.raster.plane.is_well_formed() {
            return Err(GridError::InvalidConfig(format!(
                "plane rectangle {:?} must have positive finite extent",
                self.raster.plane
            )));
        }
        if self.max_iters == 0 {
            return Err(GridError::InvalidConfig(
                "max_iters must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Checks that the raster can be split over a collective of `workers`
    /// arranged as `rows x cols`.
    pub fn validate_for_grid(&self, rows: usize, cols: usize) -> Result<(), GridError> {
        self.validate()?;
        if !self.raster.fits_grid(rows, cols) {
            return Err(GridError::InvalidConfig(format!(
                "raster {}x{} is smaller than the {}x{} process grid",
                self.raster.width, self.raster.height, rows, cols
            )));
        }
        Ok(())
    }
}
