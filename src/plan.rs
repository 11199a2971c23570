//! Coordinator-side view of the whole partition.
//!
//! A coordinator holding any `GridTopology` of the run can list every
//! worker's Domain by re-resolving the shared topology, without extra
//! collective calls. The result is what gather and output planning work from.

use itertools::Itertools;

use crate::collective::{CartesianHandle, GridCoords};
use crate::domain::{derive_domain, Domain};
use crate::grid_error::GridError;
use crate::raster::RasterExtent;
use crate::topology::GridTopology;

fn check_fits<H: CartesianHandle>(
    topology: &GridTopology<H>,
    raster: &RasterExtent,
) -> Result<(), GridError> {
    if !raster.fits_grid(topology.grid_rows(), topology.grid_cols()) {
        return Err(GridError::InvalidRaster {
            width: raster.width,
            height: raster.height,
        });
    }
    Ok(())
}

/// Domain of every worker, indexed by rank.
///
/// Returns `Err(GridError::InvalidRaster)` if the raster is smaller than the
/// grid along either axis.
pub fn plan_domains<H: CartesianHandle>(
    topology: &GridTopology<H>,
    raster: &RasterExtent,
) -> Result<Vec<Domain>, GridError> {
    check_fits(topology, raster)?;
    Ok((0..topology.total_workers())
        .map(|r| derive_domain(&topology.reresolve(r), raster.width, raster.height))
        .collect())
}

/// Parallel [`plan_domains`]. The topology handle is only read.
#[cfg(feature = "rayon")]
pub fn par_plan_domains<H>(
    topology: &GridTopology<H>,
    raster: &RasterExtent,
) -> Result<Vec<Domain>, GridError>
where
    H: CartesianHandle + Send + Sync,
{
    use rayon::prelude::*;

    check_fits(topology, raster)?;
    Ok((0..topology.total_workers())
        .into_par_iter()
        .map(|r| derive_domain(&topology.reresolve(r), raster.width, raster.height))
        .collect())
}

/// Rank owning global pixel `(x, y)`, or `None` if the pixel lies outside
/// the raster. O(1).
pub fn owner_of<H: CartesianHandle>(
    topology: &GridTopology<H>,
    raster: &RasterExtent,
    x: usize,
    y: usize,
) -> Option<usize> {
    if x >= raster.width || y >= raster.height {
        return None;
    }
    if !raster.fits_grid(topology.grid_rows(), topology.grid_cols()) {
        return None;
    }
    let base_w = raster.width / topology.grid_cols();
    let base_h = raster.height / topology.grid_rows();
    // pixels past the last full tile belong to the last row/column
    let col = (x / base_w).min(topology.grid_cols() - 1);
    let row = (y / base_h).min(topology.grid_rows() - 1);
    Some(topology.handle().rank_of(GridCoords::new(row, col)))
}

/// Check that `domains` tile `raster` exactly: every pixel owned once.
///
/// Reports the first out-of-bounds domain, then the first overlapping pixel,
/// then the first unowned pixel (scanning row by row).
pub fn validate_partition(domains: &[Domain], raster: &RasterExtent) -> Result<(), GridError> {
    use crate::debug_invariants::DebugInvariants;

    for d in domains {
        d.validate_invariants()?;
        if d.end_x >= raster.width || d.end_y >= raster.height {
            return Err(GridError::InvalidDomain(format!(
                "[{}..={}] x [{}..={}] exceeds raster {}x{}",
                d.start_x, d.end_x, d.start_y, d.end_y, raster.width, raster.height
            )));
        }
    }

    if let Some(((i, a), (j, b))) = domains
        .iter()
        .enumerate()
        .tuple_combinations()
        .find(|((_, a), (_, b))| a.intersects(b))
    {
        return Err(GridError::PartitionOverlap {
            x: a.start_x.max(b.start_x),
            y: a.start_y.max(b.start_y),
            first: i,
            second: j,
        });
    }

    // Disjoint and in bounds: exact cover iff the areas add up.
    let covered: usize = domains.iter().map(Domain::pixel_count).sum();
    if covered == raster.pixel_count() {
        return Ok(());
    }
    for y in 0..raster.height {
        let spans = domains
            .iter()
            .filter(|d| d.y_range().contains(&y))
            .map(|d| (d.start_x, d.end_x))
            .sorted_unstable();
        let mut next = 0;
        for (sx, ex) in spans {
            if sx > next {
                break;
            }
            next = ex + 1;
        }
        if next < raster.width {
            return Err(GridError::PartitionGap { x: next, y });
        }
    }
    unreachable!("area deficit without an uncovered pixel")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collective::{GridShape, LocalCartesian, LocalGroup};

    fn topo(rank: usize, size: usize) -> GridTopology<LocalCartesian> {
        GridTopology::for_group(&LocalGroup::new(rank, size)).unwrap()
    }

    #[test]
    fn plan_is_indexed_by_rank() {
        let t = topo(0, 6);
        let raster = RasterExtent::new(101, 53).unwrap();
        let plan = plan_domains(&t, &raster).unwrap();
        assert_eq!(plan.len(), 6);
        for (r, d) in plan.iter().enumerate() {
            assert_eq!(*d, derive_domain(&topo(r, 6), 101, 53));
        }
        validate_partition(&plan, &raster).unwrap();
    }

    #[test]
    fn plan_rejects_tiny_raster() {
        let t = topo(0, 4);
        let raster = RasterExtent::new(1, 8).unwrap();
        assert_eq!(
            plan_domains(&t, &raster),
            Err(GridError::InvalidRaster {
                width: 1,
                height: 8
            })
        );
    }

    #[test]
    fn owner_matches_plan() {
        let t = topo(2, 6);
        let raster = RasterExtent::new(11, 7).unwrap();
        let plan = plan_domains(&t, &raster).unwrap();
        for y in 0..raster.height {
            for x in 0..raster.width {
                let r = owner_of(&t, &raster, x, y).unwrap();
                assert!(plan[r].contains(x, y), "pixel ({x}, {y}) not in rank {r}");
            }
        }
        assert_eq!(owner_of(&t, &raster, 11, 0), None);
    }

    #[test]
    fn overlap_is_reported() {
        let raster = RasterExtent::new(4, 4).unwrap();
        let t = GridTopology::for_group(&LocalGroup::new(0, 2).with_shape(GridShape::new(1, 2)))
            .unwrap();
        let mut plan = plan_domains(&t, &raster).unwrap();
        plan[1].start_x -= 1;
        plan[1].width += 1;
        assert_eq!(
            validate_partition(&plan, &raster),
            Err(GridError::PartitionOverlap {
                x: 1,
                y: 0,
                first: 0,
                second: 1
            })
        );
    }

    #[test]
    fn gap_is_reported() {
        let raster = RasterExtent::new(4, 4).unwrap();
        let t = topo(0, 4);
        let mut plan = plan_domains(&t, &raster).unwrap();
        plan.remove(3);
        assert_eq!(
            validate_partition(&plan, &raster),
            Err(GridError::PartitionGap { x: 2, y: 2 })
        );
    }

    #[test]
    fn out_of_bounds_is_reported() {
        let raster = RasterExtent::new(4, 4).unwrap();
        let mut plan = plan_domains(&topo(0, 1), &raster).unwrap();
        plan[0].width += 1;
        plan[0].end_x += 1;
        assert!(matches!(
            validate_partition(&plan, &raster),
            Err(GridError::InvalidDomain(_))
        ));
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn parallel_plan_matches_serial() {
        let t = topo(0, 12);
        let raster = RasterExtent::default();
        assert_eq!(
            par_plan_domains(&t, &raster).unwrap(),
            plan_domains(&t, &raster).unwrap()
        );
    }
}
