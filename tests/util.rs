#![allow(dead_code)]
use raster_grid::prelude::*;

/// Topology for `rank` of an in-memory collective of `size` workers.
pub fn local_topo(rank: usize, size: usize) -> GridTopology<LocalCartesian> {
    GridTopology::for_group(&LocalGroup::new(rank, size)).unwrap()
}

/// Count how many domains own each pixel of a `w x h` raster.
pub fn ownership_counts(domains: &[Domain], w: usize, h: usize) -> Vec<u32> {
    let mut counts = vec![0u32; w * h];
    for d in domains {
        for y in d.y_range() {
            for x in d.x_range() {
                counts[y * w + x] += 1;
            }
        }
    }
    counts
}
