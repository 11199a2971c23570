mod util;
use util::*;

use proptest::prelude::*;
use raster_grid::prelude::*;

fn all_domains(size: usize, w: usize, h: usize) -> Vec<Domain> {
    (0..size)
        .map(|r| derive_domain(&local_topo(r, size), w, h))
        .collect()
}

proptest! {
    #[test]
    fn every_pixel_owned_exactly_once(n in 1usize..=40, w in 40usize..=200, h in 40usize..=200) {
        let domains = all_domains(n, w, h);
        let counts = ownership_counts(&domains, w, h);
        prop_assert!(counts.iter().all(|&c| c == 1));
        prop_assert!(validate_partition(&domains, &RasterExtent::new(w, h).unwrap()).is_ok());
    }

    #[test]
    fn distinct_workers_are_disjoint(n in 2usize..=30, w in 30usize..=500, h in 30usize..=500) {
        let domains = all_domains(n, w, h);
        for i in 0..n {
            for j in (i + 1)..n {
                prop_assert!(!domains[i].intersects(&domains[j]), "{} and {} overlap", i, j);
            }
        }
    }

    #[test]
    fn grid_shape_covers_collective(n in 1usize..=512, r in 0usize..512) {
        let t = local_topo(r % n, n);
        prop_assert_eq!(t.grid_rows() * t.grid_cols(), n);
        prop_assert!(t.my_row() < t.grid_rows());
        prop_assert!(t.my_col() < t.grid_cols());
    }

    #[test]
    fn reresolve_equals_fresh_create(n in 1usize..=128, a in 0usize..128, b in 0usize..128) {
        let (r0, r1) = (a % n, b % n);
        let via = local_topo(r0, n).reresolve(r1);
        let fresh = local_topo(r1, n);
        prop_assert_eq!(via.shape(), fresh.shape());
        prop_assert_eq!(via.coords(), fresh.coords());
        prop_assert_eq!(via.rank(), r1);
    }

    #[test]
    fn derive_is_idempotent(n in 1usize..=64, r in 0usize..64, w in 64usize..5000, h in 64usize..5000) {
        let t = local_topo(r % n, n);
        prop_assert_eq!(derive_domain(&t, w, h), derive_domain(&t, w, h));
    }

    #[test]
    fn only_last_edge_exceeds_base(n in 1usize..=36, w in 36usize..=400, h in 36usize..=400) {
        let t = local_topo(0, n);
        let (base_w, base_h) = (w / t.grid_cols(), h / t.grid_rows());
        for r in 0..n {
            let v = t.reresolve(r);
            let d = derive_domain(&v, w, h);
            if v.is_last_col() {
                prop_assert_eq!(d.end_x, w - 1);
            } else {
                prop_assert_eq!(d.width, base_w);
            }
            if v.is_last_row() {
                prop_assert_eq!(d.end_y, h - 1);
            } else {
                prop_assert_eq!(d.height, base_h);
            }
        }
    }
}

#[test]
fn prime_collectives_form_strips() {
    for p in [2usize, 3, 5, 7, 11, 13, 31] {
        let t = local_topo(0, p);
        let shape = (t.grid_rows(), t.grid_cols());
        assert!(
            shape == (p, 1) || shape == (1, p),
            "{p} workers formed {}x{}",
            shape.0,
            shape.1
        );
    }
}
