// shared helpers for the integration tests; each test crate only uses part
// of this module
#![allow(dead_code)]

use rand::prelude::*;
use rand::rngs::StdRng;
use wpgrid::Points;

/// Owned coordinate arrays that hand out a [`Points`] view.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Catalog {
    pub fn points(&self) -> Points<'_> {
        Points::new(&self.x, &self.y, &self.z).unwrap()
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn push(&mut self, p: [f64; 3]) {
        self.x.push(p[0]);
        self.y.push(p[1]);
        self.z.push(p[2]);
    }
}

/// `n` uniform points on the lattice `k * boxsize / steps`.
///
/// With a power-of-two `boxsize` and `steps` every coordinate, difference and
/// square is exact in `f64`, so separations hit bin edges, `pimax` and the
/// half box exactly.
pub fn lattice_catalog(seed: u64, n: usize, boxsize: f64, steps: u32) -> Catalog {
    let mut rng = StdRng::seed_from_u64(seed);
    let spacing = boxsize / steps as f64;
    let mut catalog = Catalog::default();
    for _ in 0..n {
        let mut coord = || rng.gen_range(0..steps) as f64 * spacing;
        let p = [coord(), coord(), coord()];
        catalog.push(p);
    }
    catalog
}

/// Like [`lattice_catalog`], but confined to `[lo, hi)` on every axis.
pub fn interior_catalog(seed: u64, n: usize, lo: f64, hi: f64, spacing: f64) -> Catalog {
    let mut rng = StdRng::seed_from_u64(seed);
    let steps = ((hi - lo) / spacing) as u32;
    let mut catalog = Catalog::default();
    for _ in 0..n {
        let mut coord = || lo + rng.gen_range(0..steps) as f64 * spacing;
        let p = [coord(), coord(), coord()];
        catalog.push(p);
    }
    catalog
}

/// Reduces a separation into `[-L/2, L/2)`.
pub fn min_image(d: f64, boxsize: f64) -> f64 {
    let half = 0.5 * boxsize;
    if d >= half {
        d - boxsize
    } else if d < -half {
        d + boxsize
    } else {
        d
    }
}

/// Pair counts and separation sums from an O(N^2) loop over unordered pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct Reference {
    pub npairs: Vec<u64>,
    pub rp_sums: Vec<f64>,
}

impl Reference {
    pub fn rpavg(&self) -> Vec<f64> {
        self.rp_sums
            .iter()
            .zip(&self.npairs)
            .map(|(&s, &n)| if n > 0 { s / n as f64 } else { 0.0 })
            .collect()
    }
}

/// Brute force with optional periodic wrapping (minimum image).
pub fn brute_force(
    catalog: &Catalog,
    boxsize: f64,
    pimax: f64,
    edges: &[f64],
    periodic: bool,
) -> Reference {
    let nbin = edges.len();
    let edges_sq: Vec<f64> = edges.iter().map(|e| e * e).collect();
    let mut npairs = vec![0_u64; nbin];
    let mut rp_sums = vec![0.0; nbin];
    let wrap = |d: f64| if periodic { min_image(d, boxsize) } else { d };

    for i in 0..catalog.len() {
        for j in (i + 1)..catalog.len() {
            let dx = wrap(catalog.x[j] - catalog.x[i]);
            let dy = wrap(catalog.y[j] - catalog.y[i]);
            let dz = wrap(catalog.z[j] - catalog.z[i]);
            if dz.abs() >= pimax {
                continue;
            }
            let r2 = dx * dx + dy * dy;
            let k = edges_sq.partition_point(|&e| e <= r2);
            if k == 0 || k == nbin {
                continue;
            }
            npairs[k] += 1;
            rp_sums[k] += r2.sqrt();
        }
    }
    Reference { npairs, rp_sums }
}
