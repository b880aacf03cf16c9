use serde::{Deserialize, Serialize};

use crate::error::{Result, WpError};

/// Per-worker pair counts, and optionally the running sum of projected
/// separations, indexed by rp bin.
///
/// Each worker owns one exclusively while it walks its cells; the driver
/// merges them once every worker is done.
#[derive(Clone, Debug, PartialEq)]
pub struct BinAccumulator {
    counts: Vec<u64>,
    rp_sums: Option<Vec<f64>>,
}

impl BinAccumulator {
    pub fn new(nbin: usize, with_rpavg: bool) -> Result<Self> {
        let mut counts = Vec::new();
        counts
            .try_reserve_exact(nbin)
            .map_err(WpError::allocation("pair counters"))?;
        counts.resize(nbin, 0);

        let rp_sums = if with_rpavg {
            let mut sums = Vec::new();
            sums.try_reserve_exact(nbin)
                .map_err(WpError::allocation("separation sums"))?;
            sums.resize(nbin, 0.0);
            Some(sums)
        } else {
            None
        };
        Ok(Self { counts, rp_sums })
    }

    pub fn nbin(&self) -> usize {
        self.counts.len()
    }

    pub fn tracks_rpavg(&self) -> bool {
        self.rp_sums.is_some()
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn rp_sums(&self) -> Option<&[f64]> {
        self.rp_sums.as_deref()
    }

    /// Records one pair with squared projected separation `r2` in `kbin`.
    #[inline]
    pub fn add(&mut self, kbin: usize, r2: f64) {
        self.counts[kbin] += 1;
        if let Some(sums) = &mut self.rp_sums {
            sums[kbin] += r2.sqrt();
        }
    }

    /// Records `n` pairs in `kbin` without touching the separation sums.
    #[inline]
    pub fn add_counts(&mut self, kbin: usize, n: u64) {
        self.counts[kbin] += n;
    }

    /// Adds one separation to the sum of `kbin`, if sums are tracked.
    #[inline]
    pub fn add_rp(&mut self, kbin: usize, rp: f64) {
        if let Some(sums) = &mut self.rp_sums {
            sums[kbin] += rp;
        }
    }

    /// Adds `other` into `self`, bin by bin.
    pub fn merge(&mut self, other: &BinAccumulator) {
        debug_assert_eq!(self.nbin(), other.nbin());
        for (c, o) in self.counts.iter_mut().zip(&other.counts) {
            *c += o;
        }
        if let (Some(sums), Some(other_sums)) = (&mut self.rp_sums, &other.rp_sums) {
            for (s, o) in sums.iter_mut().zip(other_sums) {
                *s += o;
            }
        }
    }

    /// Turns the sums into per-bin means. Bins without pairs keep their
    /// (zero) sum.
    pub fn into_results(self, rp_edges: &[f64]) -> WpResults {
        let counts = self.counts;
        let rpavg = self.rp_sums.map(|mut sums| {
            for (s, &n) in sums.iter_mut().zip(&counts) {
                if n > 0 {
                    *s /= n as f64;
                }
            }
            sums
        });
        WpResults {
            rp_edges: rp_edges.to_vec(),
            npairs: counts,
            rpavg,
        }
    }
}

/// Final pair counts for one call.
///
/// `npairs[k]` counts pairs with `rp_edges[k-1] <= rp < rp_edges[k]`;
/// index 0 is always zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WpResults {
    pub rp_edges: Vec<f64>,
    pub npairs: Vec<u64>,
    /// Mean projected separation per bin, when requested.
    pub rpavg: Option<Vec<f64>>,
}

/// One populated rp bin of a [`WpResults`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WpBin {
    pub rmin: f64,
    pub rmax: f64,
    pub npairs: u64,
    pub rpavg: Option<f64>,
}

impl WpResults {
    pub fn total_pairs(&self) -> u64 {
        self.npairs.iter().sum()
    }

    /// Bins `1..nbin` with their edges.
    pub fn bins(&self) -> impl Iterator<Item = WpBin> + '_ {
        (1..self.npairs.len()).map(move |k| WpBin {
            rmin: self.rp_edges[k - 1],
            rmax: self.rp_edges[k],
            npairs: self.npairs[k],
            rpavg: self.rpavg.as_ref().map(|avg| avg[k]),
        })
    }
}
