//! Projected-separation bins.
//!
//! `nbin` edges define `nbin - 1` half-open bins `[edge[k-1], edge[k])`,
//! reported at index `k`. Index 0 never receives pairs; it only carries the
//! lower bound of bin 1. All comparisons happen on squared separations so the
//! hot loop never takes a square root for binning.

use crate::error::{Result, WpError};

/// Validated, strictly increasing rp bin edges together with their squares.
#[derive(Clone, Debug, PartialEq)]
pub struct RpBins {
    edges: Vec<f64>,
    edges_sq: Vec<f64>,
}

impl RpBins {
    pub fn new(edges: &[f64]) -> Result<Self> {
        validate_edges(edges)?;
        let edges_sq: Vec<f64> = edges.iter().map(|e| e * e).collect();
        validate_squared_edges(edges, &edges_sq)?;
        Ok(Self {
            edges: edges.to_vec(),
            edges_sq,
        })
    }

    /// Number of edges (the length of the output arrays).
    pub fn nbin(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn edges_sq(&self) -> &[f64] {
        &self.edges_sq
    }

    /// Largest projected separation that is counted (exclusive).
    pub fn rpmax(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    pub fn rmin_sq(&self) -> f64 {
        self.edges_sq[0]
    }

    pub fn rmax_sq(&self) -> f64 {
        self.edges_sq[self.edges_sq.len() - 1]
    }

    /// Bin of a squared projected separation, or `None` when it falls outside
    /// `[edge[0], edge[last])`.
    ///
    /// Scans from the outermost bin inwards and stops at the first lower edge
    /// that `r2` reaches, so `r2 == edge[k]^2` lands in bin `k + 1`.
    #[inline]
    pub fn bin_index_sq(&self, r2: f64) -> Option<usize> {
        if r2 < self.rmin_sq() || r2 >= self.rmax_sq() {
            return None;
        }
        (1..self.edges_sq.len())
            .rev()
            .find(|&kbin| r2 >= self.edges_sq[kbin - 1])
    }
}

fn validate_edges(edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(WpError::TooFewBinEdges(edges.len()));
    }
    if let Some((index, &value)) = edges.iter().enumerate().find(|(_, e)| !e.is_finite()) {
        return Err(WpError::NonFiniteBinEdge { index, value });
    }
    if edges[0] < 0.0 {
        return Err(WpError::NegativeBinEdge(edges[0]));
    }
    for (index, pair) in edges.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(WpError::UnsortedBinEdges {
                index: index + 1,
                value: pair[1],
                previous: pair[0],
            });
        }
    }
    Ok(())
}

/// Binning compares squared separations, so the squared edges must keep the
/// order and the zero/non-zero distinction of the edges themselves.
fn validate_squared_edges(edges: &[f64], edges_sq: &[f64]) -> Result<()> {
    let unresolvable = |index: usize| WpError::UnresolvableBinEdge {
        index,
        value: edges[index],
        squared: edges_sq[index],
    };
    if edges[0] > 0.0 && edges_sq[0] == 0.0 {
        return Err(unresolvable(0));
    }
    for index in 1..edges_sq.len() {
        if !edges_sq[index].is_finite() || edges_sq[index] <= edges_sq[index - 1] {
            return Err(unresolvable(index));
        }
    }
    Ok(())
}
