//! Pair-binning kernels.
//!
//! A kernel takes one primary cell, one neighbour cell and the wrap offset
//! between them, and adds every accepted pair to a [`BinAccumulator`].
//! [`ScalarKernel`] is the reference; [`SimdKernel`] processes the neighbour
//! cell four points at a time and must produce the same counts.

mod scalar;
mod simd;

pub use scalar::ScalarKernel;
pub use simd::{LANES, SimdKernel};

use crate::accumulator::BinAccumulator;
use crate::bins::RpBins;
use crate::grid::CellView;

/// Call-wide constants shared by every kernel invocation.
#[derive(Clone, Copy, Debug)]
pub struct PairContext<'a> {
    pub bins: &'a RpBins,
    pub pimax: f64,
    /// Neighbour cells are ordered by z, so a scan may stop at `dz >= pimax`.
    pub z_sorted: bool,
    /// Half the box size when images must be filtered to the minimum image.
    pub min_image_half: Option<f64>,
}

impl<'a> PairContext<'a> {
    pub fn new(bins: &'a RpBins, pimax: f64, z_sorted: bool) -> Self {
        Self {
            bins,
            pimax,
            z_sorted,
            min_image_half: None,
        }
    }

    /// Enables the minimum-image filter for a box of half-size `half`.
    pub fn with_min_image(mut self, half: f64) -> Self {
        self.min_image_half = Some(half);
        self
    }
}

pub trait PairKernel: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Bins all accepted pairs between `primary` (shifted by `offset`) and
    /// `neighbor`.
    fn count_pairs(
        &self,
        ctx: &PairContext,
        primary: CellView,
        neighbor: CellView,
        offset: [f64; 3],
        acc: &mut BinAccumulator,
    );
}

/// A primary point already moved into the neighbour cell's frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PrimaryPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub id: usize,
}

impl PrimaryPoint {
    #[inline]
    pub fn at(cell: CellView, k: usize, offset: [f64; 3]) -> Self {
        Self {
            x: cell.x[k] + offset[0],
            y: cell.y[k] + offset[1],
            z: cell.z[k] + offset[2],
            id: cell.ids[k],
        }
    }
}
