use std::ops::{ControlFlow, Range};

use super::{PairContext, PairKernel, PrimaryPoint};
use crate::accumulator::BinAccumulator;
use crate::grid::CellView;

/// One point pair at a time. Reference for the vectorised kernel.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarKernel;

impl PairKernel for ScalarKernel {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn count_pairs(
        &self,
        ctx: &PairContext,
        primary: CellView,
        neighbor: CellView,
        offset: [f64; 3],
        acc: &mut BinAccumulator,
    ) {
        let all = 0..neighbor.len();
        if ctx.min_image_half.is_some() {
            for k in 0..primary.len() {
                let p = PrimaryPoint::at(primary, k, offset);
                let _ = scan_range::<true>(ctx, &p, neighbor, all.clone(), acc);
            }
        } else {
            for k in 0..primary.len() {
                let p = PrimaryPoint::at(primary, k, offset);
                let _ = scan_range::<false>(ctx, &p, neighbor, all.clone(), acc);
            }
        }
    }
}

#[inline]
fn in_half_open(d: f64, half: f64) -> bool {
    d >= -half && d < half
}

/// Bins `p` against `neighbor[range]`.
///
/// Without `MIN_IMAGE` a pair is taken when `0 < dz < pimax`, or when
/// `dz == 0` and the neighbour has the larger point index. With `MIN_IMAGE`
/// the image must also be the minimum one (`-L/2 <= d < L/2` on every axis)
/// and is oriented the same way, with `dz == -L/2` treated as a tie.
///
/// Returns `Break` when the cell is z-sorted and the rest of it lies at
/// `dz >= pimax`.
#[inline]
pub(crate) fn scan_range<const MIN_IMAGE: bool>(
    ctx: &PairContext,
    p: &PrimaryPoint,
    neighbor: CellView,
    range: Range<usize>,
    acc: &mut BinAccumulator,
) -> ControlFlow<()> {
    let pimax = ctx.pimax;
    let half = ctx.min_image_half.unwrap_or(f64::INFINITY);
    for i in range {
        let dz = neighbor.z[i] - p.z;
        if !MIN_IMAGE && dz < 0.0 {
            continue;
        }
        if dz >= pimax {
            if ctx.z_sorted {
                return ControlFlow::Break(());
            }
            continue;
        }
        if MIN_IMAGE && dz <= -pimax {
            continue;
        }

        let dx = neighbor.x[i] - p.x;
        let dy = neighbor.y[i] - p.y;
        let tie = if MIN_IMAGE {
            if !(in_half_open(dx, half) && in_half_open(dy, half) && in_half_open(dz, half)) {
                continue;
            }
            let tie = dz == 0.0 || dz == -half;
            if dz < 0.0 && !tie {
                continue;
            }
            tie
        } else {
            dz == 0.0
        };
        if tie && neighbor.ids[i] <= p.id {
            continue;
        }

        let r2 = dx * dx + dy * dy;
        if let Some(kbin) = ctx.bins.bin_index_sq(r2) {
            acc.add(kbin, r2);
        }
    }
    ControlFlow::Continue(())
}
